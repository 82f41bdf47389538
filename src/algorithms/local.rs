//! Local weighted linear regression at a single query location.
//!
//! ## Purpose
//!
//! This module fits `z ≈ θ₀ + θᵗ(x − q)` to the neighbors of a query location
//! `q` by weighted least squares and returns the fitted value at `q` together
//! with an uncertainty scalar.
//!
//! ## Design notes
//!
//! * **Centered design**: Rows are `[1, x − q]`. The fitted value at the query
//!   is then the intercept, and the augmented query vector is `e₁`.
//! * **One factorization**: The normal matrix is factorized once and solved for
//!   both `AᵗWz` and `e₁` (see [`FloatLinalg::solve_normal_pair`]).
//! * **Influence vector**: `r = W A (AᵗWA)⁻¹ e₁`, so the estimate is `r · z`
//!   and the uncertainty is `‖r‖₂`.
//!
//! ## Key concepts
//!
//! * **Affine reproduction**: For affine data and a full-rank design the estimate
//!   is exact for any positive weights.
//!
//! ## Invariants
//!
//! * `uncertainty >= 0` whenever the solve succeeds.
//! * All buffers are reset before use; nothing leaks between locations.
//!
//! ## Non-goals
//!
//! * This module does not search neighbors or compute weights.
//! * Higher-degree local polynomials are not supported.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::linalg::{FloatLinalg, SolveFailure};
use crate::primitives::buffer::NormalBuffer;

/// Estimate and uncertainty at one query location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalEstimate<T> {
    /// Fitted value at the query location.
    pub mean: T,
    /// Euclidean norm of the influence vector.
    pub uncertainty: T,
}

/// Weighted linear least-squares fit centered at the query location.
pub struct LocalRegression;

impl LocalRegression {
    /// Fit the local linear model and evaluate it at `query`.
    ///
    /// `neighbor_coords` is row-major (`k × d`), `values` and `weights` have length `k`.
    pub fn estimate<T: FloatLinalg>(
        query: &[T],
        neighbor_coords: &[T],
        values: &[T],
        weights: &[T],
        normal: &mut NormalBuffer<T>,
    ) -> Result<LocalEstimate<T>, SolveFailure> {
        let d = query.len();
        let p = d + 1;

        Self::accumulate_normal_equations(query, neighbor_coords, values, weights, normal);

        normal.query_rhs.reset(p, T::zero());
        normal.query_rhs[0] = T::one();

        T::solve_normal_pair(&normal.xtw_x, &mut normal.xtw_z, &mut normal.query_rhs, p)?;

        let mean = normal.xtw_z[0];

        // r_i = w_i * (a_i · v)
        let v = &normal.query_rhs;
        let mut sum_sq = T::zero();
        for (point, &w) in neighbor_coords.chunks_exact(d).zip(weights) {
            let mut dot = v[0];
            for j in 0..d {
                dot = dot + (point[j] - query[j]) * v[j + 1];
            }
            let r = w * dot;
            sum_sq = sum_sq + r * r;
        }

        Ok(LocalEstimate {
            mean,
            uncertainty: sum_sq.sqrt(),
        })
    }

    /// Accumulate `AᵗWA` and `AᵗWz` for the centered design.
    pub fn accumulate_normal_equations<T: Float>(
        query: &[T],
        neighbor_coords: &[T],
        values: &[T],
        weights: &[T],
        normal: &mut NormalBuffer<T>,
    ) {
        let d = query.len();
        let p = d + 1;

        normal.xtw_x.reset(p * p, T::zero());
        normal.xtw_z.reset(p, T::zero());
        normal.design_row.reset(p, T::zero());

        let xtw_x = &mut normal.xtw_x;
        let xtw_z = &mut normal.xtw_z;
        let row = &mut normal.design_row;

        for ((point, &z), &w) in neighbor_coords.chunks_exact(d).zip(values).zip(weights) {
            if w == T::zero() {
                continue;
            }

            row[0] = T::one();
            for j in 0..d {
                row[j + 1] = point[j] - query[j];
            }

            for j in 0..p {
                let w_tj = w * row[j];
                for k in j..p {
                    xtw_x[j * p + k] = xtw_x[j * p + k] + w_tj * row[k];
                }
                xtw_z[j] = xtw_z[j] + w_tj * z;
            }
        }

        // Fill symmetric part
        for j in 0..p {
            for k in 0..j {
                xtw_x[j * p + k] = xtw_x[k * p + j];
            }
        }
    }
}
