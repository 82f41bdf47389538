//! Linear algebra backend for the local weighted least-squares solve.
//!
//! ## Purpose
//!
//! This module solves the symmetric positive (semi-)definite normal system
//! `(AᵗWA) x = b` arising at every query location, for two right-hand sides
//! at once: the weighted response `AᵗWz` and the augmented query vector `x̃`.
//!
//! ## Design notes
//!
//! * **Single factorization**: The matrix is equilibrated and factorized once
//!   (Cholesky); both right-hand sides are solved from that factorization.
//! * **Equilibration**: Rows and columns are scaled by `1/sqrt(diag)` so the
//!   conditioning test does not depend on the units of each axis.
//! * Generic over `FloatLinalg` types (f32 and f64) which delegate to nalgebra.
//!
//! ## Invariants
//!
//! * A system is rejected (never solved approximately) when the factorization
//!   fails or the scaled Cholesky diagonal indicates numerical rank deficiency.
//! * Inputs are never modified on failure beyond the right-hand-side buffers.
//!
//! ## Non-goals
//!
//! * This module does not regularize or fall back to pseudo-inverses.

// External dependencies
use core::fmt;
use num_traits::Float;

// ============================================================================
// Failure Reasons
// ============================================================================

/// Why a normal system could not be solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveFailure {
    /// A diagonal entry is zero, negative or not finite.
    DegenerateDiagonal,
    /// The Cholesky factorization failed (matrix not positive definite).
    NotPositiveDefinite,
    /// The factorization succeeded but the matrix is numerically rank deficient.
    IllConditioned,
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveFailure::DegenerateDiagonal => write!(f, "degenerate diagonal"),
            SolveFailure::NotPositiveDefinite => write!(f, "not positive definite"),
            SolveFailure::IllConditioned => write!(f, "ill-conditioned"),
        }
    }
}

// ============================================================================
// FloatLinalg Trait
// ============================================================================

/// Helper trait to bridge generic Float types to the nalgebra backend.
pub trait FloatLinalg: Float + Send + Sync + 'static {
    /// Solve `M x = b` for two right-hand sides, in place.
    ///
    /// `xtw_x` is the row-major `n × n` symmetric matrix. On success `first`
    /// and `second` hold the two solutions.
    fn solve_normal_pair(
        xtw_x: &[Self],
        first: &mut [Self],
        second: &mut [Self],
        n: usize,
    ) -> Result<(), SolveFailure>;
}

macro_rules! impl_float_linalg {
    ($t:ty) => {
        impl FloatLinalg for $t {
            #[inline]
            fn solve_normal_pair(
                xtw_x: &[Self],
                first: &mut [Self],
                second: &mut [Self],
                n: usize,
            ) -> Result<(), SolveFailure> {
                let tolerance = <$t>::EPSILON * 100.0 * (n as $t);
                nalgebra_backend::solve_normal_pair(xtw_x, first, second, n, tolerance)
            }
        }
    };
}

impl_float_linalg!(f64);
impl_float_linalg!(f32);

// ============================================================================
// Nalgebra Backend Implementation
// ============================================================================

/// Nalgebra-based linear algebra operations.
pub mod nalgebra_backend {
    use super::SolveFailure;
    use nalgebra::{DMatrix, DVector, RealField};

    /// Equilibrate, factorize and solve `M x = b` for two right-hand sides.
    ///
    /// `tolerance` bounds the squared ratio of the smallest to the largest
    /// diagonal entry of the scaled Cholesky factor.
    pub fn solve_normal_pair<T: RealField + Copy>(
        xtw_x: &[T],
        first: &mut [T],
        second: &mut [T],
        n: usize,
        tolerance: T,
    ) -> Result<(), SolveFailure> {
        // Symmetric equilibration: S M S with S = diag(1/sqrt(M_ii))
        let mut scales = DVector::<T>::zeros(n);
        for i in 0..n {
            let d = xtw_x[i * n + i];
            if !d.is_finite() || d <= T::zero() {
                return Err(SolveFailure::DegenerateDiagonal);
            }
            scales[i] = T::one() / d.sqrt();
        }

        let scaled = DMatrix::<T>::from_fn(n, n, |i, j| xtw_x[i * n + j] * scales[i] * scales[j]);
        let chol = scaled.cholesky().ok_or(SolveFailure::NotPositiveDefinite)?;

        let l = chol.l_dirty();
        let mut min_diag = l[(0, 0)];
        let mut max_diag = l[(0, 0)];
        for i in 1..n {
            let d = l[(i, i)];
            if d < min_diag {
                min_diag = d;
            }
            if d > max_diag {
                max_diag = d;
            }
        }
        let ratio = min_diag / max_diag;
        if !ratio.is_finite() || ratio * ratio < tolerance {
            return Err(SolveFailure::IllConditioned);
        }

        for rhs in [first, second] {
            let mut v = DVector::<T>::from_fn(n, |i, _| rhs[i] * scales[i]);
            chol.solve_mut(&mut v);
            for i in 0..n {
                rhs[i] = v[i] * scales[i];
            }
        }

        Ok(())
    }
}
