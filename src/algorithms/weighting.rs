//! Kernel weights derived from a semivariogram.
//!
//! ## Purpose
//!
//! This module turns a variogram into a spatial weighting kernel,
//! `w(h) = sill − γ(h)`, evaluated between a query location and each neighbor.
//!
//! ## Design notes
//!
//! * **Stateless**: The weighter only borrows the variogram and can be shared
//!   across threads.
//! * **Own distance**: Lags are measured with the variogram's pairwise distance,
//!   not the neighbor-search metric.
//!
//! ## Invariants
//!
//! * The weight of a neighbor at zero lag equals the sill exactly.
//! * Weights are never silently clamped; a negative (or NaN) weight is reported.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::variogram::Variogram;
use crate::primitives::buffer::Slot;

/// A weight that cannot be used by the least-squares solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidWeight<T>(pub T);

/// Covariance-like kernel `sill − γ(h)`.
#[derive(Debug, Clone, Copy)]
pub struct KernelWeighter<'a, T: Float> {
    variogram: &'a dyn Variogram<T>,
}

impl<'a, T: Float> KernelWeighter<'a, T> {
    /// Create a weighter for the given variogram.
    pub fn new(variogram: &'a dyn Variogram<T>) -> Self {
        Self { variogram }
    }

    /// Weight at lag distance `h`.
    #[inline]
    pub fn weight_at(&self, h: T) -> T {
        self.variogram.sill() - self.variogram.semivariance(h)
    }

    /// Weight of `point` relative to `query`.
    #[inline]
    pub fn weight(&self, query: &[T], point: &[T]) -> T {
        self.weight_at(self.variogram.pairwise(query, point))
    }

    /// Compute the weight of every neighbor (row-major `neighbor_coords`) into `out`.
    pub fn fill(
        &self,
        query: &[T],
        neighbor_coords: &[T],
        out: &mut Slot<T>,
    ) -> Result<(), InvalidWeight<T>> {
        let d = query.len();
        out.clear();
        for point in neighbor_coords.chunks_exact(d) {
            let w = self.weight(query, point);
            if w.is_nan() || w < T::zero() {
                return Err(InvalidWeight(w));
            }
            out.push(w);
        }
        Ok(())
    }
}
