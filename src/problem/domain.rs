//! Query domains: the ordered locations at which variables are estimated.
//!
//! ## Purpose
//!
//! This module defines the [`Domain`] trait and two implementations, an
//! explicit [`PointSet`] and a regular [`CartesianGrid`].
//!
//! ## Design notes
//!
//! * **Indexable**: Locations are addressed by index; the index order is the
//!   output order of every estimate.
//! * **Caller-provided storage**: Coordinates are written into a caller buffer
//!   so grids never materialize their locations.
//!
//! ## Invariants
//!
//! * `coordinates_at(i, out)` writes exactly `dimensions()` finite values.
//! * Grid locations are enumerated with the first axis varying fastest.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{format, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::GeoLoessError;

// ============================================================================
// Domain Trait
// ============================================================================

/// An ordered, finite set of query locations.
pub trait Domain<T>: Sync {
    /// Dimensionality of each location.
    fn dimensions(&self) -> usize;

    /// Number of locations.
    fn len(&self) -> usize;

    /// Whether the domain has no locations.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the coordinates of location `index` into `out[..dimensions()]`.
    fn coordinates_at(&self, index: usize, out: &mut [T]);
}

impl<T, D: Domain<T> + ?Sized> Domain<T> for &D {
    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }
    fn len(&self) -> usize {
        (**self).len()
    }
    fn coordinates_at(&self, index: usize, out: &mut [T]) {
        (**self).coordinates_at(index, out)
    }
}

// ============================================================================
// Point Set
// ============================================================================

/// Explicit list of query locations.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet<T> {
    coords: Vec<T>,
    dimensions: usize,
}

impl<T: Float> PointSet<T> {
    /// Create a point set from flattened (row-major) coordinates.
    pub fn new(coords: Vec<T>, dimensions: usize) -> Result<Self, GeoLoessError> {
        if dimensions == 0 || coords.len() % dimensions != 0 {
            return Err(GeoLoessError::MismatchedInputs {
                coords_len: coords.len(),
                dimensions,
            });
        }
        if let Some(pos) = coords.iter().position(|c| !c.is_finite()) {
            return Err(GeoLoessError::InvalidNumericValue(format!(
                "query coordinate of location {} is not finite",
                pos / dimensions
            )));
        }
        Ok(Self { coords, dimensions })
    }

    /// Flattened coordinates.
    pub fn coordinates(&self) -> &[T] {
        &self.coords
    }
}

impl<T: Float + Sync> Domain<T> for PointSet<T> {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn len(&self) -> usize {
        self.coords.len() / self.dimensions
    }

    fn coordinates_at(&self, index: usize, out: &mut [T]) {
        let d = self.dimensions;
        out[..d].copy_from_slice(&self.coords[index * d..(index + 1) * d]);
    }
}

// ============================================================================
// Cartesian Grid
// ============================================================================

/// Regular grid of cell centers: `origin + index * spacing` along each axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianGrid<T> {
    shape: Vec<usize>,
    origin: Vec<T>,
    spacing: Vec<T>,
}

impl<T: Float> CartesianGrid<T> {
    /// Create a grid with `shape[i]` nodes along axis `i`.
    pub fn new(shape: Vec<usize>, origin: Vec<T>, spacing: Vec<T>) -> Result<Self, GeoLoessError> {
        let d = shape.len();
        if d == 0 || origin.len() != d || spacing.len() != d {
            return Err(GeoLoessError::DimensionMismatch {
                data: origin.len().max(spacing.len()),
                domain: d,
            });
        }
        if origin.iter().any(|o| !o.is_finite()) {
            return Err(GeoLoessError::InvalidNumericValue(
                "grid origin must be finite".into(),
            ));
        }
        if spacing.iter().any(|s| !s.is_finite() || *s <= T::zero()) {
            return Err(GeoLoessError::InvalidNumericValue(
                "grid spacing must be positive and finite".into(),
            ));
        }
        if shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .is_none()
        {
            return Err(GeoLoessError::GridTooLarge { shape });
        }
        Ok(Self {
            shape,
            origin,
            spacing,
        })
    }

    /// Number of nodes along each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Coordinates of the first node.
    pub fn origin(&self) -> &[T] {
        &self.origin
    }

    /// Node spacing along each axis.
    pub fn spacing(&self) -> &[T] {
        &self.spacing
    }
}

impl<T: Float + Sync> Domain<T> for CartesianGrid<T> {
    fn dimensions(&self) -> usize {
        self.shape.len()
    }

    fn len(&self) -> usize {
        self.shape.iter().product()
    }

    fn coordinates_at(&self, index: usize, out: &mut [T]) {
        let mut rest = index;
        for (axis, &n) in self.shape.iter().enumerate() {
            let i = rest % n;
            rest /= n;
            let step = T::from(i).unwrap_or(T::zero());
            out[axis] = self.origin[axis] + step * self.spacing[axis];
        }
    }
}
