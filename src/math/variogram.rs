//! Semivariogram models used as spatial weighting kernels.
//!
//! ## Purpose
//!
//! This module defines the [`Variogram`] trait consumed by the kernel weighter
//! and a parametric [`VariogramModel`] covering the spherical, exponential and
//! gaussian families.
//!
//! ## Design notes
//!
//! * **Distance ownership**: A variogram carries the pairwise distance used to
//!   evaluate it, independent of the neighbor-search metric. The default is Euclidean.
//! * **Practical range**: Exponential and gaussian models use the practical
//!   range convention, reaching 95% of the partial sill at `h = range`.
//!
//! ## Key concepts
//!
//! * **Nugget** `c0`: discontinuity at the origin.
//! * **Sill** `c0 + c`: asymptotic semivariance.
//! * **Range** `a`: distance at which spatial correlation vanishes.
//!
//! ## Invariants
//!
//! * `semivariance(h) == 0` for `h <= 0`.
//! * `0 <= semivariance(h) <= sill()` for any valid model.
//!
//! ## Non-goals
//!
//! * This module does not fit models to empirical variograms.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::format;

// External dependencies
use core::fmt::Debug;
use num_traits::Float;

// Internal dependencies
use crate::math::distance::DistanceMetric;
use crate::primitives::errors::GeoLoessError;

// ============================================================================
// Variogram Trait
// ============================================================================

/// A semivariogram model `γ(h)`.
pub trait Variogram<T: Float>: Send + Sync + Debug {
    /// Total sill (nugget plus partial sill).
    fn sill(&self) -> T;

    /// Nugget `c0`.
    fn nugget(&self) -> T {
        T::zero()
    }

    /// Range `a`; infinite for models without a finite range.
    fn range(&self) -> T {
        T::infinity()
    }

    /// Semivariance at lag distance `h`.
    fn semivariance(&self, h: T) -> T;

    /// Distance between two points as seen by this variogram.
    fn pairwise(&self, a: &[T], b: &[T]) -> T {
        DistanceMetric::euclidean(a, b)
    }

    /// Check that the model parameters are usable.
    fn validate(&self) -> Result<(), GeoLoessError> {
        let sill = self.sill();
        if !sill.is_finite() || sill <= T::zero() {
            return Err(GeoLoessError::InvalidVariogram(
                "sill must be positive and finite".into(),
            ));
        }
        Ok(())
    }
}

impl<T: Float, V: Variogram<T> + ?Sized> Variogram<T> for &V {
    fn sill(&self) -> T {
        (**self).sill()
    }
    fn nugget(&self) -> T {
        (**self).nugget()
    }
    fn range(&self) -> T {
        (**self).range()
    }
    fn semivariance(&self, h: T) -> T {
        (**self).semivariance(h)
    }
    fn pairwise(&self, a: &[T], b: &[T]) -> T {
        (**self).pairwise(a, b)
    }
    fn validate(&self) -> Result<(), GeoLoessError> {
        (**self).validate()
    }
}

// ============================================================================
// Parametric Models
// ============================================================================

/// Shape of a parametric variogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariogramKind {
    /// Linear near the origin, reaches the sill exactly at the range.
    #[default]
    Spherical,
    /// Approaches the sill exponentially.
    Exponential,
    /// Parabolic near the origin; very smooth fields.
    Gaussian,
}

/// Parametric variogram with nugget, sill and range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariogramModel<T> {
    kind: VariogramKind,
    nugget: T,
    sill: T,
    range: T,
}

impl<T: Float> VariogramModel<T> {
    /// Create a model of the given kind with zero nugget.
    pub fn new(kind: VariogramKind, sill: T, range: T) -> Self {
        Self {
            kind,
            nugget: T::zero(),
            sill,
            range,
        }
    }

    /// Spherical model with total sill `sill` and range `range`.
    pub fn spherical(sill: T, range: T) -> Self {
        Self::new(VariogramKind::Spherical, sill, range)
    }

    /// Exponential model with total sill `sill` and practical range `range`.
    pub fn exponential(sill: T, range: T) -> Self {
        Self::new(VariogramKind::Exponential, sill, range)
    }

    /// Gaussian model with total sill `sill` and practical range `range`.
    pub fn gaussian(sill: T, range: T) -> Self {
        Self::new(VariogramKind::Gaussian, sill, range)
    }

    /// Set the nugget (must not exceed the total sill).
    pub fn with_nugget(mut self, nugget: T) -> Self {
        self.nugget = nugget;
        self
    }

    /// Model shape.
    pub fn kind(&self) -> VariogramKind {
        self.kind
    }

    /// Partial sill `c = sill - nugget`.
    pub fn partial_sill(&self) -> T {
        self.sill - self.nugget
    }
}

impl<T: Float + Send + Sync + Debug> Variogram<T> for VariogramModel<T> {
    fn sill(&self) -> T {
        self.sill
    }

    fn nugget(&self) -> T {
        self.nugget
    }

    fn range(&self) -> T {
        self.range
    }

    fn semivariance(&self, h: T) -> T {
        if h <= T::zero() {
            return T::zero();
        }

        let c0 = self.nugget;
        let c = self.partial_sill();
        let a = self.range;
        let three = T::from(3.0).unwrap_or(T::one() + T::one() + T::one());

        match self.kind {
            VariogramKind::Spherical => {
                if h >= a {
                    c0 + c
                } else {
                    let hr = h / a;
                    let half = T::from(0.5).unwrap_or(T::one() / (T::one() + T::one()));
                    c0 + c * (three * half * hr - half * hr * hr * hr)
                }
            }
            VariogramKind::Exponential => c0 + c * (T::one() - (-three * h / a).exp()),
            VariogramKind::Gaussian => c0 + c * (T::one() - (-three * h * h / (a * a)).exp()),
        }
    }

    fn validate(&self) -> Result<(), GeoLoessError> {
        let finite = self.nugget.is_finite() && self.sill.is_finite() && self.range.is_finite();
        if !finite {
            return Err(GeoLoessError::InvalidVariogram(
                "parameters must be finite".into(),
            ));
        }
        if self.sill <= T::zero() {
            return Err(GeoLoessError::InvalidVariogram("sill must be positive".into()));
        }
        if self.range <= T::zero() {
            return Err(GeoLoessError::InvalidVariogram("range must be positive".into()));
        }
        if self.nugget < T::zero() || self.nugget > self.sill {
            return Err(GeoLoessError::InvalidVariogram(format!(
                "nugget must lie in [0, sill] ({:?} given)",
                self.nugget.to_f64().unwrap_or(f64::NAN)
            )));
        }
        Ok(())
    }
}
