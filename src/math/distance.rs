//! Distance metrics for neighbor search.
//!
//! ## Purpose
//!
//! This module provides the distance computations used to select the nearest
//! observations of a query location, and classifies each metric by whether it
//! admits accelerated (tree-based) search.
//!
//! ## Design notes
//!
//! * **Decoupling**: Distance calculation is separated from kernel evaluation;
//!   the variogram measures separation on its own.
//! * **Classification**: [`Metric::family`] is checked once when an index is
//!   built, selecting the KD-tree or the exhaustive index.
//! * **Reduced distances**: Minkowski-family metrics expose a monotone
//!   "reduced" form (e.g. squared Euclidean) so the tree never takes roots in its hot loop.
//!
//! ## Key concepts
//!
//! * **Minkowski family**: Metrics that decompose over coordinates, so the
//!   per-axis gap to a splitting plane bounds the full distance from below.
//! * **Opaque metric**: Any user-supplied distance function; always searched exhaustively.
//!
//! ## Invariants
//!
//! * Distance is always non-negative.
//! * `post_process_distance(reduced_distance(a, b)) == distance(a, b)`.
//!
//! ## Non-goals
//!
//! * This module does not handle kernel weighting.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{format, sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt;
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::GeoLoessError;

// ============================================================================
// Distance Metric Enum
// ============================================================================

/// Minkowski-family distance metrics.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DistanceMetric<T> {
    /// Standard Euclidean distance: √(Σ(xᵢ - yᵢ)²)
    #[default]
    Euclidean,

    /// Manhattan distance (L1 norm): Σ|xᵢ - yᵢ|
    Manhattan,

    /// Chebyshev distance (L∞ norm): max|xᵢ - yᵢ|
    Chebyshev,

    /// Minkowski distance (Lp norm): (Σ|xᵢ - yᵢ|^p)^(1/p)
    /// Generalization of Euclidean (p=2) and Manhattan (p=1).
    /// p must be >= 1.0.
    Minkowski(T),

    /// Weighted Euclidean distance: √(Σ wᵢ(xᵢ - yᵢ)²)
    Weighted(Vec<T>),
}

// ============================================================================
// Distance Computation Functions
// ============================================================================

impl<T: Float> DistanceMetric<T> {
    /// Compute Euclidean distance between two nD points.
    #[inline]
    pub fn euclidean(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len(), "Points must have same dimension");
        Self::squared_euclidean(a, b).sqrt()
    }

    /// Compute squared Euclidean distance between two nD points.
    #[inline]
    pub fn squared_euclidean(a: &[T], b: &[T]) -> T {
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| {
                let diff = ai - bi;
                diff * diff
            })
            .fold(T::zero(), |acc, x| acc + x)
    }

    /// Compute Manhattan distance (L1 norm).
    #[inline]
    pub fn manhattan(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| (ai - bi).abs())
            .fold(T::zero(), |acc, x| acc + x)
    }

    /// Compute Chebyshev distance (L-inf norm).
    #[inline]
    pub fn chebyshev(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| (ai - bi).abs())
            .fold(T::zero(), T::max)
    }

    /// Compute Minkowski distance (Lp norm).
    #[inline]
    pub fn minkowski(a: &[T], b: &[T], p: T) -> T {
        debug_assert_eq!(a.len(), b.len());
        Self::minkowski_sum(a, b, p).powf(T::one() / p)
    }

    #[inline]
    fn minkowski_sum(a: &[T], b: &[T], p: T) -> T {
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| (ai - bi).abs().powf(p))
            .fold(T::zero(), |acc, x| acc + x)
    }

    /// Compute Weighted Euclidean distance.
    #[inline]
    pub fn weighted(a: &[T], b: &[T], weights: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), weights.len());
        Self::weighted_sum(a, b, weights).sqrt()
    }

    #[inline]
    fn weighted_sum(a: &[T], b: &[T], weights: &[T]) -> T {
        a.iter()
            .zip(b.iter())
            .zip(weights.iter())
            .map(|((&ai, &bi), &w)| {
                let diff = ai - bi;
                w * diff * diff
            })
            .fold(T::zero(), |acc, x| acc + x)
    }

    /// Distance between two points under this metric.
    #[inline]
    pub fn distance(&self, a: &[T], b: &[T]) -> T {
        match self {
            DistanceMetric::Euclidean => Self::euclidean(a, b),
            DistanceMetric::Manhattan => Self::manhattan(a, b),
            DistanceMetric::Chebyshev => Self::chebyshev(a, b),
            DistanceMetric::Minkowski(p) => Self::minkowski(a, b, *p),
            DistanceMetric::Weighted(w) => Self::weighted(a, b, w),
        }
    }

    /// Check metric parameters against the data dimensionality.
    pub fn validate(&self, dimensions: usize) -> Result<(), GeoLoessError> {
        match self {
            DistanceMetric::Minkowski(p) => {
                if !p.is_finite() || *p < T::one() {
                    return Err(GeoLoessError::InvalidMetric(format!(
                        "Minkowski order p={} (must be finite and >= 1)",
                        p.to_f64().unwrap_or(f64::NAN)
                    )));
                }
            }
            DistanceMetric::Weighted(w) => {
                if w.len() != dimensions {
                    return Err(GeoLoessError::InvalidMetric(format!(
                        "{} weights for {} dimensions",
                        w.len(),
                        dimensions
                    )));
                }
                if let Some((i, &wi)) = w
                    .iter()
                    .enumerate()
                    .find(|&(_, &wi)| !wi.is_finite() || wi < T::zero())
                {
                    return Err(GeoLoessError::InvalidMetric(format!(
                        "weight[{}]={} (must be finite and non-negative)",
                        i,
                        wi.to_f64().unwrap_or(f64::NAN)
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

// ============================================================================
// Tree Search Distance
// ============================================================================

/// Trait for distance calculations used in tree search.
pub trait PointDistance<T: Float> {
    /// Monotone transform of the distance that is cheaper to compute
    /// (e.g. squared Euclidean). Only used for comparisons.
    fn reduced_distance(&self, a: &[T], b: &[T]) -> T;

    /// Reduced distance from a query coordinate to a splitting plane along one axis.
    ///
    /// Must be a lower bound on the reduced distance to any point across the plane.
    fn split_reduced_distance(&self, dim: usize, split_val: T, query_val: T) -> T;

    /// Convert a reduced distance back to the metric space.
    fn post_process_distance(&self, d: T) -> T;
}

impl<T: Float> PointDistance<T> for DistanceMetric<T> {
    #[inline]
    fn reduced_distance(&self, a: &[T], b: &[T]) -> T {
        match self {
            DistanceMetric::Euclidean => Self::squared_euclidean(a, b),
            DistanceMetric::Manhattan => Self::manhattan(a, b),
            DistanceMetric::Chebyshev => Self::chebyshev(a, b),
            DistanceMetric::Minkowski(p) => Self::minkowski_sum(a, b, *p),
            DistanceMetric::Weighted(w) => Self::weighted_sum(a, b, w),
        }
    }

    #[inline]
    fn split_reduced_distance(&self, dim: usize, split_val: T, query_val: T) -> T {
        let diff = (query_val - split_val).abs();
        match self {
            DistanceMetric::Euclidean => diff * diff,
            DistanceMetric::Manhattan | DistanceMetric::Chebyshev => diff,
            DistanceMetric::Minkowski(p) => diff.powf(*p),
            DistanceMetric::Weighted(w) => w[dim] * diff * diff,
        }
    }

    #[inline]
    fn post_process_distance(&self, d: T) -> T {
        match self {
            DistanceMetric::Euclidean | DistanceMetric::Weighted(_) => d.sqrt(),
            DistanceMetric::Manhattan | DistanceMetric::Chebyshev => d,
            DistanceMetric::Minkowski(p) => d.powf(T::one() / *p),
        }
    }
}

// ============================================================================
// Metric Adapter
// ============================================================================

/// Search capability of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFamily {
    /// Decomposes over coordinates; supports KD-tree search.
    Minkowski,
    /// Arbitrary distance function; requires exhaustive search.
    Opaque,
}

/// Distance function supplied by the caller.
type DistanceFn<T> = dyn Fn(&[T], &[T]) -> T + Send + Sync;

/// A user-supplied pairwise distance function, searched exhaustively.
#[derive(Clone)]
pub struct OpaqueMetric<T> {
    name: &'static str,
    distance: Arc<DistanceFn<T>>,
}

impl<T> OpaqueMetric<T> {
    /// Wrap a distance function under a descriptive name.
    pub fn new<F>(name: &'static str, distance: F) -> Self
    where
        F: Fn(&[T], &[T]) -> T + Send + Sync + 'static,
    {
        Self {
            name,
            distance: Arc::new(distance),
        }
    }

    /// Name given at construction.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluate the wrapped function.
    #[inline]
    pub fn distance(&self, a: &[T], b: &[T]) -> T {
        (self.distance)(a, b)
    }
}

impl<T> fmt::Debug for OpaqueMetric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueMetric")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Distance used for neighbor search, classified by search capability.
#[derive(Debug, Clone)]
pub enum Metric<T> {
    /// A Minkowski-family metric (tree-searchable).
    Minkowski(DistanceMetric<T>),
    /// An arbitrary distance function (exhaustive search).
    Opaque(OpaqueMetric<T>),
}

impl<T: Float> Metric<T> {
    /// Wrap an arbitrary distance function.
    pub fn custom<F>(name: &'static str, distance: F) -> Self
    where
        F: Fn(&[T], &[T]) -> T + Send + Sync + 'static,
    {
        Metric::Opaque(OpaqueMetric::new(name, distance))
    }

    /// Search capability of this metric.
    pub fn family(&self) -> MetricFamily {
        match self {
            Metric::Minkowski(_) => MetricFamily::Minkowski,
            Metric::Opaque(_) => MetricFamily::Opaque,
        }
    }

    /// Distance between two points.
    #[inline]
    pub fn distance(&self, a: &[T], b: &[T]) -> T {
        match self {
            Metric::Minkowski(m) => m.distance(a, b),
            Metric::Opaque(m) => m.distance(a, b),
        }
    }

    /// Check metric parameters against the data dimensionality.
    pub fn validate(&self, dimensions: usize) -> Result<(), GeoLoessError> {
        match self {
            Metric::Minkowski(m) => m.validate(dimensions),
            Metric::Opaque(_) => Ok(()),
        }
    }
}

impl<T: Float> Default for Metric<T> {
    fn default() -> Self {
        Metric::Minkowski(DistanceMetric::Euclidean)
    }
}

impl<T> From<DistanceMetric<T>> for Metric<T> {
    fn from(metric: DistanceMetric<T>) -> Self {
        Metric::Minkowski(metric)
    }
}

impl<T> From<OpaqueMetric<T>> for Metric<T> {
    fn from(metric: OpaqueMetric<T>) -> Self {
        Metric::Opaque(metric)
    }
}
