//! Input validation for estimation configuration and data.
//!
//! ## Purpose
//!
//! This module provides the validation functions run before any neighbor
//! index is built: builder parameters, problem consistency and the per-variable
//! neighbor count.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Efficiency**: Checks are ordered from cheap to expensive.
//! * **Generics**: Validation is generic over `Float` types.
//!
//! ## Key concepts
//!
//! * **Resolved neighbor count**: `None` means "all valid observations";
//!   the resolved count must lie in `[1, N]`.
//!
//! ## Invariants
//!
//! * Validation logic is deterministic and side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not filter missing observations (see `GeoData`).
//! * This module does not correct invalid inputs.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::ToString;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::distance::Metric;
use crate::math::variogram::Variogram;
use crate::primitives::errors::GeoLoessError;
use crate::problem::domain::Domain;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for estimation configuration and input data.
///
/// Provides static methods that return `Result<_, GeoLoessError>` and fail
/// fast upon identifying the first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Problem Validation
    // ========================================================================

    /// Validate that the domain is non-empty and matches the data dimensionality.
    pub fn validate_domain<T, D: Domain<T> + ?Sized>(
        domain: &D,
        data_dimensions: usize,
    ) -> Result<(), GeoLoessError> {
        if domain.is_empty() {
            return Err(GeoLoessError::EmptyDomain);
        }
        if domain.dimensions() != data_dimensions {
            return Err(GeoLoessError::DimensionMismatch {
                data: data_dimensions,
                domain: domain.dimensions(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Parameter Validation
    // ========================================================================

    /// Validate a builder-level neighbor count.
    pub fn validate_neighbors(neighbors: Option<usize>) -> Result<(), GeoLoessError> {
        match neighbors {
            Some(0) => Err(GeoLoessError::InvalidNeighbors(0)),
            _ => Ok(()),
        }
    }

    /// Resolve the neighbor count of a variable against its valid observations.
    pub fn resolve_neighbor_count(
        variable: &str,
        neighbors: Option<usize>,
        available: usize,
    ) -> Result<usize, GeoLoessError> {
        let k = neighbors.unwrap_or(available);
        if k == 0 || k > available {
            return Err(GeoLoessError::InvalidNeighborCount {
                variable: variable.to_string(),
                k,
                available,
            });
        }
        Ok(k)
    }

    /// Validate the distance metric for data of the given dimensionality.
    pub fn validate_metric<T: Float>(
        metric: &Metric<T>,
        dimensions: usize,
    ) -> Result<(), GeoLoessError> {
        metric.validate(dimensions)
    }

    /// Validate the variogram parameters.
    pub fn validate_variogram<T: Float>(
        variogram: &dyn Variogram<T>,
    ) -> Result<(), GeoLoessError> {
        variogram.validate()
    }

    /// Validate that no parameters were set multiple times in the builder.
    pub fn validate_no_duplicates(
        duplicate_param: Option<&'static str>,
    ) -> Result<(), GeoLoessError> {
        if let Some(param) = duplicate_param {
            return Err(GeoLoessError::DuplicateParameter(param));
        }
        Ok(())
    }
}
