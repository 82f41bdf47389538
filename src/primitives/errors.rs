//! Error types for spatial LOESS estimation.
//!
//! ## Purpose
//!
//! This module defines the single error enum returned by every fallible
//! operation in the crate, together with the pipeline stage that raised it.
//!
//! ## Design notes
//!
//! * **Variable-scoped**: Errors raised while estimating a variable carry the
//!   variable name (and the location index for per-location failures).
//! * **Staged**: Variable-scoped errors report the pipeline stage
//!   (validation, indexing, weighting, solve) in their message and via [`GeoLoessError::stage`].
//! * **no_std**: Built on `thiserror` without the standard library.
//!
//! ## Non-goals
//!
//! * This module does not decide propagation policy (handled by the executor).

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::string::{String, ToString};
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use core::fmt;
use thiserror::Error;

// ============================================================================
// Pipeline Stage
// ============================================================================

/// Stage of the per-variable estimation pipeline in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Input and parameter validation, before any index is built.
    Validation,

    /// Neighbor index construction and querying.
    Indexing,

    /// Kernel weight evaluation.
    Weighting,

    /// Weighted least-squares solve.
    Solve,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::Indexing => "indexing",
            Stage::Weighting => "weighting",
            Stage::Solve => "solve",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Error Enum
// ============================================================================

/// Errors produced while configuring or running spatial LOESS estimation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoLoessError {
    /// The query domain has no locations.
    #[error("Estimation domain is empty")]
    EmptyDomain,

    /// A coordinate buffer cannot be split into points of the given dimension.
    #[error(
        "Length mismatch: {coords_len} coordinates cannot form points of dimension {dimensions}"
    )]
    MismatchedInputs {
        /// Length of the flattened coordinate buffer.
        coords_len: usize,
        /// Declared dimensionality.
        dimensions: usize,
    },

    /// A value column does not have one entry per observation point.
    #[error("Length mismatch: variable '{variable}' has {got} values for {expected} points")]
    MismatchedValues {
        /// Variable name.
        variable: String,
        /// Number of observation points.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Observation data and query domain have different dimensionality.
    #[error("Dimension mismatch: data has {data} dimensions, domain has {domain}")]
    DimensionMismatch {
        /// Dimensionality of the observation coordinates.
        data: usize,
        /// Dimensionality of the query domain.
        domain: usize,
    },

    /// The node count of a grid overflows `usize`.
    #[error("Grid shape {shape:?} has more nodes than can be addressed")]
    GridTooLarge {
        /// Nodes along each axis.
        shape: Vec<usize>,
    },

    /// A coordinate, value or parameter is NaN or infinite.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// A builder-level neighbor count is zero.
    #[error("Invalid neighbor count: {0} (must be at least 1)")]
    InvalidNeighbors(usize),

    /// Variogram parameters violate the model's requirements.
    #[error("Invalid variogram: {0}")]
    InvalidVariogram(String),

    /// Distance metric parameters are invalid for the data.
    #[error("Invalid distance metric: {0}")]
    InvalidMetric(String),

    /// A builder parameter was set more than once.
    #[error("Parameter '{0}' was set multiple times")]
    DuplicateParameter(&'static str),

    /// A parameter or value of one variable failed validation.
    ///
    /// Wraps the context-free error raised by the metric, variogram or value check.
    #[error("[validation] variable '{variable}': {source}")]
    InvalidVariable {
        /// Variable name.
        variable: String,
        /// Underlying validation error.
        source: Box<GeoLoessError>,
    },

    /// The requested variable is not present in the observation data.
    #[error("[validation] unknown variable '{0}'")]
    UnknownVariable(String),

    /// The variable has no valid (non-missing) observations.
    #[error("[validation] variable '{variable}': no valid observations")]
    NoValidObservations {
        /// Variable name.
        variable: String,
    },

    /// The resolved neighbor count is outside `[1, available]`.
    #[error(
        "[validation] variable '{variable}': neighbor count {k} outside [1, {available}] valid observations"
    )]
    InvalidNeighborCount {
        /// Variable name.
        variable: String,
        /// Requested neighbor count.
        k: usize,
        /// Number of valid observations.
        available: usize,
    },

    /// The neighbor index returned fewer neighbors than requested.
    #[error(
        "[indexing] variable '{variable}' at location {location}: found {found} of {expected} neighbors"
    )]
    IncompleteNeighborhood {
        /// Variable name.
        variable: String,
        /// Query location index.
        location: usize,
        /// Neighbors returned by the index.
        found: usize,
        /// Neighbors requested.
        expected: usize,
    },

    /// A kernel weight was negative, which indicates an invalid variogram model.
    #[error(
        "[weighting] variable '{variable}' at location {location}: negative kernel weight {weight}"
    )]
    NegativeWeight {
        /// Variable name.
        variable: String,
        /// Query location index.
        location: usize,
        /// Offending weight value.
        weight: f64,
    },

    /// The weighted normal-equations matrix is singular or ill-conditioned.
    #[error(
        "[solve] variable '{variable}' at location {location}: weighted normal matrix is singular or ill-conditioned"
    )]
    SingularSystem {
        /// Variable name.
        variable: String,
        /// Query location index.
        location: usize,
    },
}

impl GeoLoessError {
    /// Pipeline stage that raised the error, if it is variable-scoped.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            GeoLoessError::UnknownVariable(_)
            | GeoLoessError::InvalidVariable { .. }
            | GeoLoessError::NoValidObservations { .. }
            | GeoLoessError::InvalidNeighborCount { .. } => Some(Stage::Validation),
            GeoLoessError::IncompleteNeighborhood { .. } => Some(Stage::Indexing),
            GeoLoessError::NegativeWeight { .. } => Some(Stage::Weighting),
            GeoLoessError::SingularSystem { .. } => Some(Stage::Solve),
            _ => None,
        }
    }

    /// Name of the variable the error refers to, if any.
    pub fn variable(&self) -> Option<&str> {
        match self {
            GeoLoessError::UnknownVariable(variable) => Some(variable.as_str()),
            GeoLoessError::MismatchedValues { variable, .. }
            | GeoLoessError::InvalidVariable { variable, .. }
            | GeoLoessError::NoValidObservations { variable }
            | GeoLoessError::InvalidNeighborCount { variable, .. }
            | GeoLoessError::IncompleteNeighborhood { variable, .. }
            | GeoLoessError::NegativeWeight { variable, .. }
            | GeoLoessError::SingularSystem { variable, .. } => Some(variable.as_str()),
            _ => None,
        }
    }

    /// Attach a variable name to an error that does not carry one yet.
    pub fn in_variable(self, variable: &str) -> Self {
        if self.variable().is_some() {
            return self;
        }
        GeoLoessError::InvalidVariable {
            variable: variable.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, unwrapping variable context.
    pub fn cause(&self) -> &GeoLoessError {
        match self {
            GeoLoessError::InvalidVariable { source, .. } => source.cause(),
            other => other,
        }
    }

    /// Whether the error is a configuration error raised before computation.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            GeoLoessError::IncompleteNeighborhood { .. }
                | GeoLoessError::NegativeWeight { .. }
                | GeoLoessError::SingularSystem { .. }
        )
    }
}
