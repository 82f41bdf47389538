//! High-level API for spatial LOESS estimation.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point. It implements a
//! fluent builder for configuring neighbor counts, variograms, metrics and the
//! failure policy, and produces a reusable [`GeoLoessModel`].
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Validated**: Parameters are validated when `.build()` is called.
//! * **Per-variable**: Builder-level settings are defaults; individual
//!   variables can override them with [`VariableParams`].
//! * **Type-Safe**: Generic over `Float` types for flexible precision.
//!
//! ## Key concepts
//!
//! ### Configuration Flow
//!
//! 1. Create a [`GeoLoessBuilder`] via `GeoLoess::new()`.
//! 2. Chain configuration methods (`.neighbors()`, `.variogram()`, etc.).
//! 3. Call `.build()` to validate and obtain a [`GeoLoessModel`].
//! 4. Call `.estimate(&problem)` as many times as needed.
//!
//! ### Defaults
//!
//! * Neighbors: all valid observations of each variable.
//! * Variogram: exponential, sill 1, range 1, no nugget.
//! * Metric: Euclidean.
//! * Failure policy: [`SolveFailurePolicy::Abort`].

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{string::String, sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::{string::String, sync::Arc, vec::Vec};

use core::fmt::Debug;

// Internal dependencies
use crate::engine::executor::GeoLoessExecutor;
use crate::engine::validator::Validator;
use crate::math::linalg::FloatLinalg;

// Publicly re-exported types
pub use crate::engine::executor::{EstimationConfig, SolveFailurePolicy, VariableParams};
pub use crate::engine::output::{EstimationResult, VariableEstimate};
pub use crate::math::distance::{DistanceMetric, Metric, MetricFamily, OpaqueMetric};
pub use crate::math::variogram::{Variogram, VariogramKind, VariogramModel};
pub use crate::primitives::errors::{GeoLoessError, Stage};
pub use crate::problem::data::{GeoData, ObservationSet};
pub use crate::problem::domain::{CartesianGrid, Domain, PointSet};
pub use crate::problem::problem::EstimationProblem;

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for configuring spatial LOESS estimation.
#[derive(Debug, Clone)]
pub struct GeoLoessBuilder<T: FloatLinalg + Debug> {
    /// Default neighbor count (`None` = all valid observations).
    pub neighbors: Option<usize>,

    /// Default variogram.
    pub variogram: Option<Arc<dyn Variogram<T>>>,

    /// Default search metric.
    pub metric: Option<Metric<T>>,

    /// Per-variable overrides.
    pub overrides: Vec<(String, VariableParams<T>)>,

    /// Handling of singular local systems.
    pub failure_policy: Option<SolveFailurePolicy>,

    /// Parallel execution hint.
    pub parallel: Option<bool>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<T: FloatLinalg + Debug> Default for GeoLoessBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FloatLinalg + Debug> GeoLoessBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            neighbors: None,
            variogram: None,
            metric: None,
            overrides: Vec::new(),
            failure_policy: None,
            parallel: None,
            duplicate_param: None,
        }
    }

    /// Set the default number of neighbors used at each location.
    pub fn neighbors(mut self, k: usize) -> Self {
        if self.neighbors.is_some() {
            self.duplicate_param = Some("neighbors");
        }
        self.neighbors = Some(k);
        self
    }

    /// Set the default variogram.
    pub fn variogram<V: Variogram<T> + 'static>(mut self, variogram: V) -> Self {
        if self.variogram.is_some() {
            self.duplicate_param = Some("variogram");
        }
        self.variogram = Some(Arc::new(variogram));
        self
    }

    /// Set the default neighbor-search metric.
    pub fn metric(mut self, metric: impl Into<Metric<T>>) -> Self {
        if self.metric.is_some() {
            self.duplicate_param = Some("metric");
        }
        self.metric = Some(metric.into());
        self
    }

    /// Override the parameters of a single variable.
    pub fn variable(mut self, name: impl Into<String>, params: VariableParams<T>) -> Self {
        let name = name.into();
        if self.overrides.iter().any(|(n, _)| *n == name) {
            self.duplicate_param = Some("variable");
        }
        self.overrides.push((name, params));
        self
    }

    /// Set the handling of singular local systems.
    pub fn failure_policy(mut self, policy: SolveFailurePolicy) -> Self {
        if self.failure_policy.is_some() {
            self.duplicate_param = Some("failure_policy");
        }
        self.failure_policy = Some(policy);
        self
    }

    /// Estimate locations in parallel (requires the `parallel` feature).
    pub fn parallel(mut self, parallel: bool) -> Self {
        if self.parallel.is_some() {
            self.duplicate_param = Some("parallel");
        }
        self.parallel = Some(parallel);
        self
    }

    /// Validate the configuration and build a model.
    pub fn build(self) -> Result<GeoLoessModel<T>, GeoLoessError> {
        // Check for duplicate parameter configuration
        Validator::validate_no_duplicates(self.duplicate_param)?;

        // Validate defaults
        Validator::validate_neighbors(self.neighbors)?;
        if let Some(ref variogram) = self.variogram {
            Validator::validate_variogram(variogram.as_ref())?;
        }

        // Validate overrides
        for (name, params) in &self.overrides {
            Validator::validate_neighbors(params.neighbors).map_err(|e| e.in_variable(name))?;
            Validator::validate_variogram(params.variogram.as_ref())
                .map_err(|e| e.in_variable(name))?;
        }

        let mut defaults = VariableParams::default();
        defaults.neighbors = self.neighbors;
        if let Some(variogram) = self.variogram {
            defaults.variogram = variogram;
        }
        if let Some(metric) = self.metric {
            defaults.metric = metric;
        }

        Ok(GeoLoessModel {
            config: EstimationConfig {
                defaults,
                overrides: self.overrides,
                failure_policy: self.failure_policy.unwrap_or_default(),
                parallel: self.parallel.unwrap_or(false),
            },
        })
    }
}

// ============================================================================
// Model
// ============================================================================

/// Validated estimation configuration, reusable across problems.
#[derive(Debug, Clone)]
pub struct GeoLoessModel<T: FloatLinalg + Debug> {
    config: EstimationConfig<T>,
}

impl<T: FloatLinalg + Debug> GeoLoessModel<T> {
    /// Estimate every requested variable of `problem`.
    pub fn estimate<D: Domain<T>>(
        &self,
        problem: &EstimationProblem<T, D>,
    ) -> Result<EstimationResult<T>, GeoLoessError> {
        GeoLoessExecutor::run(problem, &self.config)
    }

    /// Configuration in effect.
    pub fn config(&self) -> &EstimationConfig<T> {
        &self.config
    }
}
