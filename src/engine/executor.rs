//! Execution engine for spatial LOESS estimation.
//!
//! ## Purpose
//!
//! This module orchestrates an estimation run: for each requested variable it
//! validates the configuration, builds a neighbor index over the valid
//! observations, and estimates every query location by local weighted
//! regression, assembling the per-variable output arrays.
//!
//! ## Design notes
//!
//! * **Two phases**: Every variable is validated and resolved before any
//!   location is estimated, so configuration errors never follow computation.
//! * **One index per variable**: Built once, read-only during the location loop.
//! * **Buffer recycling**: One [`EstimationBuffer`] per worker, reset between locations.
//! * **Parallelism**: With the `parallel` feature, locations of a variable are
//!   estimated on the rayon pool; variables are processed one after another.
//! * Generic over `Float` types to support f32 and f64.
//!
//! ## Key concepts
//!
//! * **Per-location pipeline**: coordinates → k-nearest → weights → solve → slot.
//! * **Failure policy**: Singular local systems either abort the run or are
//!   flagged with NaN and recorded (see [`SolveFailurePolicy`]).
//!
//! ## Invariants
//!
//! * Output arrays are index-aligned with the domain.
//! * Parallel and sequential runs produce identical arrays.
//! * A failed location is never filled with a default value.
//!
//! ## Non-goals
//!
//! * This module does not validate builder parameters (handled by the API layer).
//! * This module does not provide public-facing result formatting.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
#[cfg(feature = "std")]
use std::{string::String, sync::Arc, vec::Vec};

// External dependencies
use core::fmt::Debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, debug_span, trace, warn};

// Internal dependencies
use crate::algorithms::local::{LocalEstimate, LocalRegression};
use crate::algorithms::weighting::{InvalidWeight, KernelWeighter};
use crate::engine::output::{EstimationResult, VariableEstimate};
use crate::engine::validator::Validator;
use crate::math::distance::Metric;
use crate::math::linalg::FloatLinalg;
use crate::math::neighborhood::{NeighborIndex, Neighborhood, NodeDistance};
use crate::math::variogram::{Variogram, VariogramModel};
use crate::primitives::buffer::EstimationBuffer;
use crate::primitives::errors::GeoLoessError;
use crate::problem::data::ObservationSet;
use crate::problem::domain::Domain;
use crate::problem::problem::EstimationProblem;

/// Workspace used by one worker of the location loop.
pub type LocationBuffer<T> = EstimationBuffer<T, NodeDistance<T>, Neighborhood<T>>;

// ============================================================================
// Configuration
// ============================================================================

/// What to do when a local system is singular or ill-conditioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveFailurePolicy {
    /// Stop and return [`GeoLoessError::SingularSystem`].
    #[default]
    Abort,

    /// Write NaN to both outputs at the location and record its index.
    Flag,
}

/// Estimation parameters of one variable.
#[derive(Debug, Clone)]
pub struct VariableParams<T: FloatLinalg> {
    /// Neighbor count; `None` uses every valid observation.
    pub neighbors: Option<usize>,

    /// Variogram used to weight neighbors.
    pub variogram: Arc<dyn Variogram<T>>,

    /// Metric used for neighbor search.
    pub metric: Metric<T>,
}

impl<T: FloatLinalg + Debug> VariableParams<T> {
    /// Parameters with the given variogram, all neighbors and the Euclidean metric.
    pub fn new<V: Variogram<T> + 'static>(variogram: V) -> Self {
        Self {
            neighbors: None,
            variogram: Arc::new(variogram),
            metric: Metric::default(),
        }
    }

    /// Set the neighbor count.
    pub fn with_neighbors(mut self, k: usize) -> Self {
        self.neighbors = Some(k);
        self
    }

    /// Set the search metric.
    pub fn with_metric(mut self, metric: impl Into<Metric<T>>) -> Self {
        self.metric = metric.into();
        self
    }
}

impl<T: FloatLinalg + Debug> Default for VariableParams<T> {
    fn default() -> Self {
        Self::new(VariogramModel::exponential(T::one(), T::one()))
    }
}

/// Configuration of an estimation run.
#[derive(Debug, Clone)]
pub struct EstimationConfig<T: FloatLinalg> {
    /// Parameters for variables without an override.
    pub defaults: VariableParams<T>,

    /// Per-variable parameter overrides.
    pub overrides: Vec<(String, VariableParams<T>)>,

    /// Handling of singular local systems.
    pub failure_policy: SolveFailurePolicy,

    /// Estimate locations in parallel (requires the `parallel` feature).
    pub parallel: bool,
}

impl<T: FloatLinalg + Debug> Default for EstimationConfig<T> {
    fn default() -> Self {
        Self {
            defaults: VariableParams::default(),
            overrides: Vec::new(),
            failure_policy: SolveFailurePolicy::default(),
            parallel: false,
        }
    }
}

impl<T: FloatLinalg> EstimationConfig<T> {
    /// Parameters that apply to `variable`.
    pub fn params_for(&self, variable: &str) -> &VariableParams<T> {
        self.overrides
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, params)| params)
            .unwrap_or(&self.defaults)
    }
}

// ============================================================================
// Prepared Variable
// ============================================================================

/// A validated variable, ready for the location loop.
#[derive(Debug)]
pub struct PreparedVariable<'a, T: FloatLinalg> {
    /// Variable name.
    pub name: &'a str,
    /// Valid observations.
    pub observations: ObservationSet<T>,
    /// Resolved neighbor count.
    pub k: usize,
    /// Parameters in effect.
    pub params: &'a VariableParams<T>,
}

// ============================================================================
// Executor
// ============================================================================

/// Orchestrates variable-by-variable, location-by-location estimation.
pub struct GeoLoessExecutor;

impl GeoLoessExecutor {
    // ------------------------------------------------------------------------
    // Public API
    // ------------------------------------------------------------------------

    /// Estimate every requested variable of `problem` over its domain.
    pub fn run<T, D>(
        problem: &EstimationProblem<T, D>,
        config: &EstimationConfig<T>,
    ) -> Result<EstimationResult<T>, GeoLoessError>
    where
        T: FloatLinalg + Debug,
        D: Domain<T>,
    {
        let domain = problem.domain();
        Validator::validate_domain::<T, D>(domain, problem.data().dimensions())?;

        if config.parallel && !cfg!(feature = "parallel") {
            warn!("parallel execution requested without the `parallel` feature; running sequentially");
        }

        let prepared = problem
            .variables()
            .iter()
            .map(|name| Self::prepare_variable(problem, name, config.params_for(name)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut result = EstimationResult::new(domain.len());
        for variable in &prepared {
            let estimate =
                Self::estimate_variable(variable, domain, config.failure_policy, config.parallel)?;
            result.insert(variable.name.to_string(), estimate);
        }

        debug!(
            variables = result.len(),
            locations = result.n_locations(),
            failed = result.n_failed(),
            "estimation finished"
        );
        Ok(result)
    }

    /// Validate one variable and resolve its parameters.
    pub fn prepare_variable<'a, T, D>(
        problem: &EstimationProblem<T, D>,
        name: &'a str,
        params: &'a VariableParams<T>,
    ) -> Result<PreparedVariable<'a, T>, GeoLoessError>
    where
        T: FloatLinalg + Debug,
        D: Domain<T>,
    {
        let observations = problem.data().valid_observations(name)?;
        let k = Validator::resolve_neighbor_count(name, params.neighbors, observations.len())?;
        Validator::validate_variogram(params.variogram.as_ref())
            .map_err(|e| e.in_variable(name))?;
        Validator::validate_metric(&params.metric, observations.dimensions)
            .map_err(|e| e.in_variable(name))?;

        trace!(
            variable = name,
            observations = observations.len(),
            k,
            "variable validated"
        );

        Ok(PreparedVariable {
            name,
            observations,
            k,
            params,
        })
    }

    /// Estimate one prepared variable at every location of `domain`.
    pub fn estimate_variable<T, D>(
        variable: &PreparedVariable<'_, T>,
        domain: &D,
        policy: SolveFailurePolicy,
        parallel: bool,
    ) -> Result<VariableEstimate<T>, GeoLoessError>
    where
        T: FloatLinalg + Debug,
        D: Domain<T> + ?Sized,
    {
        let span = debug_span!("variable", name = variable.name, k = variable.k);
        let _guard = span.enter();

        let obs = &variable.observations;
        let index = NeighborIndex::build(&obs.coords, obs.dimensions, &variable.params.metric);
        debug!(index = ?index.kind(), points = index.len(), "neighbor index built");

        let weighter = KernelWeighter::new(variable.params.variogram.as_ref());
        let n = domain.len();
        let mut estimate = VariableEstimate::with_len(n);

        #[cfg(feature = "parallel")]
        if parallel {
            let results: Vec<Result<LocalEstimate<T>, GeoLoessError>> = (0..n)
                .into_par_iter()
                .map_init(
                    || LocationBuffer::new(variable.k, obs.dimensions),
                    |buffer, location| {
                        Self::estimate_location(
                            variable, &index, &weighter, domain, location, buffer,
                        )
                    },
                )
                .collect();

            for (location, outcome) in results.into_iter().enumerate() {
                Self::record(&mut estimate, location, outcome, policy)?;
            }
            Self::log_failures(&estimate);
            return Ok(estimate);
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel;

        let mut buffer = LocationBuffer::new(variable.k, obs.dimensions);
        for location in 0..n {
            let outcome = Self::estimate_location(
                variable,
                &index,
                &weighter,
                domain,
                location,
                &mut buffer,
            );
            Self::record(&mut estimate, location, outcome, policy)?;
        }

        Self::log_failures(&estimate);
        Ok(estimate)
    }

    /// Estimate a single location: k-nearest search, weighting and local solve.
    pub fn estimate_location<T, D>(
        variable: &PreparedVariable<'_, T>,
        index: &NeighborIndex<T>,
        weighter: &KernelWeighter<'_, T>,
        domain: &D,
        location: usize,
        buffer: &mut LocationBuffer<T>,
    ) -> Result<LocalEstimate<T>, GeoLoessError>
    where
        T: FloatLinalg + Debug,
        D: Domain<T> + ?Sized,
    {
        let obs = &variable.observations;
        let d = obs.dimensions;
        let k = variable.k;
        buffer.ensure_capacity(k, d);

        // 1. Query coordinates
        buffer.query.reset(d, T::zero());
        domain.coordinates_at(location, &mut buffer.query);

        // 2. Neighbors
        index.find_k_nearest(
            &buffer.query,
            k,
            &mut buffer.search_buffer,
            &mut buffer.neighborhood,
        );
        // Both indices return min(k, N); holds while `prepare_variable` enforces k <= N.
        if buffer.neighborhood.len() != k {
            return Err(GeoLoessError::IncompleteNeighborhood {
                variable: variable.name.to_string(),
                location,
                found: buffer.neighborhood.len(),
                expected: k,
            });
        }

        let fit = &mut buffer.fitting_buffer;
        fit.neighbor_coords.clear();
        fit.neighbor_values.clear();
        for &i in &buffer.neighborhood.indices {
            fit.neighbor_coords.extend_from_slice(obs.point(i));
            fit.neighbor_values.push(obs.values[i]);
        }

        // 3. Weights
        weighter
            .fill(&buffer.query, &fit.neighbor_coords, &mut fit.weights)
            .map_err(|InvalidWeight(w)| GeoLoessError::NegativeWeight {
                variable: variable.name.to_string(),
                location,
                weight: w.to_f64().unwrap_or(f64::NAN),
            })?;

        // 4. Local solve
        LocalRegression::estimate(
            &buffer.query,
            &fit.neighbor_coords,
            &fit.neighbor_values,
            &fit.weights,
            &mut fit.normal,
        )
        .map_err(|reason| {
            trace!(location, %reason, "local solve failed");
            GeoLoessError::SingularSystem {
                variable: variable.name.to_string(),
                location,
            }
        })
    }

    // ------------------------------------------------------------------------
    // Private Helpers
    // ------------------------------------------------------------------------

    /// Write one location's outcome into the output arrays.
    fn record<T: FloatLinalg>(
        estimate: &mut VariableEstimate<T>,
        location: usize,
        outcome: Result<LocalEstimate<T>, GeoLoessError>,
        policy: SolveFailurePolicy,
    ) -> Result<(), GeoLoessError> {
        match outcome {
            Ok(local) => {
                estimate.mean[location] = local.mean;
                estimate.uncertainty[location] = local.uncertainty;
                Ok(())
            }
            Err(GeoLoessError::SingularSystem { .. }) if policy == SolveFailurePolicy::Flag => {
                estimate.mean[location] = T::nan();
                estimate.uncertainty[location] = T::nan();
                estimate.failed_locations.push(location);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn log_failures<T>(estimate: &VariableEstimate<T>) {
        if !estimate.failed_locations.is_empty() {
            warn!(
                failed = estimate.failed_locations.len(),
                "local solve failed at some locations; flagged with NaN"
            );
        }
    }
}
