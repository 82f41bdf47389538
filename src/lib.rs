//! # geoloess — Spatial LOESS estimation for Rust
//!
//! Estimates an unknown scalar field at arbitrary query locations from sparse,
//! irregularly placed observations, using locally weighted linear regression
//! with a variogram-derived spatial kernel.
//!
//! ## What is spatial LOESS?
//!
//! At each query location the estimator selects the `k` nearest observations,
//! weights each one by a covariance-like kernel `sill − γ(h)` (where `γ` is a
//! semivariogram and `h` the distance to the query), fits a local linear model
//! by weighted least squares, and evaluates that model at the query location.
//!
//! **Key properties:**
//! - No global functional form is assumed
//! - Affine fields are reproduced exactly
//! - Every estimate comes with an uncertainty scalar (norm of the influence vector)
//! - Variables with missing values are handled per variable
//!
//! **How it works:**
//!
//! 1. Build a neighbor index (KD-tree or exhaustive) over each variable's valid observations
//! 2. For each query location, find the `k` nearest observations
//! 3. Weight them with `sill − γ(h)`
//! 4. Solve the weighted normal equations of the local linear model (centered at the query)
//! 5. Report the fitted value and the uncertainty at the query
//!
//! ## Quick Start
//!
//! ```rust
//! use geoloess::prelude::*;
//!
//! // Three observations of `z` on a line
//! let data = GeoData::new(vec![0.0_f64, 1.0, 2.0], 1)?
//!     .with_values("z", vec![0.0, 1.0, 2.0])?;
//!
//! // Two query locations
//! let domain = PointSet::new(vec![0.5, 1.5], 1)?;
//! let problem = EstimationProblem::new(data, domain)?;
//!
//! // Build the model
//! let model = GeoLoess::new()
//!     .neighbors(3)
//!     .variogram(VariogramModel::spherical(1.0, 10.0))
//!     .build()?;
//!
//! // Estimate
//! let result = model.estimate(&problem)?;
//! let z = result.get("z").unwrap();
//!
//! assert!((z.mean[0] - 0.5).abs() < 1e-10);
//! assert!((z.mean[1] - 1.5).abs() < 1e-10);
//! assert!(z.uncertainty.iter().all(|&u| u >= 0.0));
//!
//! println!("{}", result);
//! # Result::<(), GeoLoessError>::Ok(())
//! ```
//!
//! ```text
//! Summary:
//!   Locations: 2
//!   Variables: 1
//!
//! Variable 'z':
//!    Index           Mean    Uncertainty
//! --------------------------------------
//!        0       0.500000       0.677032
//!        1       1.500000       0.677032
//! ```
//!
//! ### Result and Error Handling
//!
//! `estimate` returns a `Result<EstimationResult<T>, GeoLoessError>`.
//!
//! - **`Ok(EstimationResult<T>)`**: One [`VariableEstimate`](prelude::VariableEstimate)
//!   per variable, with `mean` and `uncertainty` arrays aligned to the domain.
//! - **`Err(GeoLoessError)`**: A configuration error (unknown variable, no valid
//!   observations, invalid neighbor count, ...) or a numerical failure identifying
//!   the variable, the location and the pipeline stage.
//!
//! ```rust
//! use geoloess::prelude::*;
//!
//! let data = GeoData::new(vec![0.0, 1.0, 2.0], 1)?
//!     .with_values("z", vec![0.0, 1.0, 2.0])?;
//! let problem = EstimationProblem::new(data, PointSet::new(vec![1.0], 1)?)?;
//!
//! // More neighbors than observations
//! let model = GeoLoess::<f64>::new().neighbors(4).build()?;
//!
//! match model.estimate(&problem) {
//!     Ok(_) => unreachable!(),
//!     Err(e) => {
//!         assert_eq!(e.stage(), Some(Stage::Validation));
//!         assert_eq!(e.variable(), Some("z"));
//!     }
//! }
//! # Result::<(), GeoLoessError>::Ok(())
//! ```
//!
//! ## Parameters
//!
//! | Parameter          | Default                         | Description                                         |
//! |--------------------|---------------------------------|-----------------------------------------------------|
//! | **neighbors**      | all valid observations          | Number of neighbors used at each location           |
//! | **variogram**      | exponential, sill 1, range 1    | Kernel model (`sill − γ(h)`)                        |
//! | **metric**         | `Euclidean`                     | Neighbor-search metric                              |
//! | **variable**       | none                            | Per-variable override of the three settings above   |
//! | **failure_policy** | `Abort`                         | Handling of singular local systems                  |
//! | **parallel**       | false                           | Estimate locations on the rayon pool (`parallel`)   |
//!
//! ### Per-variable settings
//!
//! ```rust
//! use geoloess::prelude::*;
//!
//! let data = GeoData::new(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0], 2)?
//!     .with_values("temperature", vec![10.0, 11.0, 12.0, 13.0])?
//!     .with_variable("pressure", vec![Some(1.0), None, Some(1.2), Some(1.1)])?;
//!
//! let grid = CartesianGrid::new(vec![3, 3], vec![0.0, 0.0], vec![0.5, 0.5])?;
//! let problem = EstimationProblem::new(data, grid)?;
//!
//! let model = GeoLoess::new()
//!     .variogram(VariogramModel::gaussian(2.0, 5.0))
//!     .variable(
//!         "pressure",
//!         VariableParams::new(VariogramModel::exponential(1.0, 3.0)).with_metric(Manhattan),
//!     )
//!     .build()?;
//!
//! let result = model.estimate(&problem)?;
//! assert_eq!(result.get("pressure").unwrap().mean.len(), 9);
//! # Result::<(), GeoLoessError>::Ok(())
//! ```
//!
//! ### Custom metrics
//!
//! Metrics that are not Minkowski-family distances are searched exhaustively:
//!
//! ```rust
//! use geoloess::prelude::*;
//!
//! // Distance along the first axis only
//! let metric = Metric::custom("first-axis", |a: &[f64], b: &[f64]| (a[0] - b[0]).abs());
//! assert_eq!(metric.family(), MetricFamily::Opaque);
//!
//! let model = GeoLoess::new().metric(metric).neighbors(3).build()?;
//! # Result::<(), GeoLoessError>::Ok(())
//! ```
//!
//! ### Singular local systems
//!
//! With `failure_policy(Flag)`, locations whose local system is singular get NaN
//! in both arrays and are listed in `failed_locations`; the run continues.
//!
//! ## Minimal Usage (no_std)
//!
//! The crate supports `no_std` environments with `alloc`:
//!
//! ```toml
//! [dependencies]
//! geoloess = { version = "0.1", default-features = false }
//! ```
//!
//! ## Features
//!
//! - `std` (default): standard library support.
//! - `parallel`: location-parallel estimation with rayon.
//! - `dev`: exposes internal modules under [`internals`] for testing.
//!
//! ## Logging
//!
//! The executor emits `tracing` events (index kind, failed-location counts) and
//! a `variable` span per estimated variable. No subscriber is installed.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - errors and reusable buffers.
mod primitives;

// Layer 2: Math - distance metrics, spatial indices, variograms and the
// normal-equation solver.
mod math;

// Layer 3: Problem - observation data, query domains and the problem bundle.
mod problem;

// Layer 4: Algorithms - kernel weighting and the local estimator.
mod algorithms;

// Layer 5: Engine - validation, the variable and location loops, results.
mod engine;

// High-level fluent API.
//
// Provides the `GeoLoess` builder and the reusable `GeoLoessModel`.
mod api;

// ============================================================================
// Prelude
// ============================================================================

/// Standard prelude.
///
/// This module is intended to be wildcard-imported for convenient access
/// to the most commonly used types:
///
/// ```
/// use geoloess::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{
        CartesianGrid, DistanceMetric,
        DistanceMetric::{Chebyshev, Euclidean, Manhattan, Minkowski, Weighted},
        Domain, EstimationProblem, EstimationResult, GeoData, GeoLoessBuilder as GeoLoess,
        GeoLoessError, GeoLoessModel, Metric, MetricFamily, PointSet,
        SolveFailurePolicy,
        SolveFailurePolicy::{Abort, Flag},
        Stage, VariableEstimate, VariableParams, Variogram, VariogramKind, VariogramModel,
    };
}

pub use api::{GeoLoessBuilder, GeoLoessModel};

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// This module re-exports internal modules for development and testing purposes.
/// It is only available with the `dev` feature enabled.
///
/// **Warning**: These are internal implementation details and may change without notice.
/// Do not use in production code.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal problem description types.
    pub mod problem {
        pub use crate::problem::*;
    }
    /// Internal core algorithms.
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    /// Internal execution engine.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal API.
    pub mod api {
        pub use crate::api::*;
    }
}
