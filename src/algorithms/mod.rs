//! Layer 4: Algorithms
//!
//! # Purpose
//!
//! This layer provides the per-location estimation steps:
//! - Kernel weighting from a semivariogram
//! - Local weighted linear regression with uncertainty
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Algorithms ← You are here
//!   ↓
//! Layer 3: Problem
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Variogram-derived kernel weights.
pub mod weighting;

/// Local weighted least-squares estimator.
pub mod local;
