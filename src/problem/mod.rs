//! Layer 3: Problem
//!
//! # Purpose
//!
//! This layer describes what is estimated and where:
//! - Observation tables with missing values
//! - Query domains (explicit points, regular grids)
//! - The problem bundle handed to the engine
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Algorithms
//!   ↓
//! Layer 3: Problem ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Observation points and named variables.
pub mod data;

/// Query domains.
pub mod domain;

/// Estimation problem bundle.
#[allow(clippy::module_inception)]
pub mod problem;
