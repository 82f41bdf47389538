//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides the mathematical building blocks of spatial LOESS:
//! - Distance metrics and the metric adapter used for neighbor search
//! - Spatial indices (KD-tree, exhaustive search)
//! - Semivariogram models
//! - The normal-equation solver
//!
//! These are reusable building blocks with no estimation-specific logic.
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
//! Layer 3: Problem
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Distance metrics for nD points.
pub mod distance;

/// KD-tree and exhaustive k-nearest neighbor search.
pub mod neighborhood;

/// Semivariogram models.
pub mod variogram;

/// Linear algebra backend.
pub mod linalg;
