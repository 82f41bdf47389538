//! Layer 1: Primitives
//!
//! Core building blocks and types.
//!
//! This layer provides the error type and the reusable buffers used throughout
//! the crate. It has no internal dependencies within the crate.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine (executor, output, validator)
//!   ↓
//! Layer 4: Algorithms (weighting, local regression)
//!   ↓
//! Layer 3: Problem (observations, domains)
//!   ↓
//! Layer 2: Math (distance, neighborhood, variogram, linalg)
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Shared error types.
///
/// Provides:
/// - Unified `GeoLoessError` enum
/// - Pipeline `Stage` tags for variable-scoped errors
pub mod errors;

/// Buffer recycling for the per-location loop.
///
/// Provides:
/// - `Slot` reusable vectors
/// - Search, fitting and normal-system buffers
pub mod buffer;
