//! Layer 5: Engine
//!
//! # Purpose
//!
//! This layer orchestrates estimation runs:
//! - Validation of configuration and per-variable parameters
//! - The variable and location loops (sequential or parallel)
//! - Result assembly
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine ← You are here
//!   ↓
//! Layer 4: Algorithms
//!   ↓
//! Layer 3: Problem
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Input and parameter validation.
pub mod validator;

/// Variable and location loops.
pub mod executor;

/// Result types.
pub mod output;
