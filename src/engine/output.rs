//! Output types for spatial LOESS estimation.
//!
//! ## Purpose
//!
//! This module defines [`VariableEstimate`], the per-variable arrays produced
//! by the executor, and [`EstimationResult`], the map from variable name to
//! estimate returned to the caller.
//!
//! ## Design notes
//!
//! * Arrays are index-aligned with the query domain.
//! * Variables are keyed by name in a `BTreeMap`, so iteration order is stable.
//! * Implements `Display` for a human-readable summary with adaptive row elision.
//!
//! ## Invariants
//!
//! * `mean.len() == uncertainty.len() == domain.len()` for every variable.
//! * Every index in `failed_locations` holds NaN in both arrays, and no other does.
//!
//! ## Non-goals
//!
//! * This module does not perform calculations; it only stores results.
//! * This module does not provide serialization logic.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, string::String, vec::Vec};
#[cfg(feature = "std")]
use std::{collections::BTreeMap, string::String, vec::Vec};

// External dependencies
use core::fmt;
use num_traits::Float;

// ============================================================================
// Per-Variable Estimate
// ============================================================================

/// Estimates of one variable over the query domain.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableEstimate<T> {
    /// Estimated value at each query location.
    pub mean: Vec<T>,

    /// Uncertainty (norm of the local influence vector) at each query location.
    pub uncertainty: Vec<T>,

    /// Locations whose local solve failed under the flagging policy, ascending.
    pub failed_locations: Vec<usize>,
}

impl<T: Float> VariableEstimate<T> {
    /// Allocate NaN-filled arrays for `n` locations.
    pub fn with_len(n: usize) -> Self {
        Self {
            mean: vec![T::nan(); n],
            uncertainty: vec![T::nan(); n],
            failed_locations: Vec::new(),
        }
    }

    /// Number of query locations.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether there are no query locations.
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Whether every location was estimated.
    pub fn is_complete(&self) -> bool {
        self.failed_locations.is_empty()
    }
}

// ============================================================================
// Result Map
// ============================================================================

/// Estimates of every requested variable.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationResult<T> {
    estimates: BTreeMap<String, VariableEstimate<T>>,
    n_locations: usize,
}

impl<T: Float> EstimationResult<T> {
    /// Create an empty result for a domain of `n_locations` locations.
    pub fn new(n_locations: usize) -> Self {
        Self {
            estimates: BTreeMap::new(),
            n_locations,
        }
    }

    /// Store the estimate of a variable.
    pub fn insert(&mut self, variable: String, estimate: VariableEstimate<T>) {
        self.estimates.insert(variable, estimate);
    }

    /// Estimate of a variable.
    pub fn get(&self, variable: &str) -> Option<&VariableEstimate<T>> {
        self.estimates.get(variable)
    }

    /// Remove and return the estimate of a variable.
    pub fn remove(&mut self, variable: &str) -> Option<VariableEstimate<T>> {
        self.estimates.remove(variable)
    }

    /// Iterate over `(variable, estimate)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableEstimate<T>)> {
        self.estimates.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Variable names in name order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.estimates.keys().map(String::as_str)
    }

    /// Number of estimated variables.
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    /// Whether no variable was estimated.
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// Number of query locations.
    pub fn n_locations(&self) -> usize {
        self.n_locations
    }

    /// Total number of failed locations across all variables.
    pub fn n_failed(&self) -> usize {
        self.estimates.values().map(|e| e.failed_locations.len()).sum()
    }
}

impl<T> IntoIterator for EstimationResult<T> {
    type Item = (String, VariableEstimate<T>);
    type IntoIter = <BTreeMap<String, VariableEstimate<T>> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.estimates.into_iter()
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl<T: Float + fmt::Display> fmt::Display for EstimationResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Locations: {}", self.n_locations)?;
        writeln!(f, "  Variables: {}", self.estimates.len())?;
        if self.n_failed() > 0 {
            writeln!(f, "  Failed locations: {}", self.n_failed())?;
        }

        for (name, estimate) in &self.estimates {
            writeln!(f)?;
            writeln!(f, "Variable '{}':", name)?;
            write!(f, "{}", estimate)?;
        }
        Ok(())
    }
}

impl<T: Float + fmt::Display> fmt::Display for VariableEstimate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>8} {:>14} {:>14}", "Index", "Mean", "Uncertainty")?;
        writeln!(f, "{:-<38}", "")?;

        // Show first 10 and last 10 rows if more than 20 locations
        let n = self.mean.len();
        let rows_to_show: Vec<usize> = if n <= 20 {
            (0..n).collect()
        } else {
            (0..10).chain(n - 10..n).collect()
        };

        let mut prev_idx = 0;
        for (i, &idx) in rows_to_show.iter().enumerate() {
            if i > 0 && idx != prev_idx + 1 {
                writeln!(f, "{:>8}", "...")?;
            }
            prev_idx = idx;
            writeln!(
                f,
                "{:>8} {:>14.6} {:>14.6}",
                idx, self.mean[idx], self.uncertainty[idx]
            )?;
        }
        Ok(())
    }
}
