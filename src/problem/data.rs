//! Observation data: point coordinates and named variables.
//!
//! ## Purpose
//!
//! This module stores the sparse observations an estimation is conditioned on
//! and extracts, per variable, the subset of points where the variable is present.
//!
//! ## Design notes
//!
//! * **Flattened coordinates**: Points are stored row-major (`n × d`) in one buffer.
//! * **Missing values**: Each variable is a column of `Option<T>`; `None` marks a
//!   missing observation. Missing entries are dropped per variable, so different
//!   variables may be conditioned on different point subsets.
//! * **Insertion order**: Variables keep the order in which they were added.
//!
//! ## Invariants
//!
//! * Every coordinate is finite.
//! * Every variable column has exactly one entry per point.
//! * Present values are finite once extracted into an [`ObservationSet`].

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
#[cfg(feature = "std")]
use std::{string::String, vec::Vec};

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::GeoLoessError;

// ============================================================================
// Observation Table
// ============================================================================

/// Observation points with one or more named variables.
#[derive(Debug, Clone)]
pub struct GeoData<T> {
    coords: Vec<T>,
    dimensions: usize,
    variables: Vec<(String, Vec<Option<T>>)>,
}

impl<T: Float> GeoData<T> {
    /// Create an observation table from flattened coordinates.
    pub fn new(coords: Vec<T>, dimensions: usize) -> Result<Self, GeoLoessError> {
        if dimensions == 0 || coords.len() % dimensions != 0 {
            return Err(GeoLoessError::MismatchedInputs {
                coords_len: coords.len(),
                dimensions,
            });
        }
        if let Some(pos) = coords.iter().position(|c| !c.is_finite()) {
            return Err(GeoLoessError::InvalidNumericValue(format!(
                "observation coordinate of point {} is not finite",
                pos / dimensions
            )));
        }

        Ok(Self {
            coords,
            dimensions,
            variables: Vec::new(),
        })
    }

    /// Add a variable with possibly missing values.
    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<T>>,
    ) -> Result<Self, GeoLoessError> {
        let name = name.into();
        if values.len() != self.n_points() {
            return Err(GeoLoessError::MismatchedValues {
                variable: name,
                expected: self.n_points(),
                got: values.len(),
            });
        }

        match self.variables.iter_mut().find(|(n, _)| *n == name) {
            Some((_, column)) => *column = values,
            None => self.variables.push((name, values)),
        }
        Ok(self)
    }

    /// Add a fully observed variable.
    pub fn with_values(self, name: impl Into<String>, values: Vec<T>) -> Result<Self, GeoLoessError> {
        self.with_variable(name, values.into_iter().map(Some).collect())
    }

    /// Number of observation points.
    pub fn n_points(&self) -> usize {
        self.coords.len() / self.dimensions
    }

    /// Dimensionality of the observation coordinates.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Flattened coordinates (row-major).
    pub fn coordinates(&self) -> &[T] {
        &self.coords
    }

    /// Coordinates of point `i`.
    pub fn point(&self, i: usize) -> &[T] {
        &self.coords[i * self.dimensions..(i + 1) * self.dimensions]
    }

    /// Names of all variables, in insertion order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(n, _)| n.as_str())
    }

    /// Whether the table holds a variable of the given name.
    pub fn has_variable(&self, name: &str) -> bool {
        self.values(name).is_some()
    }

    /// Raw column of a variable.
    pub fn values(&self, name: &str) -> Option<&[Option<T>]> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Extract the points where `name` is present.
    pub fn valid_observations(&self, name: &str) -> Result<ObservationSet<T>, GeoLoessError> {
        let column = self
            .values(name)
            .ok_or_else(|| GeoLoessError::UnknownVariable(name.to_string()))?;

        let mut set = ObservationSet::with_capacity(column.len(), self.dimensions);
        for (i, value) in column.iter().enumerate() {
            let Some(v) = *value else { continue };
            if !v.is_finite() {
                return Err(GeoLoessError::InvalidNumericValue(format!(
                    "non-finite value at point {i}"
                ))
                .in_variable(name));
            }
            set.coords.extend_from_slice(self.point(i));
            set.values.push(v);
            set.source_indices.push(i);
        }

        if set.is_empty() {
            return Err(GeoLoessError::NoValidObservations {
                variable: name.to_string(),
            });
        }
        Ok(set)
    }
}

// ============================================================================
// Per-Variable Observations
// ============================================================================

/// The valid observations of one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet<T> {
    /// Flattened coordinates (row-major, `len() × dimensions`).
    pub coords: Vec<T>,
    /// Observed values.
    pub values: Vec<T>,
    /// Index of each observation in the source table.
    pub source_indices: Vec<usize>,
    /// Dimensionality of the coordinates.
    pub dimensions: usize,
}

impl<T: Float> ObservationSet<T> {
    fn with_capacity(n: usize, dimensions: usize) -> Self {
        Self {
            coords: Vec::with_capacity(n * dimensions),
            values: Vec::with_capacity(n),
            source_indices: Vec::with_capacity(n),
            dimensions,
        }
    }

    /// Number of valid observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no valid observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Coordinates of observation `i`.
    pub fn point(&self, i: usize) -> &[T] {
        &self.coords[i * self.dimensions..(i + 1) * self.dimensions]
    }
}
