//! Estimation problem: observations, query domain and requested variables.
//!
//! ## Purpose
//!
//! This module bundles what one estimation run needs and checks the inputs
//! against each other once, before any variable is processed.
//!
//! ## Invariants
//!
//! * Data and domain have the same dimensionality.
//! * The domain has at least one location.
//! * Every requested variable exists in the data, and none is requested twice.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{
    string::{String, ToString},
    vec::Vec,
};
#[cfg(feature = "std")]
use std::{string::String, vec::Vec};

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::GeoLoessError;
use crate::problem::data::GeoData;
use crate::problem::domain::Domain;

/// Observations, query domain and the variables to estimate.
#[derive(Debug, Clone)]
pub struct EstimationProblem<T, D> {
    data: GeoData<T>,
    domain: D,
    variables: Vec<String>,
}

impl<T: Float, D: Domain<T>> EstimationProblem<T, D> {
    /// Estimate every variable in `data` over `domain`.
    pub fn new(data: GeoData<T>, domain: D) -> Result<Self, GeoLoessError> {
        let variables: Vec<String> = data.variable_names().map(ToString::to_string).collect();
        Self::with_variables(data, domain, variables)
    }

    /// Estimate only the listed variables, in the given order.
    pub fn with_variables<S: Into<String>>(
        data: GeoData<T>,
        domain: D,
        variables: impl IntoIterator<Item = S>,
    ) -> Result<Self, GeoLoessError> {
        if domain.is_empty() {
            return Err(GeoLoessError::EmptyDomain);
        }
        if data.dimensions() != domain.dimensions() {
            return Err(GeoLoessError::DimensionMismatch {
                data: data.dimensions(),
                domain: domain.dimensions(),
            });
        }

        let mut requested: Vec<String> = Vec::new();
        for name in variables {
            let name = name.into();
            if !data.has_variable(&name) {
                return Err(GeoLoessError::UnknownVariable(name));
            }
            if !requested.contains(&name) {
                requested.push(name);
            }
        }

        Ok(Self {
            data,
            domain,
            variables: requested,
        })
    }

    /// Observation data.
    pub fn data(&self) -> &GeoData<T> {
        &self.data
    }

    /// Query domain.
    pub fn domain(&self) -> &D {
        &self.domain
    }

    /// Requested variables, in processing order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}
