//! Material properties table: named property vectors and constants.

use std::collections::BTreeMap;

use super::property_vector::PropertyVector;
use crate::util::{Error, Result};

/// Collection of named optical properties attached to a material.
///
/// Built once during geometry construction and read-only afterwards; share
/// it between worker threads behind an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct MaterialPropertiesTable {
    properties: BTreeMap<String, PropertyVector>,
    constants: BTreeMap<String, f64>,
}

impl MaterialPropertiesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a named property vector, replacing any previous one.
    ///
    /// `energies` and `values` must have the same length, at least two
    /// samples, and strictly increasing energies; otherwise the call fails
    /// with [`Error::InvalidInput`] and the table is left unchanged.
    pub fn add_property(&mut self, name: &str, energies: &[f64], values: &[f64]) -> Result<&mut Self> {
        let vector = PropertyVector::new(energies, values)
            .map_err(|e| Error::invalid(format!("property '{}': {}", name, e)))?;
        self.insert_property(name, vector);
        Ok(self)
    }

    /// Store an already validated vector under `name`.
    pub fn insert_property(&mut self, name: &str, vector: PropertyVector) -> &mut Self {
        if self.properties.insert(name.to_string(), vector).is_some() {
            tracing::debug!("replacing material property '{}'", name);
        }
        self
    }

    /// Store a named energy-independent constant.
    pub fn add_const_property(&mut self, name: &str, value: f64) -> Result<&mut Self> {
        if !value.is_finite() {
            return Err(Error::invalid(format!("constant '{}' must be finite", name)));
        }
        self.constants.insert(name.to_string(), value);
        Ok(self)
    }

    /// Get a property vector by name.
    pub fn property(&self, name: &str) -> Result<&PropertyVector> {
        self.properties
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("material property '{}'", name)))
    }

    /// Interpolated value of property `name` at `energy`.
    pub fn value(&self, name: &str, energy: f64) -> Result<f64> {
        Ok(self.property(name)?.value(energy))
    }

    /// Get a constant by name.
    pub fn const_property(&self, name: &str) -> Result<f64> {
        self.constants
            .get(name)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("material constant '{}'", name)))
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn has_const_property(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    /// Remove a property vector and return it.
    pub fn remove_property(&mut self, name: &str) -> Option<PropertyVector> {
        self.properties.remove(name)
    }

    /// Property names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Constant names in lexical order.
    pub fn const_names(&self) -> impl Iterator<Item = &str> {
        self.constants.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len() + self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.constants.is_empty()
    }
}
