//! Optical property presets.
//!
//! Threshold-like quantities are encoded as samples, never as lookup modes:
//! a photoelectric efficiency is zero up to just below the work function and
//! flat above it, with a narrow linear edge between the two.

use super::material::MaterialPropertiesTable;
use super::property_vector::PropertyVector;
use crate::util::units::eV;
use crate::util::{Error, Result};

/// Lowest optical photon energy tracked by the simulation.
pub const OPT_PHOT_MIN_E: f64 = 0.2 * eV;
/// Highest optical photon energy tracked by the simulation.
pub const OPT_PHOT_MAX_E: f64 = 11.5 * eV;

/// Width of the rising edge placed below a work function.
pub const WORK_FUNCTION_EDGE: f64 = 0.1 * eV;

pub const RINDEX: &str = "RINDEX";
pub const ABSLENGTH: &str = "ABSLENGTH";
pub const REFLECTIVITY: &str = "REFLECTIVITY";
pub const EFFICIENCY: &str = "EFFICIENCY";

/// Value constant over the optical photon window.
pub fn flat(value: f64) -> Result<PropertyVector> {
    PropertyVector::new(&[OPT_PHOT_MIN_E, OPT_PHOT_MAX_E], &[value, value])
}

/// Photoelectric efficiency: zero below `work_function - WORK_FUNCTION_EDGE`,
/// `probability` from `work_function` up to the top of the window.
pub fn work_function_efficiency(work_function: f64, probability: f64) -> Result<PropertyVector> {
    let edge_start = work_function - WORK_FUNCTION_EDGE;
    if edge_start <= OPT_PHOT_MIN_E || work_function >= OPT_PHOT_MAX_E {
        return Err(Error::invalid(format!(
            "work function {} eV outside the optical window",
            work_function / eV
        )));
    }
    if !(0.0..=1.0).contains(&probability) {
        return Err(Error::invalid(format!(
            "probability {} outside [0, 1]",
            probability
        )));
    }
    PropertyVector::new(
        &[OPT_PHOT_MIN_E, edge_start, work_function, OPT_PHOT_MAX_E],
        &[0.0, 0.0, probability, probability],
    )
}

/// Surface table for a metal that emits photoelectrons above its work function.
pub fn photoelectric_surface(
    work_function: f64,
    probability: f64,
    reflectivity: f64,
) -> Result<MaterialPropertiesTable> {
    let mut mpt = MaterialPropertiesTable::new();
    mpt.insert_property(EFFICIENCY, work_function_efficiency(work_function, probability)?);
    mpt.insert_property(REFLECTIVITY, flat(reflectivity)?);
    Ok(mpt)
}
