//! Core layer - material property tables and run metadata.
//!
//! This module provides:
//! - [`PropertyVector`] - Energy-ordered table with clamped linear interpolation
//! - [`MaterialPropertiesTable`] - Named vectors and constants of one material
//! - [`optical`] - Optical photon window and threshold presets
//! - [`MetaData`] - Key-value run parameters

mod property_vector;
mod material;
mod metadata;
pub mod optical;

pub use property_vector::{PropertyVector, MIN_SAMPLES};
pub use material::MaterialPropertiesTable;
pub use metadata::{MetaData, encode_entry, decode_entry};
