//! Utility types shared by the whole crate.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`units`] - The host toolkit's internal unit system
//! - Vector math re-exports from glam and the kinematics helpers built on them

mod error;
mod math;
pub mod units;

pub use error::*;
pub use math::*;
