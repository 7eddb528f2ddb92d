//! Tracking layer - per-particle records filled from the engine's callbacks.
//!
//! - [`ParticleDefinition`] - Species, mass and tracking category
//! - [`TrackRecord`] - One tracked particle, `Started -> Finished`
//! - [`TrackingAction`] - Per-event record store

mod species;
mod record;
mod action;

pub use species::{Category, ParticleDefinition};
pub use record::{DecayInfo, TrackFinish, TrackRecord, TrackStart, TrackState, NO_PROCESS};
pub use action::TrackingAction;
