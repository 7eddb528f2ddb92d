//! # nexus-persistency
//!
//! Optical property tables plus per-event particle-graph assembly, hit
//! aggregation and persistence for a particle-transport simulation.
//!
//! The transport engine drives the crate through three callbacks: track
//! start, track finish and end of event. Track records are kept per event,
//! turned into a parent/daughter graph at the end of the event, joined with
//! the event's hit collections and written as one [`SerializedEvent`].
//!
//! ## Modules
//!
//! - [`util`] - Errors, units, vector math
//! - [`core`] - Property tables, optical presets, run metadata
//! - [`track`] - Particle definitions and per-track records
//! - [`event`] - Particle graph, hit aggregation, serialized event
//! - [`persist`] - Configuration, archives and the persistency manager
//! - [`run`] - Event loop glue with per-event error policy
//!
//! ## Example
//!
//! ```ignore
//! use nexus_persistency::prelude::*;
//!
//! let mut config = PersistencyConfig::default();
//! config.output_file = Some("run.nxevt".into());
//! let manager = PersistencyManager::new(config);
//! manager.open()?;
//!
//! let mut run = RunManager::new(&manager);
//! run.begin_event(0);
//! run.track_started(&start)?;
//! run.track_finished(&finish)?;
//! run.end_event(&collections)?;
//! run.end_run()?;
//! ```

pub mod util;
pub mod core;
pub mod track;
pub mod event;
pub mod persist;
pub mod run;

// Re-export commonly used types
pub use util::{Error, Result};
pub use event::{assemble, SerializedEvent};
pub use persist::{EventArchive, PersistencyConfig, PersistencyManager};
pub use run::{RunManager, RunStats};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{units, DVec3, Error, FourMomentum, Result, Vertex};
    pub use crate::core::{optical, MaterialPropertiesTable, MetaData, PropertyVector};
    pub use crate::track::{ParticleDefinition, TrackFinish, TrackRecord, TrackStart, TrackingAction};
    pub use crate::event::{
        assemble, HitCollection, IonizationHit, PmtHit, SerializedEvent, StoreOptions,
    };
    pub use crate::persist::{
        ArchiveWriter, EventArchive, EventWriter, MemoryWriter, PersistencyConfig, PersistencyManager,
    };
    pub use crate::run::{RunManager, RunStats};
}
