//! Event layer - particle graph, hit aggregation and the serialized event.
//!
//! [`assemble`] is the end-of-event entry point: it turns the finalized
//! track records and the raw hit collections of one event into a
//! [`SerializedEvent`]. All intermediate state is local to the call.

mod graph;
mod hits;
mod record;

pub use graph::{ParticleGraph, ParticleNode};
pub use hits::{
    AggregatedHits, HitAggregator, HitCollection, HitData, IonizationHit, PmtHit,
    IONIZATION_KIND, PMT_KIND,
};
pub use record::{Particle, SensorHit, SerializedEvent, Track, TrackSample, WaveformSample};

use crate::track::TrackRecord;
use crate::util::{Error, Result};

/// Which parts of an event end up in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    pub trajectories: bool,
    pub ionization_hits: bool,
    pub pmt_hits: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            trajectories: true,
            ionization_hits: true,
            pmt_hits: true,
        }
    }
}

/// An assembled event and, when hit processing stopped early, the reason.
#[derive(Debug)]
pub struct Assembled {
    pub event: SerializedEvent,
    /// [`Error::UnknownHitKind`] for the collection that ended aggregation.
    pub incomplete: Option<Error>,
}

/// Assemble one event from its records and hit collections.
///
/// The graph is always built because ionization groups bind to its nodes;
/// particles are emitted only when `options.trajectories` is set. An
/// unrecognized hit collection stops hit processing but the event is still
/// returned with whatever was aggregated before it. Use [`assemble_detailed`]
/// to learn whether that happened.
pub fn assemble(
    event_id: i64,
    records: &[TrackRecord],
    collections: &[HitCollection],
    options: &StoreOptions,
) -> Result<SerializedEvent> {
    assemble_detailed(event_id, records, collections, options).map(|a| a.event)
}

/// Like [`assemble`], also reporting an early stop of hit processing.
pub fn assemble_detailed(
    event_id: i64,
    records: &[TrackRecord],
    collections: &[HitCollection],
    options: &StoreOptions,
) -> Result<Assembled> {
    let mut graph = ParticleGraph::build(event_id, records)?;
    let mut event = SerializedEvent::new(event_id);
    let mut incomplete = None;

    if options.ionization_hits || options.pmt_hits {
        let hits = HitAggregator::new(event_id)
            .with_kinds(options.ionization_hits, options.pmt_hits)
            .aggregate(&mut graph, collections)?;
        event.tracks = hits.tracks;
        event.sensor_hits = hits.sensor_hits;
        incomplete = hits.abandoned;
    }

    if options.trajectories {
        event.particles = graph.to_particles();
    }

    tracing::debug!(
        event = event_id,
        particles = event.particles.len(),
        tracks = event.tracks.len(),
        sensor_hits = event.sensor_hits.len(),
        complete = incomplete.is_none(),
        "event assembled"
    );
    Ok(Assembled { event, incomplete })
}
