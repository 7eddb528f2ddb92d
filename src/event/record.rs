//! Serialized event model handed to the writer.
//!
//! These are plain data: once an event is assembled nothing refers back to
//! the graph or the raw hit collections it was built from.

use serde::{Deserialize, Serialize};

use crate::util::{DVec3, FourMomentum, Vertex};

/// One fully assembled event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedEvent {
    pub event_id: i64,
    pub particles: Vec<Particle>,
    pub tracks: Vec<Track>,
    pub sensor_hits: Vec<SensorHit>,
}

/// A tracked particle with its family links.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub pdg_code: i32,
    pub name: String,
    pub primary: bool,
    pub creator_process: String,
    pub production_vertex: Vertex,
    /// Absent while the track never genuinely finished.
    pub decay_vertex: Option<Vertex>,
    pub initial_momentum: FourMomentum,
    pub decay_momentum: Option<DVec3>,
    pub track_length: f64,
    pub initial_volume: String,
    pub decay_volume: Option<String>,
    pub mother_id: Option<u32>,
    pub daughter_ids: Vec<u32>,
    /// Indices into [`SerializedEvent::tracks`] owned by this particle.
    pub track_indices: Vec<usize>,
}

/// Ionization deposits left by one particle in one sensitive detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub owner_particle_id: u32,
    pub sensor_name: String,
    pub samples: Vec<TrackSample>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: f64,
    pub edep: f64,
}

/// Waveform recorded by one photosensor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorHit {
    pub sensor_id: i32,
    pub sensor_name: String,
    pub position: DVec3,
    pub bin_width: f64,
    pub samples: Vec<WaveformSample>,
    /// Sum of all sample counts.
    pub amplitude: u64,
}

/// Photon count in the time bin starting at `bin`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveformSample {
    pub bin: f64,
    pub count: u32,
}

impl Track {
    /// Total deposited energy (MeV).
    pub fn energy_deposit(&self) -> f64 {
        self.samples.iter().map(|s| s.edep).sum()
    }
}

impl SerializedEvent {
    pub fn new(event_id: i64) -> Self {
        Self {
            event_id,
            ..Default::default()
        }
    }

    /// Particle by track id.
    pub fn particle(&self, id: u32) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    pub fn primaries(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.primary)
    }

    /// Ionization tracks owned by particle `id`.
    pub fn tracks_of(&self, id: u32) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.owner_particle_id == id)
    }

    /// Energy deposited over all ionization tracks (MeV).
    pub fn total_energy_deposit(&self) -> f64 {
        self.tracks.iter().map(Track::energy_deposit).sum()
    }

    /// Photon count over all sensors.
    pub fn total_amplitude(&self) -> u64 {
        self.sensor_hits.iter().map(|h| h.amplitude).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
