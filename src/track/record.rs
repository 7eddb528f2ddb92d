//! Per-track bookkeeping records.

use smallvec::SmallVec;

use super::species::ParticleDefinition;
use crate::util::{momentum_magnitude, DVec3, FourMomentum, Vertex};

/// Creator process label used for primary particles.
pub const NO_PROCESS: &str = "none";

/// Lifecycle of a record: created at track start, finalized once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackState {
    #[default]
    Started,
    Finished,
}

/// What the transport engine reports when it begins tracking a particle.
#[derive(Clone, Debug)]
pub struct TrackStart {
    pub track_id: u32,
    /// 0 for primaries.
    pub parent_id: u32,
    pub particle: ParticleDefinition,
    /// Ignored for primaries.
    pub creator_process: Option<String>,
    pub vertex: Vertex,
    /// Kinetic energy at the production vertex (MeV).
    pub kinetic_energy: f64,
    pub momentum_direction: DVec3,
    pub vertex_volume: String,
}

impl TrackStart {
    /// Start of a primary track.
    pub fn primary(track_id: u32, particle: ParticleDefinition, vertex: Vertex, kinetic_energy: f64, momentum_direction: DVec3, vertex_volume: &str) -> Self {
        Self {
            track_id,
            parent_id: 0,
            particle,
            creator_process: None,
            vertex,
            kinetic_energy,
            momentum_direction,
            vertex_volume: vertex_volume.to_string(),
        }
    }

    /// Start of a secondary produced by `process` along track `parent_id`.
    pub fn secondary(track_id: u32, parent_id: u32, process: &str, particle: ParticleDefinition, vertex: Vertex, kinetic_energy: f64, momentum_direction: DVec3, vertex_volume: &str) -> Self {
        Self {
            track_id,
            parent_id,
            particle,
            creator_process: Some(process.to_string()),
            vertex,
            kinetic_energy,
            momentum_direction,
            vertex_volume: vertex_volume.to_string(),
        }
    }

    #[inline]
    pub fn is_primary(&self) -> bool {
        self.parent_id == 0
    }
}

/// What the transport engine reports when it stops tracking a particle.
#[derive(Clone, Debug)]
pub struct TrackFinish {
    pub track_id: u32,
    /// The engine paused this track to process secondaries first.
    pub suspended: bool,
    pub vertex: Vertex,
    pub momentum: DVec3,
    /// Accumulated path length (mm).
    pub track_length: f64,
    pub decay_volume: String,
}

impl TrackFinish {
    pub fn new(track_id: u32, vertex: Vertex, momentum: DVec3, track_length: f64, decay_volume: &str) -> Self {
        Self {
            track_id,
            suspended: false,
            vertex,
            momentum,
            track_length,
            decay_volume: decay_volume.to_string(),
        }
    }

    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }
}

/// Kinematics captured when a track is finalized.
#[derive(Clone, Debug, PartialEq)]
pub struct DecayInfo {
    pub vertex: Vertex,
    pub momentum: DVec3,
    pub volume: String,
}

/// One simulated particle within an event.
#[derive(Clone, Debug)]
pub struct TrackRecord {
    pub track_id: u32,
    pub parent_id: u32,
    pub particle: ParticleDefinition,
    pub creator_process: String,
    pub production: Vertex,
    pub kinetic_energy: f64,
    pub momentum_direction: DVec3,
    pub initial_volume: String,
    /// Set from kinetic energy and mass when the track finishes.
    pub initial_momentum: Option<DVec3>,
    pub decay: Option<DecayInfo>,
    pub track_length: f64,
    /// Direct daughters in start order.
    pub daughters: SmallVec<[u32; 4]>,
    pub state: TrackState,
}

impl TrackRecord {
    /// New record in the `Started` state.
    pub fn start(start: &TrackStart) -> Self {
        let creator_process = if start.is_primary() {
            NO_PROCESS.to_string()
        } else {
            start
                .creator_process
                .clone()
                .unwrap_or_else(|| NO_PROCESS.to_string())
        };

        Self {
            track_id: start.track_id,
            parent_id: start.parent_id,
            particle: start.particle.clone(),
            creator_process,
            production: start.vertex,
            kinetic_energy: start.kinetic_energy,
            momentum_direction: start.momentum_direction,
            initial_volume: start.vertex_volume.clone(),
            initial_momentum: None,
            decay: None,
            track_length: 0.0,
            daughters: SmallVec::new(),
            state: TrackState::Started,
        }
    }

    /// Record the final state; the caller guarantees the track is not suspended.
    pub(crate) fn finish(&mut self, finish: &TrackFinish) {
        let p = momentum_magnitude(self.kinetic_energy, self.particle.mass);
        self.initial_momentum = Some(self.momentum_direction * p);
        self.decay = Some(DecayInfo {
            vertex: finish.vertex,
            momentum: finish.momentum,
            volume: finish.decay_volume.clone(),
        });
        self.track_length = finish.track_length;
        self.state = TrackState::Finished;
    }

    #[inline]
    pub fn is_primary(&self) -> bool {
        self.parent_id == 0
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == TrackState::Finished
    }

    /// Initial four-momentum, `E = sqrt(|p|^2 + m^2)`. Before the track
    /// finishes the momentum is derived on the fly from the start kinematics.
    pub fn initial_four_momentum(&self) -> FourMomentum {
        let momentum = self.initial_momentum.unwrap_or_else(|| {
            self.momentum_direction * momentum_magnitude(self.kinetic_energy, self.particle.mass)
        });
        FourMomentum::from_momentum(momentum, self.particle.mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::units::MeV;

    #[test]
    fn test_primary_has_no_process() {
        let start = TrackStart::primary(1, ParticleDefinition::gamma(), Vertex::default(), 1.0 * MeV, DVec3::Z, "ACTIVE");
        let rec = TrackRecord::start(&start);
        assert!(rec.is_primary());
        assert_eq!(rec.creator_process, NO_PROCESS);
        assert_eq!(rec.state, TrackState::Started);
        assert!(rec.decay.is_none());
    }

    #[test]
    fn test_finish_sets_momentum_and_decay() {
        let start = TrackStart::secondary(2, 1, "compt", ParticleDefinition::electron(), Vertex::default(), 1.0 * MeV, DVec3::X, "ACTIVE");
        let mut rec = TrackRecord::start(&start);
        assert_eq!(rec.creator_process, "compt");

        let end = Vertex::new(DVec3::new(1.0, 0.0, 0.0), 0.01);
        rec.finish(&TrackFinish::new(2, end, DVec3::ZERO, 3.5, "ACTIVE"));

        let m = rec.particle.mass;
        let p = ((m + 1.0) * (m + 1.0) - m * m).sqrt();
        let mom = rec.initial_momentum.unwrap();
        assert!((mom.x - p).abs() < 1e-12);
        assert_eq!(mom.y, 0.0);
        assert!((rec.initial_four_momentum().energy - (m + 1.0)).abs() < 1e-9);
        assert_eq!(rec.decay.as_ref().unwrap().vertex, end);
        assert_eq!(rec.track_length, 3.5);
        assert!(rec.is_finished());
    }
}
