//! Tracking hooks: build one [`TrackRecord`] per tracked particle.

use std::collections::{HashMap, HashSet};

use super::record::{TrackFinish, TrackRecord, TrackStart, TrackState};
use crate::util::{Error, Result};

/// Per-event record store driven by the engine's start/finish callbacks.
///
/// State is scoped to one event: [`begin_event`](Self::begin_event) resets it
/// and [`end_event`](Self::end_event) hands the records over and clears it.
#[derive(Debug, Default)]
pub struct TrackingAction {
    event_id: i64,
    records: Vec<TrackRecord>,
    index: HashMap<u32, usize>,
    /// Record slots in the order they were finalized.
    finish_order: Vec<usize>,
    /// Tracks of excluded species seen this event.
    excluded: HashSet<u32>,
}

impl TrackingAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all per-event state.
    pub fn begin_event(&mut self, event_id: i64) {
        self.event_id = event_id;
        self.records.clear();
        self.index.clear();
        self.finish_order.clear();
        self.excluded.clear();
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    /// Create a record for a newly started track.
    ///
    /// Returns `Ok(false)` for excluded species. A secondary's parent must
    /// already have a record, otherwise [`Error::DanglingParent`].
    pub fn on_track_start(&mut self, start: &TrackStart) -> Result<bool> {
        if !start.particle.is_recorded() {
            self.excluded.insert(start.track_id);
            return Ok(false);
        }
        if self.index.contains_key(&start.track_id) {
            return Err(Error::DuplicateTrack {
                event: self.event_id,
                track: start.track_id,
            });
        }

        if !start.is_primary() {
            let parent_slot = *self.index.get(&start.parent_id).ok_or(Error::DanglingParent {
                event: self.event_id,
                track: start.track_id,
                parent: start.parent_id,
            })?;
            self.records[parent_slot].daughters.push(start.track_id);
        }

        let slot = self.records.len();
        self.records.push(TrackRecord::start(start));
        self.index.insert(start.track_id, slot);
        tracing::trace!(
            event = self.event_id,
            track = start.track_id,
            parent = start.parent_id,
            particle = %start.particle.name,
            "track started"
        );
        Ok(true)
    }

    /// Finalize a record when the engine stops tracking.
    ///
    /// Suspended tracks are left untouched (`Ok(false)`), as are tracks of
    /// excluded species. Finishing twice is [`Error::TrackAlreadyFinished`].
    pub fn on_track_finish(&mut self, finish: &TrackFinish) -> Result<bool> {
        if finish.suspended || self.excluded.contains(&finish.track_id) {
            return Ok(false);
        }
        let slot = *self.index.get(&finish.track_id).ok_or(Error::UnknownTrack {
            event: self.event_id,
            track: finish.track_id,
        })?;

        let record = &mut self.records[slot];
        if record.state == TrackState::Finished {
            return Err(Error::TrackAlreadyFinished {
                event: self.event_id,
                track: finish.track_id,
            });
        }
        record.finish(finish);
        self.finish_order.push(slot);
        Ok(true)
    }

    /// Record by track id.
    pub fn record(&self, track_id: u32) -> Option<&TrackRecord> {
        self.index.get(&track_id).map(|&slot| &self.records[slot])
    }

    /// Records in start order.
    pub fn records(&self) -> &[TrackRecord] {
        &self.records
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    pub fn num_finished(&self) -> usize {
        self.finish_order.len()
    }

    /// Hand over this event's records and clear the store.
    ///
    /// Finished records come first, in the order they were finalized;
    /// records never finished follow in start order.
    pub fn end_event(&mut self) -> Vec<TrackRecord> {
        let mut slots: Vec<Option<TrackRecord>> =
            std::mem::take(&mut self.records).into_iter().map(Some).collect();
        let mut out = Vec::with_capacity(slots.len());

        for &slot in &self.finish_order {
            if let Some(rec) = slots[slot].take() {
                out.push(rec);
            }
        }
        let unfinished = slots.len() - out.len();
        if unfinished > 0 {
            tracing::warn!(
                event = self.event_id,
                unfinished,
                "event ended with tracks that never finished"
            );
        }
        out.extend(slots.into_iter().flatten());

        self.index.clear();
        self.finish_order.clear();
        self.excluded.clear();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::ParticleDefinition;
    use crate::util::{DVec3, Vertex};

    fn primary(id: u32) -> TrackStart {
        TrackStart::primary(id, ParticleDefinition::electron(), Vertex::default(), 2.0, DVec3::Z, "ACTIVE")
    }

    fn secondary(id: u32, parent: u32, particle: ParticleDefinition) -> TrackStart {
        TrackStart::secondary(id, parent, "eIoni", particle, Vertex::default(), 0.1, DVec3::X, "ACTIVE")
    }

    fn finish(id: u32) -> TrackFinish {
        TrackFinish::new(id, Vertex::new(DVec3::ONE, 1.0), DVec3::ZERO, 5.0, "ACTIVE")
    }

    #[test]
    fn test_daughters_registered_on_start() {
        let mut action = TrackingAction::new();
        action.begin_event(0);
        assert!(action.on_track_start(&primary(1)).unwrap());
        assert!(action.on_track_start(&secondary(2, 1, ParticleDefinition::electron())).unwrap());
        assert!(action.on_track_start(&secondary(3, 1, ParticleDefinition::gamma())).unwrap());

        let parent = action.record(1).unwrap();
        assert_eq!(parent.daughters.as_slice(), &[2, 3]);
    }

    #[test]
    fn test_excluded_species_never_recorded() {
        let mut action = TrackingAction::new();
        action.begin_event(0);
        action.on_track_start(&primary(1)).unwrap();
        assert!(!action.on_track_start(&secondary(2, 1, ParticleDefinition::optical_photon())).unwrap());
        assert!(!action.on_track_start(&secondary(3, 1, ParticleDefinition::ionization_electron())).unwrap());
        assert!(!action.on_track_finish(&finish(2)).unwrap());

        assert_eq!(action.num_records(), 1);
        assert!(action.record(1).unwrap().daughters.is_empty());
    }

    #[test]
    fn test_missing_parent_is_dangling() {
        let mut action = TrackingAction::new();
        action.begin_event(4);
        let err = action.on_track_start(&secondary(2, 9, ParticleDefinition::electron())).unwrap_err();
        assert!(matches!(err, Error::DanglingParent { event: 4, track: 2, parent: 9 }));
    }

    #[test]
    fn test_child_of_excluded_species_is_dangling() {
        let mut action = TrackingAction::new();
        action.begin_event(0);
        action.on_track_start(&primary(1)).unwrap();
        action.on_track_start(&secondary(2, 1, ParticleDefinition::optical_photon())).unwrap();
        let err = action.on_track_start(&secondary(3, 2, ParticleDefinition::electron())).unwrap_err();
        assert!(matches!(err, Error::DanglingParent { parent: 2, .. }));
    }

    #[test]
    fn test_suspended_finish_is_deferred() {
        let mut action = TrackingAction::new();
        action.begin_event(0);
        action.on_track_start(&primary(1)).unwrap();

        assert!(!action.on_track_finish(&finish(1).suspended()).unwrap());
        assert!(action.record(1).unwrap().decay.is_none());

        assert!(action.on_track_finish(&finish(1)).unwrap());
        assert!(action.record(1).unwrap().decay.is_some());
    }

    #[test]
    fn test_finish_twice_and_unknown() {
        let mut action = TrackingAction::new();
        action.begin_event(2);
        action.on_track_start(&primary(1)).unwrap();
        action.on_track_finish(&finish(1)).unwrap();

        assert!(matches!(
            action.on_track_finish(&finish(1)).unwrap_err(),
            Error::TrackAlreadyFinished { event: 2, track: 1 }
        ));
        assert!(matches!(
            action.on_track_finish(&finish(7)).unwrap_err(),
            Error::UnknownTrack { event: 2, track: 7 }
        ));
    }

    #[test]
    fn test_duplicate_start() {
        let mut action = TrackingAction::new();
        action.begin_event(0);
        action.on_track_start(&primary(1)).unwrap();
        assert!(matches!(
            action.on_track_start(&primary(1)).unwrap_err(),
            Error::DuplicateTrack { track: 1, .. }
        ));
    }

    #[test]
    fn test_end_event_orders_by_finish() {
        let mut action = TrackingAction::new();
        action.begin_event(0);
        action.on_track_start(&primary(1)).unwrap();
        action.on_track_start(&secondary(2, 1, ParticleDefinition::electron())).unwrap();
        action.on_track_start(&secondary(3, 1, ParticleDefinition::electron())).unwrap();
        action.on_track_finish(&finish(3)).unwrap();
        action.on_track_finish(&finish(1)).unwrap();

        let ids: Vec<u32> = action.end_event().iter().map(|r| r.track_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(action.num_records(), 0);
    }
}
