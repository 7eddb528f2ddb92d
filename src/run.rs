//! Run loop: drives tracking and persistence event by event.

use crate::event::HitCollection;
use crate::persist::PersistencyManager;
use crate::track::{TrackFinish, TrackStart, TrackingAction};
use crate::util::{Error, Result};

/// Counters of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub events_processed: u64,
    pub events_stored: u64,
    /// Events skipped because storing is switched off.
    pub events_skipped: u64,
    /// Events dropped after an event-local error.
    pub events_failed: u64,
    /// Stored events whose hits were cut short by an unrecognized collection.
    pub events_incomplete: u64,
}

/// Couples the per-event tracking state with the run's persistency manager.
///
/// Event-local errors ([`Error::is_event_local`]) drop the current event and
/// are counted; any other error aborts the run.
pub struct RunManager<'a> {
    tracking: TrackingAction,
    persistency: &'a PersistencyManager,
    stats: RunStats,
    failure: Option<Error>,
}

impl<'a> RunManager<'a> {
    pub fn new(persistency: &'a PersistencyManager) -> Self {
        Self {
            tracking: TrackingAction::new(),
            persistency,
            stats: RunStats::default(),
            failure: None,
        }
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn tracking(&self) -> &TrackingAction {
        &self.tracking
    }

    pub fn begin_event(&mut self, event_id: i64) {
        self.tracking.begin_event(event_id);
        self.failure = None;
        tracing::debug!(event = event_id, "event started");
    }

    /// Forward a track start. Event-local errors mark the event as failed.
    pub fn track_started(&mut self, start: &TrackStart) -> Result<()> {
        let result = self.tracking.on_track_start(start).map(|_| ());
        self.absorb(result)
    }

    /// Forward a track finish. Event-local errors mark the event as failed.
    pub fn track_finished(&mut self, finish: &TrackFinish) -> Result<()> {
        let result = self.tracking.on_track_finish(finish).map(|_| ());
        self.absorb(result)
    }

    fn absorb(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Err(e) if e.is_event_local() => {
                if self.failure.is_none() {
                    self.failure = Some(e);
                }
                Ok(())
            }
            other => other,
        }
    }

    /// Close the current event: assemble it and hand it to the output.
    ///
    /// Returns whether the event was written.
    pub fn end_event(&mut self, collections: &[HitCollection]) -> Result<bool> {
        let event_id = self.tracking.event_id();
        let records = self.tracking.end_event();
        self.stats.events_processed += 1;

        if let Some(e) = self.failure.take() {
            tracing::error!(event = event_id, "event dropped: {}", e);
            self.stats.events_failed += 1;
            return Ok(false);
        }

        let incomplete_before = self.persistency.events_incomplete();
        match self.persistency.store_event(event_id, &records, collections) {
            Ok(true) => {
                self.stats.events_stored += 1;
                if self.persistency.events_incomplete() > incomplete_before {
                    self.stats.events_incomplete += 1;
                }
                Ok(true)
            }
            Ok(false) => {
                self.stats.events_skipped += 1;
                Ok(false)
            }
            Err(e) if e.is_event_local() => {
                tracing::error!(event = event_id, "event dropped: {}", e);
                self.stats.events_failed += 1;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Write the run metadata and close the output.
    pub fn end_run(self) -> Result<RunStats> {
        self.persistency.store_run(self.stats.events_processed)?;
        self.persistency.close_file()?;
        tracing::info!(
            processed = self.stats.events_processed,
            stored = self.stats.events_stored,
            failed = self.stats.events_failed,
            incomplete = self.stats.events_incomplete,
            "run finished"
        );
        Ok(self.stats)
    }
}
