//! Persistency manager: configuration plus the single output writer of a run.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::config::{Command, PersistencyConfig};
use super::writer::{ArchiveWriter, EventWriter};
use crate::core::MetaData;
use crate::event::{assemble_detailed, HitCollection, SerializedEvent};
use crate::track::TrackRecord;
use crate::util::{Error, Result};

struct OutputState {
    writer: Option<Box<dyn EventWriter>>,
    destination: Option<String>,
    events_written: u64,
    events_incomplete: u64,
}

/// Owns the output of a run.
///
/// Constructed explicitly and passed by reference to whatever drives the
/// event loop. The writer sits behind a mutex so that one event is fully
/// written before the next one starts.
pub struct PersistencyManager {
    config: PersistencyConfig,
    output: Mutex<OutputState>,
}

impl PersistencyManager {
    pub fn new(config: PersistencyConfig) -> Self {
        Self {
            config,
            output: Mutex::new(OutputState {
                writer: None,
                destination: None,
                events_written: 0,
                events_incomplete: 0,
            }),
        }
    }

    /// Manager writing to an already constructed writer.
    pub fn with_writer(config: PersistencyConfig, writer: impl EventWriter + 'static) -> Self {
        let manager = Self::new(config);
        {
            let mut output = manager.output.lock();
            output.destination = Some(writer.destination().to_string());
            output.writer = Some(Box::new(writer));
        }
        manager
    }

    pub fn config(&self) -> &PersistencyConfig {
        &self.config
    }

    /// Parse and apply a `/nexus/persistency/` command; `outputFile` also opens the file.
    pub fn apply_command(&mut self, line: &str) -> Result<Command> {
        let command = self.config.apply_command(line)?;
        if let Command::OutputFile(path) = &command {
            self.open_file(path)?;
        }
        Ok(command)
    }

    /// Open the configured output file.
    pub fn open(&self) -> Result<()> {
        match &self.config.output_file {
            Some(path) => self.open_file(path),
            None => Err(Error::OutputUnavailable {
                path: PathBuf::new(),
                reason: "no output file configured".into(),
            }),
        }
    }

    /// Open the output archive at `path`.
    ///
    /// Only one output may be opened per run: a second call logs a warning
    /// and leaves the first output active.
    pub fn open_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut output = self.output.lock();
        if let Some(previous) = &output.destination {
            tracing::warn!(
                previous = %previous,
                requested = %path.display(),
                "An output file was previously opened."
            );
            return Ok(());
        }

        let writer = ArchiveWriter::create(path)
            .map_err(|e| Error::OutputUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .with_compression(self.config.compression_level);

        tracing::info!(path = %path.display(), "output file opened");
        output.destination = Some(path.display().to_string());
        output.writer = Some(Box::new(writer));
        Ok(())
    }

    /// Close the output. The run cannot reopen another file afterwards.
    pub fn close_file(&self) -> Result<()> {
        let mut output = self.output.lock();
        if let Some(mut writer) = output.writer.take() {
            writer.close()?;
            tracing::debug!(destination = %writer.destination(), events = output.events_written, "output closed");
        }
        Ok(())
    }

    /// Whether a writer is currently accepting events.
    pub fn is_open(&self) -> bool {
        self.output.lock().writer.as_ref().is_some_and(|w| w.is_open())
    }

    pub fn events_written(&self) -> u64 {
        self.output.lock().events_written
    }

    /// Stored events whose hit processing stopped at an unrecognized collection.
    pub fn events_incomplete(&self) -> u64 {
        self.output.lock().events_incomplete
    }

    /// Assemble and write one event.
    ///
    /// Returns `Ok(false)` when event storing is switched off. Event-local
    /// errors from assembly leave the output untouched. An event cut short by
    /// an unrecognized hit collection is still written and counted in
    /// [`events_incomplete`](Self::events_incomplete).
    #[tracing::instrument(skip_all, fields(event = event_id))]
    pub fn store_event(
        &self,
        event_id: i64,
        records: &[TrackRecord],
        collections: &[HitCollection],
    ) -> Result<bool> {
        if !self.config.store_event {
            return Ok(false);
        }
        let mut output = self.output.lock();
        let state = &mut *output;
        let writer = Self::active_writer(&mut state.writer)?;

        let assembled = assemble_detailed(event_id, records, collections, &self.config.store_options())?;
        let event = assembled.event;
        writer.write_event(&event)?;
        state.events_written += 1;
        if let Some(reason) = assembled.incomplete {
            tracing::warn!("event stored with incomplete hits: {}", reason);
            state.events_incomplete += 1;
        }
        tracing::debug!(
            particles = event.particles.len(),
            tracks = event.tracks.len(),
            sensor_hits = event.sensor_hits.len(),
            "event stored"
        );
        Ok(true)
    }

    /// Write an already assembled event.
    pub fn write_event(&self, event: &SerializedEvent) -> Result<bool> {
        if !self.config.store_event {
            return Ok(false);
        }
        let mut output = self.output.lock();
        let state = &mut *output;
        Self::active_writer(&mut state.writer)?.write_event(event)?;
        state.events_written += 1;
        Ok(true)
    }

    /// Write the run metadata: every `key value` line of the history file,
    /// then the number of events of the run.
    pub fn store_run(&self, num_events: u64) -> Result<()> {
        let mut metadata = match std::fs::read_to_string(&self.config.history_file) {
            Ok(text) => MetaData::parse_history(&text),
            Err(e) => {
                tracing::debug!(
                    history = %self.config.history_file.display(),
                    "history file not read: {}", e
                );
                MetaData::new()
            }
        };
        metadata.set(MetaData::NUM_EVENTS_KEY, num_events.to_string());

        let mut output = self.output.lock();
        let writer = Self::active_writer(&mut output.writer)?;
        for (key, value) in metadata.iter() {
            writer.write_metadata(key, value)?;
        }
        tracing::debug!(entries = metadata.len(), "run metadata stored");
        Ok(())
    }

    fn active_writer(writer: &mut Option<Box<dyn EventWriter>>) -> Result<&mut Box<dyn EventWriter>> {
        let closed = match writer.as_deref() {
            Some(w) if w.is_open() => None,
            Some(w) => Some(PathBuf::from(w.destination())),
            None => {
                return Err(Error::OutputUnavailable {
                    path: PathBuf::new(),
                    reason: "no output file opened".into(),
                })
            }
        };
        match (closed, writer.as_mut()) {
            (None, Some(w)) => Ok(w),
            (path, _) => Err(Error::OutputUnavailable {
                path: path.unwrap_or_default(),
                reason: "output already closed".into(),
            }),
        }
    }
}

impl Drop for PersistencyManager {
    fn drop(&mut self) {
        if let Err(e) = self.close_file() {
            tracing::warn!("failed to close output: {}", e);
        }
    }
}
