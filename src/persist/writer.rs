//! Event writers: the output side of the persistency manager.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::compression::compress;
use super::format::*;
use super::stream::OStream;
use crate::core::{encode_entry, MetaData};
use crate::event::SerializedEvent;
use crate::util::{Error, Result};

/// Destination for assembled events and run metadata.
pub trait EventWriter: Send {
    fn write_event(&mut self, event: &SerializedEvent) -> Result<()>;

    fn write_metadata(&mut self, key: &str, value: &str) -> Result<()>;

    /// Finish the output; further writes fail with [`Error::Frozen`].
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Human-readable destination, for diagnostics.
    fn destination(&self) -> &str;
}

/// Writes events to a binary archive file.
pub struct ArchiveWriter {
    path: PathBuf,
    name: String,
    stream: OStream,
    frozen: bool,
    compression_level: i32,
    events_written: u64,
}

impl ArchiveWriter {
    /// Create the archive at `path`, truncating an existing file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut stream = OStream::create(&path)?;

        stream.write_bytes(ARCHIVE_MAGIC)?;
        stream.write_u8(NOT_FROZEN_FLAG)?;
        stream.write_u16(CURRENT_VERSION)?;

        Ok(Self {
            name: path.to_string_lossy().to_string(),
            path,
            stream,
            frozen: false,
            compression_level: -1,
            events_written: 0,
        })
    }

    /// Set compression level (-1 or 0 = no compression, 1-9 = zlib level).
    pub fn with_compression(mut self, level: i32) -> Self {
        self.compression_level = level.clamp(-1, 9);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    fn write_record(&mut self, tag: RecordTag, payload: &[u8]) -> Result<()> {
        if self.frozen {
            return Err(Error::Frozen);
        }
        let (flags, body) = match compress(payload, self.compression_level)? {
            Some(packed) => (FLAG_COMPRESSED, packed),
            None => (0, payload.to_vec()),
        };
        self.stream.write_u8(tag as u8)?;
        self.stream.write_u8(flags)?;
        self.stream.write_u64(body.len() as u64)?;
        self.stream.write_bytes(&body)?;
        Ok(())
    }
}

impl EventWriter for ArchiveWriter {
    fn write_event(&mut self, event: &SerializedEvent) -> Result<()> {
        let payload = event.to_json()?;
        self.write_record(RecordTag::Event, &payload)?;
        self.events_written += 1;
        tracing::trace!(event = event.event_id, bytes = payload.len(), pos = self.stream.pos(), "event record written");
        Ok(())
    }

    fn write_metadata(&mut self, key: &str, value: &str) -> Result<()> {
        self.write_record(RecordTag::Metadata, encode_entry(key, value).as_bytes())
    }

    fn close(&mut self) -> Result<()> {
        if self.frozen {
            return Ok(());
        }
        self.stream.patch_u8(FROZEN_OFFSET as u64, FROZEN_FLAG)?;
        self.stream.sync()?;
        self.frozen = true;
        tracing::debug!(path = %self.name, events = self.events_written, "archive closed");
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.frozen
    }

    fn destination(&self) -> &str {
        &self.name
    }
}

impl Drop for ArchiveWriter {
    fn drop(&mut self) {
        if !self.frozen {
            if let Err(e) = self.close() {
                tracing::warn!(path = %self.name, "failed to close archive: {}", e);
            }
        }
    }
}

#[derive(Debug, Default)]
struct MemoryStore {
    events: Vec<SerializedEvent>,
    metadata: MetaData,
    closed: bool,
}

/// In-process writer; clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryWriter {
    inner: Arc<Mutex<MemoryStore>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events written so far.
    pub fn events(&self) -> Vec<SerializedEvent> {
        self.inner.lock().events.clone()
    }

    pub fn num_events(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn metadata(&self) -> MetaData {
        self.inner.lock().metadata.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

impl EventWriter for MemoryWriter {
    fn write_event(&mut self, event: &SerializedEvent) -> Result<()> {
        let mut store = self.inner.lock();
        if store.closed {
            return Err(Error::Frozen);
        }
        store.events.push(event.clone());
        Ok(())
    }

    fn write_metadata(&mut self, key: &str, value: &str) -> Result<()> {
        let mut store = self.inner.lock();
        if store.closed {
            return Err(Error::Frozen);
        }
        store.metadata.set(key, value);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.inner.lock().closed = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.inner.lock().closed
    }

    fn destination(&self) -> &str {
        "memory"
    }
}
