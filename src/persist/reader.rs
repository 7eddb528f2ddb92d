//! Event archive reader.

use std::fs::File;
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

use super::compression::decompress;
use super::format::*;
use crate::core::{decode_entry, MetaData};
use crate::event::SerializedEvent;
use crate::util::{Error, Result};

enum Bytes {
    #[cfg(feature = "mmap")]
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Bytes {
    fn as_slice(&self) -> &[u8] {
        match self {
            #[cfg(feature = "mmap")]
            Self::Mmap(m) => &m[..],
            Self::Owned(v) => v.as_slice(),
        }
    }
}

/// Location of one record inside the archive.
#[derive(Clone, Copy, Debug)]
struct RecordEntry {
    compressed: bool,
    offset: usize,
    len: usize,
}

/// Read-only view of an archive written by [`ArchiveWriter`](super::ArchiveWriter).
pub struct EventArchive {
    bytes: Bytes,
    version: u16,
    frozen: bool,
    events: Vec<RecordEntry>,
    metadata: MetaData,
}

impl EventArchive {
    /// Open and index an archive (memory-mapped when the `mmap` feature is on).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("archive {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        if size < HEADER_SIZE as u64 {
            return Err(Error::UnexpectedEof(size));
        }

        #[cfg(feature = "mmap")]
        let bytes = {
            // Safety: the mapping is read-only and the archive is not written while open.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            Bytes::Mmap(mmap)
        };
        #[cfg(not(feature = "mmap"))]
        let bytes = {
            use std::io::Read;
            let mut buf = Vec::with_capacity(size as usize);
            let mut file = file;
            file.read_to_end(&mut buf)?;
            Bytes::Owned(buf)
        };

        Self::index(bytes)
    }

    /// Index an archive held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::UnexpectedEof(data.len() as u64));
        }
        Self::index(Bytes::Owned(data))
    }

    fn index(bytes: Bytes) -> Result<Self> {
        let data = bytes.as_slice();
        if &data[..ARCHIVE_MAGIC.len()] != ARCHIVE_MAGIC {
            return Err(Error::InvalidMagic);
        }
        let frozen = data[FROZEN_OFFSET] == FROZEN_FLAG;
        let version = u16::from_le_bytes([data[VERSION_OFFSET], data[VERSION_OFFSET + 1]]);
        if version > CURRENT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let mut events = Vec::new();
        let mut metadata = MetaData::new();
        let mut pos = HEADER_SIZE;
        while pos < data.len() {
            if pos + RECORD_HEADER_SIZE > data.len() {
                return Err(Error::UnexpectedEof(data.len() as u64));
            }
            let tag = RecordTag::from_u8(data[pos])?;
            let compressed = data[pos + 1] & FLAG_COMPRESSED != 0;
            let mut len = [0u8; 8];
            len.copy_from_slice(&data[pos + 2..pos + RECORD_HEADER_SIZE]);
            let len = u64::from_le_bytes(len) as usize;

            let offset = pos + RECORD_HEADER_SIZE;
            let end = offset
                .checked_add(len)
                .filter(|&end| end <= data.len())
                .ok_or(Error::UnexpectedEof(data.len() as u64))?;

            let entry = RecordEntry { compressed, offset, len };
            match tag {
                RecordTag::Event => events.push(entry),
                RecordTag::Metadata => {
                    let payload = Self::payload(data, &entry)?;
                    let text = String::from_utf8(payload)
                        .map_err(|e| Error::corrupt(format!("metadata record: {}", e)))?;
                    let (k, v) = decode_entry(&text)
                        .ok_or_else(|| Error::corrupt(format!("malformed metadata record '{}'", text)))?;
                    metadata.set(k, v);
                }
            }
            pos = end;
        }

        if !frozen {
            tracing::warn!("archive was not closed cleanly; reading {} complete records", events.len());
        }

        Ok(Self { bytes, version, frozen, events, metadata })
    }

    fn payload(data: &[u8], entry: &RecordEntry) -> Result<Vec<u8>> {
        let raw = &data[entry.offset..entry.offset + entry.len];
        if entry.compressed {
            decompress(raw)
        } else {
            Ok(raw.to_vec())
        }
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    /// Whether the writer closed the archive.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn num_events(&self) -> usize {
        self.events.len()
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    /// Decode the event at position `index` (write order).
    pub fn event(&self, index: usize) -> Result<SerializedEvent> {
        let entry = self.events.get(index).ok_or_else(|| {
            Error::NotFound(format!("event index {} (count: {})", index, self.events.len()))
        })?;
        let payload = Self::payload(self.bytes.as_slice(), entry)?;
        Ok(SerializedEvent::from_json(&payload)?)
    }

    /// Find an event by its event id.
    pub fn event_by_id(&self, event_id: i64) -> Result<SerializedEvent> {
        for i in 0..self.events.len() {
            let evt = self.event(i)?;
            if evt.event_id == event_id {
                return Ok(evt);
            }
        }
        Err(Error::NotFound(format!("event id {}", event_id)))
    }

    /// Iterate over all events in write order.
    pub fn events(&self) -> impl Iterator<Item = Result<SerializedEvent>> + '_ {
        (0..self.events.len()).map(move |i| self.event(i))
    }
}
