//! Error types for the persistency library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for property tables, event assembly and persistence.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input, e.g. a property table with a non-monotonic energy axis
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Lookup against a name that was never registered
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record references a parent with no corresponding record
    #[error("Event {event}: track {track} references missing parent {parent}")]
    DanglingParent { event: i64, track: u32, parent: u32 },

    /// Parent links of an event do not form a forest
    #[error("Event {event}: parent chain of track {track} forms a cycle")]
    ParentCycle { event: i64, track: u32 },

    /// A hit or finish call references a track absent from the current event
    #[error("Event {event}: unknown track {track}")]
    UnknownTrack { event: i64, track: u32 },

    /// A hit collection matches none of the known kinds
    #[error("Event {event}: hit collection '{collection}' is of unknown kind '{kind}'")]
    UnknownHitKind { event: i64, collection: String, kind: String },

    /// A track was finished after it had already been finalized
    #[error("Event {event}: track {track} finished twice")]
    TrackAlreadyFinished { event: i64, track: u32 },

    /// The same track identifier was started twice within one event
    #[error("Event {event}: duplicate track {track}")]
    DuplicateTrack { event: i64, track: u32 },

    /// The output destination cannot be opened or is not open
    #[error("Output unavailable ({path}): {reason}")]
    OutputUnavailable { path: PathBuf, reason: String },

    /// An output file was already opened for this run
    #[error("An output file was previously opened: {0}")]
    AlreadyOpen(PathBuf),

    /// Invalid magic bytes at start of an archive
    #[error("Invalid event archive: expected NXEVT magic bytes")]
    InvalidMagic,

    /// Unsupported archive version
    #[error("Unsupported archive version: {0}")]
    UnsupportedVersion(u16),

    /// Archive is truncated or corrupted
    #[error("Unexpected end of file at position {0}")]
    UnexpectedEof(u64),

    /// Invalid data structure in archive
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Malformed or unknown configuration command
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Archive is frozen (closed) and cannot be modified
    #[error("Archive is frozen and cannot be modified")]
    Frozen,

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid structure error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Errors confined to one event: the event is dropped, the run goes on.
    pub fn is_event_local(&self) -> bool {
        matches!(
            self,
            Self::DanglingParent { .. }
                | Self::ParentCycle { .. }
                | Self::UnknownTrack { .. }
                | Self::UnknownHitKind { .. }
                | Self::TrackAlreadyFinished { .. }
                | Self::DuplicateTrack { .. }
        )
    }
}

/// Result type alias for persistency operations.
pub type Result<T> = std::result::Result<T, Error>;
