//! Event archive format constants.
//!
//! ```text
//! +------------------+
//! | Magic: "NXEVT"   |  5 bytes
//! +------------------+
//! | Frozen flag      |  1 byte (0x00 while writing, 0xFF once closed)
//! +------------------+
//! | Version          |  2 bytes (u16 LE)
//! +------------------+
//! | Record 0         |  tag u8 | flags u8 | len u64 LE | payload
//! | Record 1         |
//! | ...              |
//! +------------------+
//! ```

use crate::util::{Error, Result};

/// Magic bytes at the start of an archive.
pub const ARCHIVE_MAGIC: &[u8; 5] = b"NXEVT";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Offset of the frozen flag in the header.
pub const FROZEN_OFFSET: usize = 5;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 6;

/// Current archive format version.
pub const CURRENT_VERSION: u16 = 1;

pub const FROZEN_FLAG: u8 = 0xFF;
pub const NOT_FROZEN_FLAG: u8 = 0x00;

/// Size of a record header: tag, flags and payload length.
pub const RECORD_HEADER_SIZE: usize = 10;

/// Record flag: payload is zlib-compressed.
pub const FLAG_COMPRESSED: u8 = 0x01;

/// Kind of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordTag {
    /// JSON-encoded event.
    Event = 1,
    /// Escaped `key=value` run parameter.
    Metadata = 2,
}

impl RecordTag {
    pub fn from_u8(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Self::Event),
            2 => Ok(Self::Metadata),
            other => Err(Error::corrupt(format!("unknown record tag {}", other))),
        }
    }
}
