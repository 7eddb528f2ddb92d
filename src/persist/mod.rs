//! Persistence layer - configuration, event archives and the persistency manager.
//!
//! This module provides:
//! - [`PersistencyConfig`] - Store toggles, output paths and macro commands
//! - [`EventWriter`] - Output seam with [`ArchiveWriter`] and [`MemoryWriter`]
//! - [`EventArchive`] - Reader for archives written by [`ArchiveWriter`]
//! - [`PersistencyManager`] - Per-run owner of the output

mod compression;
mod config;
mod manager;
mod reader;
mod stream;
mod writer;
pub mod format;

pub use compression::{compress, decompress};
pub use config::{Command, PersistencyConfig, COMMAND_PREFIX, DEFAULT_HISTORY_FILE};
pub use manager::PersistencyManager;
pub use reader::EventArchive;
pub use writer::{ArchiveWriter, EventWriter, MemoryWriter};
