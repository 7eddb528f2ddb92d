//! Persistency settings and the `/nexus/persistency/` command surface.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::event::StoreOptions;
use crate::util::{Error, Result};

/// Prefix shared by all persistency commands.
pub const COMMAND_PREFIX: &str = "/nexus/persistency/";

/// Default history file read at the end of a run.
pub const DEFAULT_HISTORY_FILE: &str = "G4history.macro";

/// Settings of the persistency manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistencyConfig {
    // Output
    pub output_file: Option<PathBuf>,
    pub history_file: PathBuf,
    pub compression_level: i32,  // -1 or 0 = off, 1-9 zlib level

    // What gets stored
    pub store_event: bool,
    pub store_trajectories: bool,
    pub store_ionization_hits: bool,
    pub store_pmt_hits: bool,
}

impl Default for PersistencyConfig {
    fn default() -> Self {
        Self {
            output_file: None,
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            compression_level: -1,
            store_event: true,
            store_trajectories: true,
            store_ionization_hits: true,
            store_pmt_hits: true,
        }
    }
}

/// A parsed persistency command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    OutputFile(PathBuf),
    HistoryFile(PathBuf),
    StoreTrajectories(bool),
    StoreIonizationHits(bool),
    StorePmtHits(bool),
    StoreEvents(bool),
}

impl Command {
    /// Parse a line such as `/nexus/persistency/StorePMTHits false`.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (path, arg) = match line.split_once(char::is_whitespace) {
            Some((p, a)) => (p, a.trim()),
            None => (line, ""),
        };
        let name = path
            .strip_prefix(COMMAND_PREFIX)
            .ok_or_else(|| Error::InvalidCommand(format!("'{}' is not a persistency command", path)))?;

        let command = match name {
            "outputFile" => Self::OutputFile(parse_path(name, arg)?),
            "historyFile" => Self::HistoryFile(parse_path(name, arg)?),
            "StoreTrajectories" => Self::StoreTrajectories(parse_bool(name, arg)?),
            "StoreIonizationHits" => Self::StoreIonizationHits(parse_bool(name, arg)?),
            "StorePMTHits" => Self::StorePmtHits(parse_bool(name, arg)?),
            "StoreEvents" => Self::StoreEvents(parse_bool(name, arg)?),
            other => return Err(Error::InvalidCommand(format!("unknown command '{}'", other))),
        };
        Ok(command)
    }
}

fn parse_path(name: &str, arg: &str) -> Result<PathBuf> {
    if arg.is_empty() {
        return Err(Error::InvalidCommand(format!("{} requires a path", name)));
    }
    Ok(PathBuf::from(arg))
}

fn parse_bool(name: &str, arg: &str) -> Result<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(Error::InvalidCommand(format!("{}: '{}' is not a boolean", name, other))),
    }
}

impl PersistencyConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Save settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Parts of an event to store.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            trajectories: self.store_trajectories,
            ionization_hits: self.store_ionization_hits,
            pmt_hits: self.store_pmt_hits,
        }
    }

    /// Apply a parsed command to the settings.
    pub fn apply(&mut self, command: &Command) {
        match command {
            Command::OutputFile(p) => self.output_file = Some(p.clone()),
            Command::HistoryFile(p) => self.history_file = p.clone(),
            Command::StoreTrajectories(v) => self.store_trajectories = *v,
            Command::StoreIonizationHits(v) => self.store_ionization_hits = *v,
            Command::StorePmtHits(v) => self.store_pmt_hits = *v,
            Command::StoreEvents(v) => self.store_event = *v,
        }
    }

    /// Parse and apply one command line.
    pub fn apply_command(&mut self, line: &str) -> Result<Command> {
        let command = Command::parse(line)?;
        self.apply(&command);
        Ok(command)
    }
}
