//! World-state snapshots read from a JSON file on disk.
//!
//! The host game writes its current world state to a file; [`WorldFile`]
//! re-reads it whenever the modification time changes. A file that does
//! not exist yet is not an error: the engine runs on a default world until
//! it appears.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use driftwake_types::WorldState;
use tracing::{debug, warn};

use crate::error::EngineError;

/// A world-state file and the modification time of the last read.
#[derive(Debug)]
pub struct WorldFile {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl WorldFile {
    /// Track the file at `path`. Nothing is read until [`Self::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
        }
    }

    /// The tracked path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the initial snapshot, falling back to a default world when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::WorldIo`] if the file exists but cannot be
    /// read, or [`EngineError::WorldParse`] if it is not a valid snapshot.
    pub fn load(&mut self) -> Result<WorldState, EngineError> {
        match self.reload_if_changed()? {
            Some(world) => Ok(world),
            None => {
                warn!(
                    path = %self.path.display(),
                    "world state file not found, starting from a default world"
                );
                Ok(WorldState::default())
            }
        }
    }

    /// Read the file again if its modification time moved since the last
    /// read. Returns `None` when unchanged or absent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::WorldIo`] if the file exists but cannot be
    /// read, or [`EngineError::WorldParse`] if it is not a valid snapshot.
    /// A failed read leaves the recorded modification time unchanged.
    pub fn reload_if_changed(&mut self) -> Result<Option<WorldState>, EngineError> {
        let modified = match std::fs::metadata(&self.path).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(EngineError::WorldIo {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if self.last_modified == Some(modified) {
            return Ok(None);
        }

        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| EngineError::WorldIo {
                path: self.path.clone(),
                source,
            })?;
        let world = parse_world(&self.path, &contents)?;
        self.last_modified = Some(modified);
        debug!(path = %self.path.display(), wake = world.wake, "world state loaded");
        Ok(Some(world))
    }
}

/// Decode a world snapshot from JSON.
fn parse_world(path: &Path, contents: &str) -> Result<WorldState, EngineError> {
    serde_json::from_str(contents).map_err(|source| EngineError::WorldParse {
        path: path.to_path_buf(),
        source,
    })
}
