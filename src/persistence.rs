//! # Snapshot Persistence
//!
//! Stores keep the latest snapshot of each game kind so a game can be resumed
//! after a restart. A snapshot is the JSON form of a [`GameWrapper`]; it
//! includes the generator state of games that draw random numbers, so a
//! restored game continues exactly as the original would have.

use crate::game_wrapper::{GameKind, GameWrapper};
use crate::ArenaError;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Storage for the latest snapshot of each game kind.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, state: &GameWrapper) -> Result<(), ArenaError>;
    fn load(&self, kind: GameKind) -> Result<Option<GameWrapper>, ArenaError>;
    fn clear(&self, kind: GameKind) -> Result<(), ArenaError>;
}

fn decode(kind: GameKind, json: &str) -> Result<GameWrapper, ArenaError> {
    let state = GameWrapper::from_json(json)?;
    if state.kind() != kind {
        return Err(ArenaError::SnapshotMismatch {
            expected: kind,
            found: state.kind(),
        });
    }
    Ok(state)
}

/// Keeps snapshots as JSON strings in memory.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slots: Mutex<HashMap<GameKind, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON currently stored for `kind`.
    pub fn raw(&self, kind: GameKind) -> Option<String> {
        self.slots.lock().get(&kind).cloned()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, state: &GameWrapper) -> Result<(), ArenaError> {
        let json = state.to_json()?;
        self.slots.lock().insert(state.kind(), json);
        Ok(())
    }

    fn load(&self, kind: GameKind) -> Result<Option<GameWrapper>, ArenaError> {
        match self.slots.lock().get(&kind) {
            Some(json) => decode(kind, json).map(Some),
            None => Ok(None),
        }
    }

    fn clear(&self, kind: GameKind) -> Result<(), ArenaError> {
        self.slots.lock().remove(&kind);
        Ok(())
    }
}

/// Keeps one `<kind>.json` file per game kind in a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Opens a store in `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, ArenaError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, kind: GameKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.slug()))
    }
}

impl SnapshotStore for FileSnapshotStore {
    /// Writes to a temporary file first so a crash never leaves a torn snapshot.
    fn save(&self, state: &GameWrapper) -> Result<(), ArenaError> {
        let json = state.to_json()?;
        let path = self.path_for(state.kind());
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        debug!("saved {} snapshot to {}", state.kind(), path.display());
        Ok(())
    }

    fn load(&self, kind: GameKind) -> Result<Option<GameWrapper>, ArenaError> {
        match fs::read_to_string(self.path_for(kind)) {
            Ok(json) => decode(kind, &json).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self, kind: GameKind) -> Result<(), ArenaError> {
        match fs::remove_file(self.path_for(kind)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
