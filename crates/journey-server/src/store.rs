//! Where saved games live between calls.
//!
//! Stores deal in opaque bytes; encoding is the registry's business.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use journey_protocol::GameId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt entry for game {0}")]
    Corrupt(GameId),
}

pub trait GameStore: Send + Sync {
    fn load(&self, id: GameId) -> Result<Option<Vec<u8>>, StoreError>;
    fn save(&self, id: GameId, bytes: &[u8]) -> Result<(), StoreError>;
    /// Returns whether anything was removed.
    fn remove(&self, id: GameId) -> Result<bool, StoreError>;
    fn ids(&self) -> Result<Vec<GameId>, StoreError>;

    fn contains(&self, id: GameId) -> Result<bool, StoreError> {
        Ok(self.load(id)?.is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<GameId, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn load(&self, id: GameId) -> Result<Option<Vec<u8>>, StoreError> {
        let games = self.games.read().unwrap_or_else(PoisonError::into_inner);
        Ok(games.get(&id).cloned())
    }

    fn save(&self, id: GameId, bytes: &[u8]) -> Result<(), StoreError> {
        let mut games = self.games.write().unwrap_or_else(PoisonError::into_inner);
        games.insert(id, bytes.to_vec());
        Ok(())
    }

    fn remove(&self, id: GameId) -> Result<bool, StoreError> {
        let mut games = self.games.write().unwrap_or_else(PoisonError::into_inner);
        Ok(games.remove(&id).is_some())
    }

    fn ids(&self) -> Result<Vec<GameId>, StoreError> {
        let games = self.games.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<GameId> = games.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    fn contains(&self, id: GameId) -> Result<bool, StoreError> {
        let games = self.games.read().unwrap_or_else(PoisonError::into_inner);
        Ok(games.contains_key(&id))
    }
}

/// One `game-<id>.msgpack` file per game under a directory.
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Creates `root` if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: GameId) -> PathBuf {
        self.root.join(format!("game-{}.msgpack", id.0))
    }

    fn parse_id(path: &Path) -> Option<GameId> {
        let name = path.file_name()?.to_str()?;
        let digits = name.strip_prefix("game-")?.strip_suffix(".msgpack")?;
        digits.parse().ok().map(GameId)
    }
}

impl GameStore for DirStore {
    fn load(&self, id: GameId) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(id)) {
            Ok(bytes) if bytes.is_empty() => Err(StoreError::Corrupt(id)),
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes to a temporary file first so a crash never leaves a torn entry.
    fn save(&self, id: GameId, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(id);
        let tmp = path.with_extension("msgpack.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, id: GameId) -> Result<bool, StoreError> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn ids(&self) -> Result<Vec<GameId>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            if let Some(id) = Self::parse_id(&entry?.path()) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}
