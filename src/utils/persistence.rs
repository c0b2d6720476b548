//! JSON persistence for the world snapshot.
//!
//! The whole world lives in one pretty-printed `gamestate.json` under the
//! workspace directory. Last write wins.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::constants::STATE_FILE;
use crate::world::WorldState;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupted state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize world: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Full path of the state file inside `dir`.
pub fn state_path(dir: &Path) -> PathBuf {
    dir.join(STATE_FILE)
}

/// Loads the world from `dir`, or the initial world if no state file exists.
pub fn load_world(dir: &Path) -> Result<WorldState> {
    let path = state_path(dir);
    let json = match fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no saved world, starting fresh");
            return Ok(WorldState::initial());
        }
        Err(source) => return Err(PersistenceError::Io { path, source }),
    };
    serde_json::from_str(&json).map_err(|source| PersistenceError::Corrupt { path, source })
}

/// Saves the world as pretty-printed JSON, creating `dir` if needed.
/// Returns the fingerprint of what was written.
pub fn save_world(dir: &Path, state: &WorldState) -> Result<String> {
    let path = state_path(dir);
    fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let json = serde_json::to_string_pretty(state)?;
    fs::write(&path, &json).map_err(|source| PersistenceError::Io {
        path: path.clone(),
        source,
    })?;

    let fingerprint = world_fingerprint(state)?;
    tracing::info!(path = %path.display(), day = state.day, %fingerprint, "world saved");
    Ok(fingerprint)
}

/// SHA-256 of the compact JSON form, hex encoded. Maps are ordered, so equal
/// worlds always hash equally.
pub fn world_fingerprint(state: &WorldState) -> Result<String> {
    let bytes = serde_json::to_vec(state)?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}
