//! Snapshot persistence.
//!
//! The whole [`State`] is stored as one JSON document under a single key.
//! On load the stored top-level fields are laid over the seed, so a
//! snapshot written before a field existed still loads with that field
//! defaulted. Entity collections and selections are seeded only as a
//! group: once a snapshot carries any of them, the missing ones start
//! empty so nothing can point into seed data.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::lock::{LockError, StorageLock};
use crate::model::State;
use crate::reducer::Allocator;
use crate::seed::seed_state;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    #[error("snapshot is not valid state JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl PersistError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::StorageReadFailed,
            Self::Write { .. } => ErrorCode::StorageWriteFailed,
            Self::Lock(err) => err.code(),
            Self::Corrupt(_) => ErrorCode::SnapshotCorrupt,
        }
    }
}

/// String key-value storage for snapshots.
pub trait Storage {
    /// # Errors
    ///
    /// Returns [`PersistError`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// # Errors
    ///
    /// Returns [`PersistError`] if the value cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;

    /// # Errors
    ///
    /// Returns [`PersistError`] if an existing value cannot be removed.
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

/// One `<key>.json` file per key in a directory.
///
/// Writes go to a temporary sibling and are renamed into place while an
/// exclusive `<key>.lock` is held, so readers never see half a snapshot.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.lock"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistError::Read { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path_for(key);
        let write_err = |source| PersistError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let _lock = StorageLock::acquire(&self.lock_path(key), self.lock_timeout)?;

        let tmp = self.dir.join(format!("{key}.json.tmp"));
        let mut file = File::create(&tmp).map_err(write_err)?;
        file.write_all(value.as_bytes()).map_err(write_err)?;
        file.sync_data().map_err(write_err)?;
        drop(file);
        fs::rename(&tmp, &path).map_err(write_err)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        let path = self.path_for(key);
        let _lock = StorageLock::acquire(&self.lock_path(key), self.lock_timeout)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistError::Write { path, source }),
        }
    }
}

/// Process-local storage, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Top-level keys that hold entities or point at them.
const ENTITY_KEYS: [&str; 10] = [
    "works",
    "characters",
    "chapters",
    "scenes",
    "blocks",
    "whiteboardNodes",
    "whiteboardEdges",
    "activeWorkId",
    "activeDocumentId",
    "activeLensId",
];

/// Lay the top-level fields of `raw` over `seed`.
///
/// View settings always fall back to the seed. Entity data falls back to
/// the seed only when `raw` has none of [`ENTITY_KEYS`].
///
/// # Errors
///
/// Returns [`PersistError::Corrupt`] if `raw` is not a JSON object or a
/// merged field has the wrong shape.
pub fn merge_over_seed(seed: &State, raw: &str) -> Result<State, PersistError> {
    let stored: Value = serde_json::from_str(raw)?;
    let Value::Object(stored) = stored else {
        return Err(PersistError::Corrupt(serde::de::Error::custom(
            "snapshot is not a JSON object",
        )));
    };

    let mut merged = serde_json::to_value(seed)?;
    if let Value::Object(fields) = &mut merged {
        if ENTITY_KEYS.iter().any(|key| stored.contains_key(*key)) {
            for key in ENTITY_KEYS {
                fields.remove(key);
            }
        }
        fields.extend(stored);
    }
    Ok(serde_json::from_value(merged)?)
}

/// Load the state under `key`, falling back to a fresh seed when nothing
/// usable is stored.
pub fn load_state(storage: &dyn Storage, key: &str, alloc: &mut dyn Allocator) -> State {
    let seed = seed_state(alloc);
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!(key, "no stored snapshot, starting from seed");
            return seed;
        }
        Err(err) => {
            warn!(key, code = %err.code(), error = %err, "snapshot unreadable, starting from seed");
            return seed;
        }
    };

    match merge_over_seed(&seed, &raw) {
        Ok(state) => {
            info!(key, works = state.works.len(), "loaded stored snapshot");
            state
        }
        Err(err) => {
            warn!(key, code = %err.code(), error = %err, "stored snapshot is corrupt, starting from seed");
            seed
        }
    }
}

/// Serialize and write `state` under `key`.
///
/// # Errors
///
/// Returns [`PersistError`] if encoding or the storage write fails.
pub fn save_state(storage: &mut dyn Storage, key: &str, state: &State) -> Result<(), PersistError> {
    let json = serde_json::to_string(state)?;
    storage.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActiveTab;
    use crate::reducer::SequentialAllocator;
    use crate::verify::verify_state;

    fn seed() -> State {
        seed_state(&mut SequentialAllocator::new("seed"))
    }

    #[test]
    fn file_storage_round_trips_and_replaces() -> Result<(), PersistError> {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut storage = FileStorage::new(dir.path().join("data"), Duration::from_millis(200));

        assert_eq!(storage.get("k")?, None);
        storage.set("k", "{\"a\":1}")?;
        storage.set("k", "{\"a\":2}")?;
        assert_eq!(storage.get("k")?.as_deref(), Some("{\"a\":2}"));
        assert!(!dir.path().join("data/k.json.tmp").exists());

        storage.remove("k")?;
        storage.remove("k")?;
        assert_eq!(storage.get("k")?, None);
        Ok(())
    }

    #[test]
    fn partial_snapshot_does_not_mix_in_seed_entities() {
        let seed = seed();
        let raw = r#"{"works": [], "focusMode": true}"#;
        let state = merge_over_seed(&seed, raw).expect("merge");
        assert!(state.works.is_empty());
        assert!(state.characters.is_empty());
        assert!(state.blocks.is_empty());
        assert_eq!(state.active_work_id, None);
        assert_eq!(state.active_document_id, None);
        assert!(state.focus_mode);
        assert_eq!(state.active_tab, ActiveTab::Writing);
        assert!(verify_state(&state).is_ok());
    }

    #[test]
    fn view_only_snapshot_keeps_seed_content() {
        let seed = seed();
        let raw = r#"{"activeTab": "compile"}"#;
        let state = merge_over_seed(&seed, raw).expect("merge");
        assert_eq!(state.active_tab, ActiveTab::Compile);
        assert_eq!(State { active_tab: ActiveTab::Writing, ..state }, seed);
    }

    #[test]
    fn snapshot_without_whiteboard_defaults_it() {
        let mut seed = seed();
        let mut stored = seed.clone();
        stored.whiteboard_nodes.clear();
        let mut raw: Value = serde_json::to_value(&stored).expect("encode");
        if let Value::Object(fields) = &mut raw {
            fields.remove("whiteboardNodes");
            fields.remove("whiteboardEdges");
        }
        seed.whiteboard_nodes.push(crate::model::WhiteboardNode {
            id: crate::model::NodeId::new("seeded"),
            work_id: seed.works[0].id.clone(),
            position: crate::model::Position::default(),
            description: None,
        });

        let state = merge_over_seed(&seed, &raw.to_string()).expect("merge");
        assert_eq!(state, stored);
    }

    #[test]
    fn non_object_snapshot_is_corrupt() {
        let err = merge_over_seed(&seed(), "[1, 2]").expect_err("array is not a snapshot");
        assert_eq!(err.code(), ErrorCode::SnapshotCorrupt);
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_seed() {
        let mut storage = MemoryStorage::default();
        storage.set("quill-state", "{ not json").expect("memory set");
        let state = load_state(&storage, "quill-state", &mut SequentialAllocator::new("seed"));
        assert_eq!(state, seed());
    }

    #[test]
    fn saved_state_loads_back() {
        let mut storage = MemoryStorage::default();
        let mut state = seed();
        state.show_descriptions = true;
        state.works[0].title = "Renamed".into();
        save_state(&mut storage, "quill-state", &state).expect("save");

        let loaded = load_state(&storage, "quill-state", &mut SequentialAllocator::new("other"));
        assert_eq!(loaded, state);
    }
}
