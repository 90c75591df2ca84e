//! Persisted key-value storage and the completion-flag capability.
//!
//! The wizard only ever sees the [`KeyValueStore`] trait: a durable,
//! string-keyed slot store. [`FileStore`] backs it with a single JSON
//! document under the data directory; [`MemoryStore`] backs tests.
//!
//! A corrupted backing file is treated the same as an absent one. It is
//! logged and the store starts empty; nothing here ever blocks a caller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::StoreError;

/// Durable string key-value slots, partitioned by key.
///
/// Implementations use interior mutability so the wizard can hold a
/// shared handle. Single-writer, single-reader access pattern; the
/// Mutex exists for handle sharing, not for cross-thread contention.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Externally owned per-survey completion flags.
///
/// The wizard only calls the setter; read-path semantics belong to the
/// surrounding application.
pub trait CompletionFlags: Send + Sync {
    fn set_complete(&self, survey_id: &str, complete: bool) -> Result<(), StoreError>;
}

/// Returns `~/.config/waypoint[-dev]/` based on WAYPOINT_ENV.
///
/// Set WAYPOINT_ENV=dev to use the development data directory, or
/// WAYPOINT_DATA_DIR to override the location entirely.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    if let Ok(explicit) = std::env::var("WAYPOINT_DATA_DIR") {
        let dir = PathBuf::from(explicit);
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::OpenFailed {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .ok_or(StoreError::NoDataDir)?
        .join(".config");

    let env = std::env::var("WAYPOINT_ENV").unwrap_or_else(|_| "production".to_string());
    let dir = if env == "dev" {
        base_dir.join("waypoint-dev")
    } else {
        base_dir.join("waypoint")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StoreError::OpenFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON document holding all slots.
///
/// Every mutation rewrites the whole document. The payload is a handful
/// of snapshots, so a full rewrite stays cheaper than bookkeeping.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store at the default location,
    /// `<data_dir>/store.json`.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::open(data_dir()?.join("store.json")))
    }

    /// Open (or create) the store at an explicit path.
    ///
    /// A missing or unreadable document yields an empty store; corruption
    /// is indistinguishable from "no prior data" by design.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<HashMap<String, String>>(&contents) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "store file corrupted, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries).map_err(|e| StoreError::WriteFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::WriteFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        debug!(path = %self.path.display(), "store flushed");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        self.flush(&entries)
    }
}

/// Completion flags persisted as `completed:<survey_id>` slots in a
/// key-value store.
pub struct StoreCompletionFlags<S: KeyValueStore> {
    store: std::sync::Arc<S>,
}

impl<S: KeyValueStore> StoreCompletionFlags<S> {
    pub fn new(store: std::sync::Arc<S>) -> Self {
        Self { store }
    }

    fn key(survey_id: &str) -> String {
        format!("completed:{survey_id}")
    }

    /// Read-path helper for the CLI status display.
    pub fn is_complete(&self, survey_id: &str) -> bool {
        matches!(self.store.get(&Self::key(survey_id)), Ok(Some(v)) if v == "true")
    }
}

impl<S: KeyValueStore> CompletionFlags for StoreCompletionFlags<S> {
    fn set_complete(&self, survey_id: &str, complete: bool) -> Result<(), StoreError> {
        if complete {
            self.store.set(&Self::key(survey_id), "true")
        } else {
            self.store.remove(&Self::key(survey_id))
        }
    }
}
