// Key-value storage service
//
// Durable and session-scoped storage behind one small trait so the
// transport, the state store, and the cache manager can share a store
// by reference (and tests can hand in an in-memory double). Values are
// strings; structured data is stored as JSON text.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Well-known keys in durable storage.
pub mod keys {
    /// Bearer credential issued at login.
    pub const TOKEN: &str = "token";
    /// Serialized user profile.
    pub const USER: &str = "user";
    /// Serialized favorite-stock list (read-through cache).
    pub const FAVORITES: &str = "favoriteStocks";
    /// Build token of the client that last reconciled the cache.
    pub const APP_VERSION: &str = "app_version";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file {path} is not a valid JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A string key-value store with last-write-wins semantics.
///
/// Implementations must tolerate concurrent use from several components;
/// none of them may assume exclusive access.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, in no particular order.
    fn keys(&self) -> Vec<String>;

    fn clear(&self) -> Result<(), StorageError>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Read and decode a JSON value. Undecodable entries are treated as absent.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "ignoring undecodable stored value");
            None
        }
    }
}

/// Encode a value as JSON and store it.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, &raw)
}

// ── In-memory store ─────────────────────────────────────────────────

/// Process-local store. Used for session-scoped storage and as a test double.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }
}

// ── File-backed store ───────────────────────────────────────────────

/// Durable store persisted as a single JSON object on disk.
///
/// The file is read once on open; every mutation rewrites it through a
/// temporary file and a rename so a crash never leaves a torn document.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store. The file itself is only created
    /// on the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "opened durable storage");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StorageError> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // Memory only moves once the disk has the new document.
        let mut next = guard.clone();
        if f(&mut next) {
            self.flush(&next)?;
            *guard = next;
        }
        Ok(())
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Encode {
            key: "*".into(),
            source,
        })?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.mutate(|entries| {
            let had_entries = !entries.is_empty();
            entries.clear();
            had_entries
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_basic_ops() {
        let store = MemoryStorage::new();
        assert!(store.get(keys::TOKEN).is_none());

        store.set(keys::TOKEN, "abc").unwrap();
        assert_eq!(store.get(keys::TOKEN).as_deref(), Some("abc"));
        assert!(store.contains(keys::TOKEN));

        store.set(keys::TOKEN, "def").unwrap();
        assert_eq!(store.get(keys::TOKEN).as_deref(), Some("def"));

        store.remove(keys::TOKEN).unwrap();
        store.remove(keys::TOKEN).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn json_helpers_round_trip_and_ignore_garbage() {
        let store = MemoryStorage::new();
        write_json(&store, keys::FAVORITES, &vec!["600519", "000001"]).unwrap();
        let codes: Vec<String> = read_json(&store, keys::FAVORITES).unwrap();
        assert_eq!(codes, vec!["600519", "000001"]);

        store.set(keys::USER, "{not json").unwrap();
        assert!(read_json::<serde_json::Value>(&store, keys::USER).is_none());
    }

    #[test]
    fn file_storage_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStorage::open(&path).unwrap();
        assert!(store.keys().is_empty());
        assert!(!path.exists());

        store.set(keys::TOKEN, "tok").unwrap();
        store.set("scratch", "1").unwrap();
        store.remove("scratch").unwrap();
        drop(store);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(keys::TOKEN).as_deref(), Some("tok"));
        assert_eq!(reopened.keys(), vec![keys::TOKEN.to_owned()]);

        reopened.clear().unwrap();
        reopened.clear().unwrap();
        assert!(FileStorage::open(&path).unwrap().keys().is_empty());
    }

    #[test]
    fn file_storage_failed_write_keeps_previous_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let store = FileStorage::open(&path).unwrap();
        store.set(keys::TOKEN, "old").unwrap();

        // A directory squatting on the temp file makes the next write fail.
        let tmp = path.with_extension("tmp");
        std::fs::create_dir(&tmp).unwrap();
        assert!(store.set(keys::TOKEN, "new").is_err());
        assert!(store.set("extra", "1").is_err());
        assert!(store.clear().is_err());
        assert_eq!(store.get(keys::TOKEN).as_deref(), Some("old"));
        assert_eq!(store.keys(), vec![keys::TOKEN.to_owned()]);

        std::fs::remove_dir(&tmp).unwrap();
        store.set("extra", "1").unwrap();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(keys::TOKEN).as_deref(), Some("old"));
        assert_eq!(reopened.get("extra").as_deref(), Some("1"));
    }

    #[test]
    fn file_storage_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = FileStorage::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
