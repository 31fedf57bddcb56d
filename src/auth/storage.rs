//! Durable key-value storage for session credentials.
//!
//! The session is persisted under two keys: [`USER_KEY`] holds the
//! JSON-serialized profile and [`TOKEN_KEY`] holds the raw bearer token.
//! [`FileStorage`] keeps both in a single JSON object on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::StorageError;

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";

/// Minimal string key-value store.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage backed by a JSON object file, e.g. `~/.config/coderev/session.json`.
///
/// Every call reads the file fresh; writes replace it wholesale, so the last
/// writer wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_err(e)),
            };
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_err)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all().unwrap_or_default();
        if entries.remove(key).is_some() || self.path.exists() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a storage with existing entries.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_set_get_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/session.json");
        let storage = FileStorage::new(&path);

        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(USER_KEY, r#"{"name":"A"}"#).unwrap();
        assert!(path.exists());
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        storage.remove(TOKEN_KEY).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert!(storage.get(USER_KEY).unwrap().is_some());

        storage.remove(USER_KEY).unwrap();
        assert!(!path.exists(), "empty session file should be removed");
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileStorage::new(&path).set(TOKEN_KEY, "t1").unwrap();
        assert_eq!(
            FileStorage::new(&path).get(TOKEN_KEY).unwrap().as_deref(),
            Some("t1")
        );
    }

    #[test]
    fn test_file_storage_corrupt_file_is_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ nope").unwrap();
        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get(TOKEN_KEY),
            Err(StorageError::Json { .. })
        ));
    }

    #[test]
    fn test_file_storage_set_overwrites_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "garbage").unwrap();
        let storage = FileStorage::new(&path);
        storage.set(TOKEN_KEY, "fresh").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::with_entries([(TOKEN_KEY, "t")]);
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("t"));
        storage.remove(TOKEN_KEY).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }
}
