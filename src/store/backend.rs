// Key-value storage backends for persisted client state

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Errors raised by storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage file {path} is malformed: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("Refusing to store invalid entry: {0}")]
    InvalidEntry(String),
}

/// Durable string key-value storage, the equivalent of browser local storage
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object file mapping keys to string values
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves either the old or the new document.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<HashMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        // A malformed document is replaced rather than blocking new writes
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Corrupt { reason, .. }) => {
                tracing::warn!(
                    "Overwriting malformed storage file {}: {}",
                    self.path.display(),
                    reason
                );
                HashMap::new()
            }
            Err(e) => return Err(e),
        };

        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        match self.read_entries() {
            Ok(mut entries) => {
                if entries.remove(key).is_some() {
                    self.write_entries(&entries)?;
                }
                Ok(())
            }
            Err(StorageError::Corrupt { .. }) => {
                fs::remove_file(&self.path)?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v1").unwrap();
        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        // Removing a missing key is not an error
        storage.remove("k").unwrap();
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get("anything").unwrap(), None);
        storage.remove("anything").unwrap();
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        FileStorage::new(&path).set("a", "1").unwrap();
        FileStorage::new(&path).set("b", "2").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_storage_reports_malformed_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get("k"),
            Err(StorageError::Corrupt { .. })
        ));

        // Writing replaces the malformed document
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_storage_remove_deletes_malformed_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let storage = FileStorage::new(&path);
        storage.remove("k").unwrap();
        assert!(!path.exists());
        assert_eq!(storage.get("k").unwrap(), None);
    }
}
