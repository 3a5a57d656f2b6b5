//! Durable key-value storage for the client, the counterpart of browser
//! `localStorage`. Values are plain strings. `FileStorage` keeps a JSON object on
//! disk and rewrites it on every mutation so a crash never leaves a partially
//! written file behind.

use crate::errors::AppError;
use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, warn};

/// Logical keys persisted by the application.
pub mod keys {
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USER_DATA: &str = "user_data";
    pub const THEME: &str = "theme";
    pub const LANGUAGE: &str = "language";
}

/// Synchronous key-value store.
pub trait Storage: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns `AppError::Storage` when the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// # Errors
    /// Returns `AppError::Storage` when the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), AppError>;

    /// Removes every key.
    ///
    /// # Errors
    /// Returns `AppError::Storage` when the store cannot be emptied.
    fn clear(&self) -> Result<(), AppError>;

    fn keys(&self) -> Vec<String>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        lock(&self.entries).clear();
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        lock(&self.entries).keys().cloned().collect()
    }
}

/// JSON-file backed store surviving process restarts.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .field("entries", &"***")
            .finish()
    }
}

impl FileStorage {
    /// Opens (or lazily creates) the store at `path`.
    ///
    /// A file that is not a JSON object of strings is treated as empty and will
    /// be overwritten by the next mutation.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the parent directory cannot be created or
    /// the file exists but cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                AppError::Storage(format!("Failed to create {}: {err}", parent.display()))
            })?;
        }

        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<BTreeMap<String, String>>(&raw).unwrap_or_else(|err| {
                warn!("discarding unreadable store {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {err}",
                    path.display()
                )))
            }
        };

        debug!("opened store {} with {} keys", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory map only changes once the new contents are on disk.
    fn mutate(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), AppError> {
        let mut entries = lock(&self.entries);
        let mut next = entries.clone();
        apply(&mut next);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
        let payload = serde_json::to_string_pretty(entries)
            .map_err(|err| AppError::Serialization(format!("Failed to encode store: {err}")))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, payload)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|err| {
                AppError::Storage(format!("Failed to write {}: {err}", self.path.display()))
            })
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), AppError> {
        self.mutate(BTreeMap::clear)
    }

    fn keys(&self) -> Vec<String> {
        lock(&self.entries).keys().cloned().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("lingodesk-storage-{}", ulid::Ulid::new()))
            .join("store.json")
    }

    #[test]
    fn memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set(keys::AUTH_TOKEN, "t1").unwrap();
        assert_eq!(storage.get(keys::AUTH_TOKEN), Some("t1".to_string()));
        storage.remove(keys::AUTH_TOKEN).unwrap();
        assert_eq!(storage.get(keys::AUTH_TOKEN), None);
    }

    #[test]
    fn memory_storage_clear_removes_every_key() {
        let storage = MemoryStorage::new();
        storage.set(keys::AUTH_TOKEN, "t1").unwrap();
        storage.set(keys::THEME, "dark").unwrap();
        storage.clear().unwrap();
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let path = temp_store_path();
        {
            let storage = FileStorage::open(&path).unwrap();
            storage.set(keys::AUTH_TOKEN, "t1").unwrap();
            storage.set(keys::LANGUAGE, "fr").unwrap();
        }

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(keys::AUTH_TOKEN), Some("t1".to_string()));
        assert_eq!(reopened.get(keys::LANGUAGE), Some("fr".to_string()));

        reopened.clear().unwrap();
        let emptied = FileStorage::open(&path).unwrap();
        assert!(emptied.keys().is_empty());
    }

    #[test]
    fn file_storage_discards_corrupt_file() {
        let path = temp_store_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.keys().is_empty());
        storage.set(keys::THEME, "light").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"theme\""));
    }

    #[test]
    fn file_storage_keeps_memory_and_disk_in_step_when_write_fails() {
        let path = temp_store_path();
        let storage = FileStorage::open(&path).unwrap();
        storage.set(keys::AUTH_TOKEN, "t1").unwrap();

        let tmp = path.with_extension("tmp");
        fs::create_dir_all(&tmp).unwrap();
        assert!(storage.set(keys::AUTH_TOKEN, "t2").is_err());
        assert!(storage.remove(keys::AUTH_TOKEN).is_err());
        assert_eq!(storage.get(keys::AUTH_TOKEN), Some("t1".to_string()));

        fs::remove_dir(&tmp).unwrap();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(keys::AUTH_TOKEN), Some("t1".to_string()));
    }
}
