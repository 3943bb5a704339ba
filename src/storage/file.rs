//! JSON-file backed key-value store.
//!
//! All keys live in a single JSON object. Every write rewrites the file
//! through a temporary sibling and a rename, so a crash mid-write leaves the
//! previous contents intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::error::StoreError;
use super::KeyValueStore;

/// Data directory name under the user's home directory.
pub const DATA_DIR_NAME: &str = ".pomotimer";

/// File name of the store inside the data directory.
pub const STORE_FILE_NAME: &str = "store.json";

/// Returns the default data directory (`~/.pomotimer`).
///
/// # Errors
///
/// Returns `StoreError::HomeDirNotFound` if the home directory is unknown.
pub fn default_data_dir() -> Result<PathBuf, StoreError> {
    dirs::home_dir()
        .map(|home| home.join(DATA_DIR_NAME))
        .ok_or(StoreError::HomeDirNotFound)
}

/// Key-value store persisted as one JSON object on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates a store at `<data_dir>/store.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(STORE_FILE_NAME))
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| StoreError::Encode {
            key: "*".to_string(),
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;

        debug!("Store written: {}", self.path.display());
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        // A corrupt file is replaced; any other read failure keeps the file.
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StoreError::Corrupt(reason)) => {
                warn!("Replacing corrupt store {}: {}", self.path.display(), reason);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        f(&mut entries);
        self.write_all(&entries)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_get_missing_file_is_absent() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());

        assert_eq!(store.get("completedSessions").unwrap(), None);
    }

    #[test]
    fn test_set_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(&dir.path().join("nested").join("data"));

        store.set("completedSessions", "3").unwrap();

        assert!(store.path().exists());
        assert_eq!(store.get("completedSessions").unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        JsonFileStore::in_dir(dir.path())
            .set("lastActiveDay", "2024-05-01")
            .unwrap();

        let reopened = JsonFileStore::in_dir(dir.path());
        assert_eq!(
            reopened.get("lastActiveDay").unwrap().as_deref(),
            Some("2024-05-01")
        );
    }

    #[test]
    fn test_remove_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        store.remove("a").unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_corrupt_file_reports_error_and_is_replaced_on_write() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.get("a"), Err(StoreError::Corrupt(_))));

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        store.set("a", "1").unwrap();

        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_not_overwritten() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        store.set("completedSessions", "3").unwrap();

        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o200)).unwrap();
        if fs::read_to_string(store.path()).is_ok() {
            // Running as root, permissions are not enforced.
            return;
        }

        let result = store.set("lastActiveDay", "2024-05-01");
        assert!(matches!(result, Err(StoreError::Io { .. })));

        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o600)).unwrap();
        assert_eq!(store.get("completedSessions").unwrap().as_deref(), Some("3"));
    }
}
