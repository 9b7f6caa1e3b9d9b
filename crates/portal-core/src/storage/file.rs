use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::{Storage, StorageError};

/// Storage file name in the storage directory
const STORAGE_FILE: &str = "storage.json";

type Items = BTreeMap<String, String>;

/// Key-value storage backed by a single JSON object on disk.
///
/// The file is re-read on every access so the on-disk state is always the
/// source of truth. Writes rewrite the whole file.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(STORAGE_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_items(&self) -> Result<Items, StorageError> {
        if !self.path.exists() {
            return Ok(Items::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Items::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_items(&self, items: &Items) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Items) -> bool,
    {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut items = self.read_items()?;
        if f(&mut items) {
            self.write_items(&items)?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!(key, path = ?self.path, "Writing storage item");
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.update(|items| items.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get_item("token").unwrap(), None);
    }

    #[test]
    fn test_items_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::new(dir.path());
            storage.set_item("token", "abc").unwrap();
            storage.set_item("fullName", "A B").unwrap();
        }
        let reopened = FileStorage::new(dir.path());
        assert_eq!(reopened.get_item("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get_item("fullName").unwrap().as_deref(), Some("A B"));
    }

    #[test]
    fn test_remove_item() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set_item("token", "abc").unwrap();
        storage.remove_item("token").unwrap();
        assert_eq!(storage.get_item("token").unwrap(), None);
        // Removing a missing key is not an error
        storage.remove_item("token").unwrap();
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(&nested);
        storage.set_item("k", "v").unwrap();
        assert!(storage.path().exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(storage.path(), "{not json").unwrap();
        assert!(matches!(
            storage.get_item("token"),
            Err(StorageError::Malformed(_))
        ));
    }
}
