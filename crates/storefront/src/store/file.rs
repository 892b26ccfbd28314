//! File-backed storage.
//!
//! The whole store is one JSON object (`{"kv_cart": "...", ...}`) kept in
//! memory and rewritten on every mutation. Writes go through a temporary
//! file in the same directory followed by a rename, so a crash never leaves
//! a half-written document behind.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{KeyValueStorage, StorageError};

/// Storage persisted to a JSON document on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file starts an empty store. An unreadable or corrupted file
    /// is logged and also starts empty; it is overwritten on the next write.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = read_document(&path);
        debug!(path = %path.display(), keys = items.len(), "Opened storage file");
        Self {
            path,
            items: Mutex::new(items),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, items)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn read_document(path: &Path) -> BTreeMap<String, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read storage file, starting empty");
            return BTreeMap::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Corrupted storage file, starting empty");
        BTreeMap::new()
    })
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_owned(), value.to_owned());
        self.flush(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        if items.remove(key).is_some() {
            self.flush(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("state.json"));
        assert!(storage.get_item("kv_cart").unwrap().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let storage = FileStorage::open(&path);
        storage.set_item("kv_favs", "[\"1\"]").unwrap();
        storage.set_item("access_token", "tok").unwrap();
        storage.remove_item("access_token").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path);
        assert_eq!(
            reopened.get_item("kv_favs").unwrap().as_deref(),
            Some("[\"1\"]")
        );
        assert!(reopened.get_item("access_token").unwrap().is_none());
    }

    #[test]
    fn test_corrupted_file_starts_empty_and_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json at all").unwrap();

        let storage = FileStorage::open(&path);
        assert!(storage.get_item("kv_cart").unwrap().is_none());

        storage.set_item("kv_cart", "{}").unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let doc: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc.get("kv_cart").map(String::as_str), Some("{}"));
    }
}
