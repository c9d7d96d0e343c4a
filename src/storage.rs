//! Durable local key-value store: a flat JSON object of string values on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Storage key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// Storage key holding the whole progress store as one JSON blob.
pub const PROGRESS_KEY: &str = "learningProgress";

/// String values under string keys, written through on every `set`.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns backend-specific read errors.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns backend-specific write errors.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

/// Key-value store backed by a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    /// Current contents, mirrored to disk after every write.
    entries: BTreeMap<String, String>,
    /// Location of the backing file.
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::StorageCorrupt` if the file is not a JSON object of strings.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self { entries: BTreeMap::new(), path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        let entries = serde_json::from_str(&content).map_err(|e| {
            return Error::StorageCorrupt { path: path.to_path_buf(), reason: e.to_string() };
        })?;
        return Ok(Self { entries, path: path.to_path_buf() });
    }

    /// Write all entries to disk: temp sibling first, then rename over the target.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails, or `Error::Io` on write failure.
    fn flush(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        return Ok(());
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        return Ok(self.entries.get(key).cloned());
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_string());
        return self.flush();
    }
}

/// In-process store with no durability.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Stored values.
    entries: BTreeMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        return Ok(self.entries.get(key).cloned());
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_string());
        return Ok(());
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("storage.json")).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn writes_survive_reopen_and_create_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/storage.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set(THEME_KEY, "dark").unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn unparsable_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(Error::StorageCorrupt { .. })));
    }
}
