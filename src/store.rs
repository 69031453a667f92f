use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::WatchlistRecord;

/// Key the watchlist record is persisted under.
pub const STORAGE_KEY: &str = "crypto-watchlist";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Backend refused the operation without a filesystem cause. For
    /// [`KeyValueStore`] implementations other than [`FileStore`], such as a
    /// quota-limited or remote store.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// String key-value storage, the native stand-in for browser local storage.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads and writes the watchlist record under [`STORAGE_KEY`].
#[derive(Debug)]
pub struct RecordStore<S> {
    inner: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Overwrites the stored record. Failures are returned, never swallowed.
    pub fn save(&mut self, record: &WatchlistRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;
        self.inner.set(STORAGE_KEY, &json)
    }

    /// Raw payload at the key, `None` if nothing was ever saved.
    pub fn load(&self) -> Result<Option<String>, StoreError> {
        self.inner.get(STORAGE_KEY)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        let mut store = FileStore::new(&nested);

        store.set(STORAGE_KEY, r#"{"a":1}"#).unwrap();
        store.set(STORAGE_KEY, r#"{"b":2}"#).unwrap();

        assert_eq!(store.get(STORAGE_KEY).unwrap().as_deref(), Some(r#"{"b":2}"#));
        assert!(nested.join("crypto-watchlist.json").exists());
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        for key in ["", "../escape", "a/b", "a\\b"] {
            assert!(matches!(store.set(key, "x"), Err(StoreError::InvalidKey(_))));
            assert!(matches!(store.get(key), Err(StoreError::InvalidKey(_))));
        }
    }

    #[test]
    fn file_store_write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let mut store = FileStore::new(&blocker);
        assert!(matches!(store.set(STORAGE_KEY, "{}"), Err(StoreError::Io { .. })));
    }

    #[test]
    fn record_store_saves_under_fixed_key() {
        let mut records = RecordStore::new(MemoryStore::new());
        assert_eq!(records.load().unwrap(), None);

        records.save(&WatchlistRecord::default()).unwrap();

        let raw = records.inner().get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"view":"watchlist","assets":[]}"#);
        assert_eq!(records.load().unwrap(), Some(raw));
    }
}
