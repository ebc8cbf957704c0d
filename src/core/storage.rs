//! Key/value persistence on disk.
//!
//! Each key maps to one file inside the data directory: JSON documents are
//! stored as `<key>.json`, raw strings as `<key>`. Writes go through a temp
//! file in the same directory and are renamed into place.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error};

use crate::core::config::data::path_display;
use crate::core::constants::USER_ID_KEY;
use crate::core::ids::random_user_id;

#[derive(Debug)]
pub enum StorageError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Persist { path: PathBuf, source: tempfile::PersistError },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io { path, source } => {
                write!(f, "Storage I/O failed at {}: {}", path_display(path), source)
            }
            StorageError::Json { path, source } => {
                write!(f, "Invalid JSON in {}: {}", path_display(path), source)
            }
            StorageError::Persist { path, source } => {
                write!(f, "Failed to replace {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for StorageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StorageError::Io { source, .. } => Some(source),
            StorageError::Json { source, .. } => Some(source),
            StorageError::Persist { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn json_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn raw_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.json_path(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StorageError::Json { path, source })
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let path = self.json_path(key);
        let contents = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        self.write_atomic(&path, &contents)
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.raw_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents.trim().to_string()).filter(|s| !s.is_empty())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.raw_path(key);
        self.write_atomic(&path, value.as_bytes())
    }

    /// Load a list document, treating absence or corruption as empty.
    pub fn load_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.get_json::<Vec<T>>(key) {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(err) => {
                error!(key, "failed to load stored list: {err}");
                Vec::new()
            }
        }
    }

    /// Persist a list document, logging instead of failing.
    pub fn save_list<T: Serialize>(&self, key: &str, items: &[T]) {
        if let Err(err) = self.set_json(key, items) {
            error!(key, "failed to save list: {err}");
        } else {
            debug!(key, count = items.len(), "saved list");
        }
    }

    /// The persistent user id, generated on first use.
    ///
    /// If the id cannot be stored or generated a time-based anonymous id is
    /// returned so callers always get a seed.
    pub fn user_id(&self) -> String {
        match self.get_raw(USER_ID_KEY) {
            Ok(Some(id)) => return id,
            Ok(None) => {}
            Err(err) => error!("failed to read user id: {err}"),
        }

        let fallback = || format!("anonymous-user-{}", chrono::Utc::now().timestamp_millis());
        let id = match random_user_id() {
            Ok(id) => id,
            Err(err) => {
                error!("random source unavailable: {err}");
                return fallback();
            }
        };
        if let Err(err) = self.set_raw(USER_ID_KEY, &id) {
            error!("failed to persist user id: {err}");
        }
        id
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        temp_file.write_all(contents).map_err(io_err)?;
        temp_file.as_file_mut().sync_all().map_err(io_err)?;
        temp_file
            .persist(path)
            .map_err(|source| StorageError::Persist {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_keys_read_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = LocalStore::new(dir.path());
        assert!(store.get_json::<Vec<String>>("nothing").unwrap().is_none());
        assert!(store.get_raw("nothing").unwrap().is_none());
        assert!(store.load_list::<String>("nothing").is_empty());
    }

    #[test]
    fn json_round_trips_through_nested_dir() {
        let dir = TempDir::new().expect("temp dir");
        let store = LocalStore::new(dir.path().join("nested").join("data"));
        store
            .set_json("list", &vec!["a".to_string(), "b".to_string()])
            .expect("write");
        let loaded: Vec<String> = store.load_list("list");
        assert_eq!(loaded, vec!["a", "b"]);
    }

    #[test]
    fn corrupt_documents_load_as_empty() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        let store = LocalStore::new(dir.path());
        assert!(matches!(
            store.get_json::<Vec<String>>("broken"),
            Err(StorageError::Json { .. })
        ));
        assert!(store.load_list::<String>("broken").is_empty());
    }

    #[test]
    fn user_id_is_generated_once() {
        let dir = TempDir::new().expect("temp dir");
        let store = LocalStore::new(dir.path());
        let first = store.user_id();
        let second = store.user_id();
        assert_eq!(first, second);
        assert_eq!(store.get_raw(USER_ID_KEY).unwrap().as_deref(), Some(first.as_str()));
    }
}
