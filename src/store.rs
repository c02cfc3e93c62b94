//! Small persistent key-value store for preferences and search history.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::history::HistoryEntry;
use crate::units::temperature::TemperatureUnit;

pub const HISTORY_KEY: &str = "weatherSearchHistory";
pub const UNIT_KEY: &str = "weatherTempUnit";

pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One file per key inside a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Storage for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path(key);
        let tmp = self.dir.join(format!("{key}.tmp"));
        fs::write(&tmp, value)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|source| StorageError::Io { path, source })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the two persisted values.
///
/// Loads never fail: a missing, unreadable or corrupt value means "nothing
/// saved". Writes report errors so callers can log them.
pub struct PreferenceStore {
    storage: Box<dyn Storage + Send>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

impl PreferenceStore {
    pub fn new(storage: impl Storage + Send + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    pub fn load_history(&self) -> Vec<HistoryEntry> {
        match self.try_load_history() {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("ignoring saved search history: {err}");
                Vec::new()
            }
        }
    }

    fn try_load_history(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let Some(raw) = self.storage.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: HISTORY_KEY.to_string(),
            source,
        })
    }

    pub fn save_history(&mut self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries).map_err(|source| StorageError::Corrupt {
            key: HISTORY_KEY.to_string(),
            source,
        })?;
        self.storage.set(HISTORY_KEY, &raw)
    }

    pub fn load_unit(&self) -> TemperatureUnit {
        match self.storage.get(UNIT_KEY) {
            Ok(Some(token)) => TemperatureUnit::from_token(&token).unwrap_or_else(|| {
                tracing::warn!(%token, "ignoring unknown temperature unit");
                TemperatureUnit::default()
            }),
            Ok(None) => TemperatureUnit::default(),
            Err(err) => {
                tracing::warn!("ignoring saved temperature unit: {err}");
                TemperatureUnit::default()
            }
        }
    }

    pub fn save_unit(&mut self, unit: TemperatureUnit) -> Result<(), StorageError> {
        self.storage.set(UNIT_KEY, unit.token())
    }

    #[cfg(test)]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.storage.get(key).ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(name: &str) -> HistoryEntry {
        HistoryEntry {
            name: name.to_string(),
            country: "France".to_string(),
            timestamp: Utc.timestamp_millis_opt(1_747_000_000_000).unwrap(),
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("missing").unwrap(), None);
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert!(!dir.path().join("k.tmp").exists());
    }

    #[test]
    fn test_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = PreferenceStore::new(FileStore::open(dir.path()).unwrap());
        prefs.save_history(&[entry("Paris"), entry("Lyon")]).unwrap();
        prefs.save_unit(TemperatureUnit::Fahrenheit).unwrap();

        let reopened = PreferenceStore::new(FileStore::open(dir.path()).unwrap());
        let names: Vec<_> = reopened.load_history().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["Paris", "Lyon"]);
        assert_eq!(reopened.load_unit(), TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_corrupt_values_fall_back_to_defaults() {
        let mut storage = MemoryStore::default();
        storage.set(HISTORY_KEY, "[{\"name\": ").unwrap();
        storage.set(UNIT_KEY, "kelvin").unwrap();
        let prefs = PreferenceStore::new(storage);

        assert!(prefs.load_history().is_empty());
        assert_eq!(prefs.load_unit(), TemperatureUnit::Celsius);
    }

    #[test]
    fn test_history_timestamp_is_epoch_millis() {
        let mut prefs = PreferenceStore::in_memory();
        prefs.save_history(&[entry("Paris")]).unwrap();
        let raw = prefs.raw(HISTORY_KEY).unwrap();
        assert!(raw.contains("\"timestamp\":1747000000000"), "{raw}");
    }
}
