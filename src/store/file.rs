use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StoreError, StoreResult};
use crate::config::PREFERENCES_FILE;

/// Flat JSON object on disk, re-read on every access so a second process
/// (or a `reload`) sees the latest writes.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StoreResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let serialized = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&serialized).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Entries to update in place; a corrupt file is replaced, not merged.
    fn entries_for_update(&self) -> StoreResult<BTreeMap<String, String>> {
        match self.read_entries() {
            Err(StoreError::Corrupt { path, source }) => {
                tracing::warn!(path = %path.display(), %source, "replacing corrupt preferences file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let serialized =
            serde_json::to_string_pretty(entries).map_err(|source| StoreError::Serialize {
                key: PREFERENCES_FILE,
                source,
            })?;
        fs::write(&self.path, serialized).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries_for_update()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
