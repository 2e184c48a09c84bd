//! Durable key-value storage backing the collapse-state store.
//!
//! The store only needs string get/set/remove. [`FileStorage`] keeps every record in one JSON
//! object on disk, [`MemoryStorage`] keeps them for the life of the process.

use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the on-disk store inside the state directory.
pub const STATE_FILE_NAME: &str = "collapse-state.json";

/// String key-value storage with durable semantics.
pub trait Storage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete the value under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Default, Debug)]
/// Process-lifetime storage; also the fallback when nothing durable is available.
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[derive(Debug)]
/// All records in a single JSON object file, rewritten through a temp file on every change.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Open (without reading) the store at `dir/collapse-state.json`, creating `dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn in_dir(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(STATE_FILE_NAME),
        })
    }

    /// Open the store under the per-user data directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDataDir`] when the platform has no data directory, or an IO error if it
    /// cannot be created.
    pub fn in_data_dir() -> Result<Self> {
        let dir = dirs::data_dir().ok_or(Error::NoDataDir)?.join("foldmark");
        Self::in_dir(&dir)
    }

    #[must_use]
    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Records to rewrite. An unparseable file is moved aside and treated as empty, so one bad
    /// write never blocks every later one.
    fn read_for_update(&self) -> Result<BTreeMap<String, String>> {
        match self.read_all() {
            Err(Error::Json(e)) => {
                let backup = self.path.with_extension("json.corrupt");
                warn!(
                    "Discarding unreadable {} ({e}), moved to {}",
                    self.path.display(),
                    backup.display()
                );
                fs::rename(&self.path, &backup)?;
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_all(&self, records: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), records = records.len(), "wrote storage file");
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut records = self.read_for_update()?;
        records.insert(key.to_string(), value.to_string());
        self.write_all(&records)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut records = self.read_for_update()?;
        if records.remove(key).is_some() {
            self.write_all(&records)?;
        }
        Ok(())
    }
}

#[must_use]
/// Pick durable storage, falling back to memory when it is unavailable.
///
/// An empty `state_dir` means the per-user data directory.
pub fn open_storage(state_dir: &str) -> Box<dyn Storage> {
    let opened = if state_dir.is_empty() {
        FileStorage::in_data_dir()
    } else {
        FileStorage::in_dir(Path::new(state_dir))
    };

    match opened {
        Ok(storage) => {
            debug!(path = %storage.path().display(), "using file storage");
            Box::new(storage)
        }
        Err(e) => {
            warn!("Collapse state will not persist: {e}");
            Box::new(MemoryStorage::new())
        }
    }
}

#[cfg(test)]
#[path = "tests/storage.rs"]
mod tests;
