//! Durable key-value slots backing the history store.
//!
//! Each key maps to one text value. [`FileStore`] keeps one JSON file per
//! key with atomic replacement and file locking; [`MemoryStore`] keeps
//! values in a map for tests and embedding.

use crate::{Error, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// A namespace of named text slots
pub trait KeyValueStore {
    /// Read a slot; `None` when it has never been written or was removed
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace a slot's value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a slot; deleting a missing slot is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Read-modify-write a slot
    ///
    /// The default runs `get` then `set` with nothing held in between, so
    /// two racing callers can lose an update. Backends override this when
    /// they can hold a lock across both steps.
    fn update<F>(&self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<String>) -> Result<String>,
    {
        let current = self.get(key)?;
        let next = f(current)?;
        self.set(key, &next)
    }
}

// ============================================================================
// File Backend
// ============================================================================

/// Stores each slot as `<dir>/<key>.json`
///
/// Writes go to a temp file in the same directory which is synced and
/// renamed over the slot, so readers see either the old or new value
/// without taking a lock. `update` holds an exclusive lock on `<dir>/<key>.lock` for the whole
/// read-modify-write, serializing writers across processes.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn lock_path(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{}.lock", key)))
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Take the exclusive writer lock for `key`, released when the file drops
    fn lock_writer(&self, key: &str) -> Result<File> {
        self.ensure_dir()?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(key)?)?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn write_atomic(&self, path: &Path, value: &str) -> Result<()> {
        self.ensure_dir()?;

        // Temp file must live in the same directory for the rename to be atomic
        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

fn check_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(Error::Storage(format!("invalid storage key '{}'", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // Writers replace the slot by rename, so an open handle always
        // sees one complete value
        let mut contents = String::new();
        std::io::BufReader::new(&file).read_to_string(&mut contents)?;

        tracing::debug!("Read {} bytes from {:?}", contents.len(), path);
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        let lock = self.lock_writer(key)?;
        self.write_atomic(&path, value)?;
        lock.unlock()?;

        tracing::debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        if !self.dir.exists() {
            return Ok(());
        }

        let lock = self.lock_writer(key)?;
        let outcome = match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        };
        lock.unlock()?;

        tracing::debug!("Removed slot {:?}", path);
        outcome
    }

    fn update<F>(&self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<String>) -> Result<String>,
    {
        let path = self.slot_path(key)?;
        let lock = self.lock_writer(key)?;

        let current = self.get(key)?;
        let next = f(current)?;
        self.write_atomic(&path, &next)?;

        lock.unlock()?;
        tracing::debug!("Updated slot {:?}", path);
        Ok(())
    }
}

// ============================================================================
// Memory Backend
// ============================================================================

/// In-process slots guarded by a mutex
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots()?.remove(key);
        Ok(())
    }

    fn update<F>(&self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<String>) -> Result<String>,
    {
        let mut slots = self.slots()?;
        let next = f(slots.get(key).cloned())?;
        slots.insert(key.to_string(), next);
        Ok(())
    }
}
