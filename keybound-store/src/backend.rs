//! Swappable storage media.
//!
//! The store only needs three operations on opaque byte records; any
//! durable medium satisfies the trait. `FileBackend` is the production
//! default; `MemoryBackend` backs tests and embedded use.

use crate::error::{StoreError, StoreResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A key/value persistence medium.
///
/// Keys are opaque strings produced by the store (hex digests plus a
/// reserved seal key). `delete` on a missing key succeeds.
pub trait StorageBackend: Send + Sync {
    /// Reads a record, `None` when absent.
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Writes a record; must be atomic at record granularity. A
    /// concurrent `read` sees the old bytes, the new bytes, or absence,
    /// never a torn record.
    fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<()>;

    /// Deletes a record; succeeds when the record is already absent.
    fn delete(&self, key: &str) -> StoreResult<()>;
}

/// In-memory backend.
///
/// Clones share the same map, which lets tests inspect and mutate records
/// underneath a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        self.records
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.records.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Filesystem backend: one file per record under a root directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so
/// readers never observe a partially-written record.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Opens (creating if needed) a backend rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The default per-user data directory for entitlement records.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("keybound").join("state"))
    }

    /// Returns the backend root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty()
            || key.contains(['/', '\\'])
            || key.contains("..")
            || key.starts_with('.')
        {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let tmp = self.root.join(format!("{key}.tmp"));
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
