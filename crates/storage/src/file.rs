//! File-persisted backing store
//!
//! The whole namespace lives in one JSON object on disk. Every successful
//! `set`/`remove` writes a sibling temp file, syncs it to disk and renames
//! it over the original, so a crash mid-write leaves the previous version
//! intact.
//!
//! The in-memory copy only changes after the file write succeeds; a failed
//! write leaves both disk and memory at the previous state.

use crate::limits::StoreLimits;
use parking_lot::RwLock;
use pinmark_core::{BackingStore, Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backing store persisted to a single JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: RwLock<BTreeMap<String, Value>>,
    limits: StoreLimits,
}

impl FileStore {
    /// Open the store at `path`, loading it if the file exists
    ///
    /// A missing file is an empty namespace. A file that is not a JSON
    /// object is rejected rather than overwritten.
    pub fn open(path: impl AsRef<Path>, limits: StoreLimits) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = data.len(), "Opened file store");
        Ok(Self {
            path,
            data: RwLock::new(data),
            limits,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if the namespace is empty
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn persist(&self, data: &BTreeMap<String, Value>) -> Result<()> {
        let bytes = serde_json::to_vec(data)?;
        write_replace(&self.path, &bytes)
            .map_err(|e| Error::unavailable(format!("{}: {e}", self.path.display())))
    }
}

/// Write `bytes` to a sibling temp file, sync it, then rename over `path`
fn write_replace(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}

impl BackingStore for FileStore {
    fn get(&self, keys: &[&str]) -> Result<BTreeMap<String, Value>> {
        let data = self.data.read();
        Ok(keys
            .iter()
            .filter_map(|k| data.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    fn get_all(&self) -> Result<BTreeMap<String, Value>> {
        Ok(self.data.read().clone())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.data.read().keys().cloned().collect())
    }

    fn set(&self, items: BTreeMap<String, Value>) -> Result<()> {
        let mut data = self.data.write();
        self.limits.check_batch(&data, &items)?;
        let mut next = data.clone();
        next.extend(items);
        self.persist(&next)?;
        *data = next;
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut data = self.data.write();
        if !keys.iter().any(|k| data.contains_key(*k)) {
            return Ok(());
        }
        let mut next = data.clone();
        for key in keys {
            next.remove(*key);
        }
        self.persist(&next)?;
        *data = next;
        Ok(())
    }
}
