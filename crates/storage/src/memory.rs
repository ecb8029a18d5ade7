//! In-memory backing store
//!
//! Emulates the synced-storage platform: one flat namespace of JSON values,
//! quota checks on every write, and no coordination between callers beyond
//! per-call atomicity. Tests can inject failures to exercise the
//! fail-closed paths of rotation and eviction.
//!
//! # Example
//!
//! ```
//! use pinmark_core::BackingStore;
//! use pinmark_storage::MemoryStore;
//! use serde_json::json;
//!
//! let store = MemoryStore::unbounded();
//! store.set_one("bm_p1_c1_lastAccess_20250101", json!([])).unwrap();
//! assert!(store.contains("bm_p1_c1_lastAccess_20250101"));
//!
//! store.fail_next_sets(1);
//! assert!(store.set_one("other", json!(1)).is_err());
//! assert!(!store.contains("other"));
//! ```

use crate::limits::StoreLimits;
use parking_lot::{Mutex, RwLock};
use pinmark_core::{item_size, BackingStore, Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Faults {
    fail_sets: usize,
    fail_removes: usize,
    fail_gets: usize,
    poisoned_prefixes: Vec<String>,
}

/// Platform-emulating store held entirely in memory
///
/// # Thread Safety
///
/// Each call takes the namespace lock once, so calls are atomic but a
/// get-then-set sequence from two threads can interleave exactly like two
/// browser tabs do.
#[derive(Debug)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Value>>,
    limits: StoreLimits,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    /// Create a store with the given limits
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            limits,
            faults: Mutex::new(Faults::default()),
        }
    }

    /// Create a store with the platform's default limits
    pub fn sync_platform() -> Self {
        Self::new(StoreLimits::sync_platform())
    }

    /// Create a store with no limits
    pub fn unbounded() -> Self {
        Self::new(StoreLimits::unbounded())
    }

    /// Limits this store enforces
    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if the namespace is empty
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Total bytes used, measured the way quotas are
    pub fn bytes_in_use(&self) -> usize {
        self.data
            .read()
            .iter()
            .map(|(k, v)| item_size(k, v))
            .sum()
    }

    /// Copy of the whole namespace
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.data.read().clone()
    }

    // ========================================================================
    // Fault injection
    // ========================================================================

    /// Make the next `n` calls to `set` fail without writing
    pub fn fail_next_sets(&self, n: usize) {
        self.faults.lock().fail_sets = n;
    }

    /// Make the next `n` calls to `remove` fail without deleting
    pub fn fail_next_removes(&self, n: usize) {
        self.faults.lock().fail_removes = n;
    }

    /// Make the next `n` reads (`get`/`get_all`) fail
    pub fn fail_next_gets(&self, n: usize) {
        self.faults.lock().fail_gets = n;
    }

    /// Make every `set` touching a key with this prefix fail
    pub fn fail_sets_for_prefix(&self, prefix: impl Into<String>) {
        self.faults.lock().poisoned_prefixes.push(prefix.into());
    }

    /// Clear all injected faults
    pub fn clear_faults(&self) {
        *self.faults.lock() = Faults::default();
    }

    fn take_fault(counter: &mut usize, op: &str) -> Result<()> {
        if *counter > 0 {
            *counter -= 1;
            return Err(Error::unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::sync_platform()
    }
}

impl BackingStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<BTreeMap<String, Value>> {
        Self::take_fault(&mut self.faults.lock().fail_gets, "get")?;
        let data = self.data.read();
        Ok(keys
            .iter()
            .filter_map(|k| data.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    fn get_all(&self) -> Result<BTreeMap<String, Value>> {
        Self::take_fault(&mut self.faults.lock().fail_gets, "get")?;
        Ok(self.data.read().clone())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Self::take_fault(&mut self.faults.lock().fail_gets, "get")?;
        Ok(self.data.read().keys().cloned().collect())
    }

    fn set(&self, items: BTreeMap<String, Value>) -> Result<()> {
        {
            let mut faults = self.faults.lock();
            Self::take_fault(&mut faults.fail_sets, "set")?;
            if let Some(key) = items
                .keys()
                .find(|k| faults.poisoned_prefixes.iter().any(|p| k.starts_with(p.as_str())))
            {
                return Err(Error::unavailable(format!("injected set failure for {key}")));
            }
        }

        let mut data = self.data.write();
        self.limits.check_batch(&data, &items)?;
        data.extend(items);
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<()> {
        Self::take_fault(&mut self.faults.lock().fail_removes, "remove")?;
        let mut data = self.data.write();
        for key in keys {
            data.remove(*key);
        }
        Ok(())
    }
}
