//! Backing store contract
//!
//! The synced key-value store is shared by every open tab and offers no
//! locks, transactions or version tokens. [`BackingStore`] keeps that
//! contract narrow (get/set/remove over opaque keys) so a serialized store
//! can be dropped in later without touching the components above it.
//!
//! ## Consistency
//!
//! - Each call is atomic on its own; nothing spans two calls
//! - A read-modify-write built from separate calls is last-write-wins
//! - Failures surface as [`crate::Error::BackingStoreUnavailable`]

use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;

/// Key-value store holding JSON values under string keys
pub trait BackingStore: Send + Sync {
    /// Fetch the given keys
    ///
    /// Keys that are absent are omitted from the result.
    fn get(&self, keys: &[&str]) -> Result<BTreeMap<String, Value>>;

    /// Fetch every key in the namespace
    fn get_all(&self) -> Result<BTreeMap<String, Value>>;

    /// Enumerate every key in the namespace
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.get_all()?.into_keys().collect())
    }

    /// Write a batch of items
    ///
    /// All-or-nothing: if any item is rejected, nothing is written.
    fn set(&self, items: BTreeMap<String, Value>) -> Result<()>;

    /// Delete keys; absent keys are ignored
    fn remove(&self, keys: &[&str]) -> Result<()>;

    /// Fetch a single key
    fn get_one(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get(&[key])?.remove(key))
    }

    /// Write a single item
    fn set_one(&self, key: &str, value: Value) -> Result<()> {
        let mut items = BTreeMap::new();
        items.insert(key.to_string(), value);
        self.set(items)
    }
}

/// Bytes an item occupies against the per-item quota
///
/// Key length plus the length of the value's JSON serialization, which is
/// how the synced storage platform measures items.
pub fn item_size(key: &str, value: &Value) -> usize {
    key.len() + value.to_string().len()
}
