//! Platform quotas
//!
//! | Limit | Default | Meaning |
//! |-------|---------|---------|
//! | max_items | 512 | Total keys in the namespace |
//! | quota_bytes_per_item | 8192 | key + JSON value bytes for one item |
//! | quota_bytes | 102400 | key + JSON value bytes for all items |

use pinmark_core::{item_size, Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Quotas enforced on every `set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Maximum number of keys
    pub max_items: usize,
    /// Maximum bytes of a single item
    pub quota_bytes_per_item: usize,
    /// Maximum bytes across all items
    pub quota_bytes: usize,
}

impl StoreLimits {
    /// The synced-storage platform's published limits
    pub const fn sync_platform() -> Self {
        Self {
            max_items: 512,
            quota_bytes_per_item: 8192,
            quota_bytes: 102_400,
        }
    }

    /// No limits at all
    pub const fn unbounded() -> Self {
        Self {
            max_items: usize::MAX,
            quota_bytes_per_item: usize::MAX,
            quota_bytes: usize::MAX,
        }
    }

    /// Check that applying `items` on top of `current` stays within limits
    ///
    /// Nothing is mutated; callers apply the batch only after this passes.
    pub fn check_batch(
        &self,
        current: &BTreeMap<String, Value>,
        items: &BTreeMap<String, Value>,
    ) -> Result<()> {
        for (key, value) in items {
            let size = item_size(key, value);
            if size > self.quota_bytes_per_item {
                return Err(Error::unavailable(format!(
                    "QUOTA_BYTES_PER_ITEM exceeded for {key}: {size} > {}",
                    self.quota_bytes_per_item
                )));
            }
        }

        let added = items.keys().filter(|k| !current.contains_key(*k)).count();
        let count = current.len() + added;
        if count > self.max_items {
            return Err(Error::unavailable(format!(
                "MAX_ITEMS exceeded: {count} > {}",
                self.max_items
            )));
        }

        if self.quota_bytes != usize::MAX {
            let total: usize = current
                .iter()
                .filter(|(k, _)| !items.contains_key(*k))
                .chain(items.iter())
                .map(|(k, v)| item_size(k, v))
                .sum();
            if total > self.quota_bytes {
                return Err(Error::unavailable(format!(
                    "QUOTA_BYTES exceeded: {total} > {}",
                    self.quota_bytes
                )));
            }
        }
        Ok(())
    }
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self::sync_platform()
    }
}
