//! Key space scanning
//!
//! Both the per-conversation aggregation in the collection store and the
//! capacity governor's full scan go through [`KeySpaceScanner`], so their
//! cost is the same single key enumeration and both can be tested against
//! the same store.

use pinmark_core::key::{self, KeyParts};
use pinmark_core::{BackingStore, DateBucket, Result, StorageKey};
use std::sync::Arc;

/// A bookmark key found by a scan, with its decoded parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedKey {
    /// The key
    pub key: StorageKey,
    /// Canonical decoding of the key
    pub parts: KeyParts,
}

/// Enumerates bookmark keys in the shared namespace
///
/// Keys that do not decode are skipped silently; the namespace also holds
/// pinned lists and other collaborators' data.
#[derive(Clone)]
pub struct KeySpaceScanner {
    store: Arc<dyn BackingStore>,
}

impl KeySpaceScanner {
    /// Create a scanner over `store`
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self { store }
    }

    /// Every bookmark key, oldest bucket first
    ///
    /// Ties on the bucket are broken by key string so the order is
    /// deterministic.
    pub fn bookmark_keys(&self) -> Result<Vec<ScannedKey>> {
        let mut scanned: Vec<ScannedKey> = self
            .store
            .keys()?
            .iter()
            .filter_map(|raw| {
                key::decode(raw).map(|parts| ScannedKey {
                    key: parts.key(),
                    parts,
                })
            })
            .collect();
        scanned.sort_by(|a, b| {
            a.parts
                .bucket
                .cmp(&b.parts.bucket)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(scanned)
    }

    /// Number of bookmark keys in the namespace
    pub fn count(&self) -> Result<usize> {
        Ok(self
            .store
            .keys()?
            .iter()
            .filter(|raw| key::is_bookmark_key(raw))
            .count())
    }

    /// Every key belonging to one conversation, oldest bucket first
    ///
    /// Matches on the exact `bm_{profile}_{conversation}_lastAccess_`
    /// prefix, so ids containing `_` are handled correctly.
    pub fn conversation_keys(
        &self,
        profile_id: &str,
        conversation_id: &str,
    ) -> Result<Vec<(StorageKey, DateBucket)>> {
        let mut found: Vec<(StorageKey, DateBucket)> = self
            .store
            .keys()?
            .iter()
            .filter_map(|raw| {
                key::matches_conversation(raw, profile_id, conversation_id)
                    .map(|bucket| (key::key_for(profile_id, conversation_id, &bucket), bucket))
            })
            .collect();
        found.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(found)
    }
}

impl std::fmt::Debug for KeySpaceScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySpaceScanner").finish_non_exhaustive()
    }
}
