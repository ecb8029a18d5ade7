//! BucketRotator: keep a conversation's collection on today's bucket
//!
//! ## Rotation sequence
//!
//! ```text
//! 1. scan       - find every key of (profile, conversation)
//! 2. none       - return today's key; created lazily on first write
//! 3. current    - single key already on today's bucket: return it
//! 4. read       - fetch all found keys in one get
//! 5. write      - store the (merged) collection under today's key
//! 6. delete     - remove every other key
//! ```
//!
//! If step 5 fails the old keys are untouched (stale but present beats
//! lost). If step 6 fails the error is returned with today's key already
//! written; the next rotation consolidates the leftovers.
//!
//! Runs once per conversation per page activation, not per mutation.

use crate::collection::decode_collection;
use crate::scanner::KeySpaceScanner;
use pinmark_core::key;
use pinmark_core::{current_date_bucket, BackingStore, Clock, DateBucket, Result, StorageKey};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Moves collections from stale buckets onto today's bucket
#[derive(Clone)]
pub struct BucketRotator {
    store: Arc<dyn BackingStore>,
    scanner: KeySpaceScanner,
    clock: Arc<dyn Clock>,
}

impl BucketRotator {
    /// Create a rotator; `clock` decides what "today" is
    pub fn new(store: Arc<dyn BackingStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scanner: KeySpaceScanner::new(store.clone()),
            store,
            clock,
        }
    }

    /// Make sure the conversation's collection lives under today's key
    ///
    /// Returns today's key in every successful case. After success at most
    /// one key exists for the pair.
    pub fn ensure_current_bucket(
        &self,
        profile_id: &str,
        conversation_id: &str,
    ) -> Result<StorageKey> {
        let today = current_date_bucket(self.clock.as_ref());
        let target = key::key_for(profile_id, conversation_id, &today);
        let found = self.scanner.conversation_keys(profile_id, conversation_id)?;

        if found.is_empty() {
            debug!(key = %target, "No collection yet");
            return Ok(target);
        }
        if found.len() == 1 && found[0].1 == today {
            return Ok(target);
        }

        let raw: Vec<&str> = found.iter().map(|(k, _)| k.as_str()).collect();
        let mut values = self.store.get(&raw)?;
        let stale: Vec<&str> = raw.iter().copied().filter(|k| *k != target.as_str()).collect();

        let merged = if found.len() == 1 {
            // Single stale key: carry the stored value over verbatim
            values
                .remove(raw[0])
                .filter(|v| !v.as_array().is_some_and(|a| a.is_empty()))
        } else {
            Self::merge(&found, &mut values)?
        };

        match merged {
            Some(value) => {
                self.store.set_one(target.as_str(), value)?;
            }
            None => {
                // Sources were empty or vanished under a concurrent rotation.
                // Only a target we read ourselves may be dropped.
                debug!(key = %target, "Nothing to carry over");
                if raw.contains(&target.as_str()) {
                    self.store.remove(&[target.as_str()])?;
                }
            }
        }

        if let Err(e) = self.store.remove(&stale) {
            error!(
                key = %target,
                stale = ?stale,
                error = %e,
                "Rotated collection written but old keys not deleted"
            );
            return Err(e);
        }

        info!(key = %target, from = ?stale, "Rotated bookmark collection");
        Ok(target)
    }

    /// Concatenate collections oldest bucket first, first `articleId` wins
    ///
    /// `None` when the result would be empty.
    fn merge(
        found: &[(StorageKey, DateBucket)],
        values: &mut BTreeMap<String, Value>,
    ) -> Result<Option<Value>> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for (key, _) in found {
            let Some(value) = values.remove(key.as_str()) else {
                continue;
            };
            for record in decode_collection(key.as_str(), value)? {
                if seen.insert(record.article_id.clone()) {
                    merged.push(record);
                }
            }
        }
        if merged.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_value(merged)?))
    }
}

impl std::fmt::Debug for BucketRotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketRotator").finish_non_exhaustive()
    }
}
