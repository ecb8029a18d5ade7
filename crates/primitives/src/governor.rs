//! CapacityGovernor: keep the key count under a ceiling
//!
//! Invoked before a brand-new bookmark key is created (never before an
//! update, which does not grow the key count).
//!
//! ## Eviction policy
//!
//! ```text
//! 1. scan         - every bookmark key, oldest bucket first, ties by key
//! 2. below        - count < ceiling: nothing to do
//! 3. walk         - from the oldest key:
//!                     pinned   -> skip, never evicted
//!                     unpinned -> mark for eviction
//! 4. stop         - batch_size marked, or examine_factor * batch_size examined
//! 5. delete       - one remove call for all marked keys
//! ```
//!
//! The examined bound keeps the cost predictable when a long run of the
//! oldest collections is pinned: the walk gives up instead of scanning the
//! whole key space on every new key. Freeing nothing is reported as
//! `capacity_exhausted`, a warning rather than an error; the caller still
//! attempts its write.
//!
//! The bucket is used purely as a sort key here.
//!
//! ## Ambiguous keys
//!
//! A key whose ids contain `_` decodes to several `(profile, conversation)`
//! pairs. It is protected if any of them is pinned. A malformed pinned list
//! fails the pass only for the canonical split; for the others it counts as
//! not pinned, since their prefix may be any key in the namespace.

use crate::pinned::PinnedSetOracle;
use crate::scanner::{KeySpaceScanner, ScannedKey};
use pinmark_core::key;
use pinmark_core::{BackingStore, Error, Result, StorageKey};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default ratio of examined candidates to batch size
pub const DEFAULT_EXAMINE_FACTOR: usize = 10;

/// What one `ensure_capacity` call saw and did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Bookmark keys found by the scan
    pub total_keys: usize,
    /// Candidates inspected during the walk
    pub examined: usize,
    /// Keys deleted, oldest first
    pub evicted: Vec<StorageKey>,
    /// Keys skipped because their conversation is pinned
    pub protected: Vec<StorageKey>,
    /// Eviction was needed but nothing could be freed
    pub capacity_exhausted: bool,
}

impl EvictionReport {
    /// Number of keys freed
    pub fn freed(&self) -> usize {
        self.evicted.len()
    }

    /// Check if the call did nothing because the ceiling was not reached
    pub fn is_noop(&self) -> bool {
        self.examined == 0 && self.evicted.is_empty() && !self.capacity_exhausted
    }
}

/// Evicts the oldest unpinned collections
#[derive(Clone)]
pub struct CapacityGovernor {
    store: Arc<dyn BackingStore>,
    scanner: KeySpaceScanner,
    pinned: Arc<dyn PinnedSetOracle>,
    examine_factor: usize,
}

impl CapacityGovernor {
    /// Create a governor with the default examine factor
    pub fn new(store: Arc<dyn BackingStore>, pinned: Arc<dyn PinnedSetOracle>) -> Self {
        Self {
            scanner: KeySpaceScanner::new(store.clone()),
            store,
            pinned,
            examine_factor: DEFAULT_EXAMINE_FACTOR,
        }
    }

    /// Set how many candidates per batch slot may be examined
    pub fn with_examine_factor(mut self, factor: usize) -> Self {
        self.examine_factor = factor.max(1);
        self
    }

    /// Upper bound on candidates examined for a given batch size
    pub fn examine_limit(&self, batch_size: usize) -> usize {
        self.examine_factor.saturating_mul(batch_size)
    }

    /// Evict up to `batch_size` unpinned collections if the bookmark key
    /// count has reached `ceiling`
    ///
    /// Oracle and store failures propagate; when the oracle fails nothing
    /// is deleted.
    pub fn ensure_capacity(&self, ceiling: usize, batch_size: usize) -> Result<EvictionReport> {
        let candidates = self.scanner.bookmark_keys()?;
        let mut report = EvictionReport {
            total_keys: candidates.len(),
            ..EvictionReport::default()
        };
        if candidates.len() < ceiling || batch_size == 0 {
            return Ok(report);
        }

        let limit = self.examine_limit(batch_size);
        for candidate in candidates.iter().take(limit) {
            if report.evicted.len() >= batch_size {
                break;
            }
            report.examined += 1;
            if self.is_protected(candidate)? {
                debug!(key = %candidate.key, "Skipping pinned collection");
                report.protected.push(candidate.key.clone());
            } else {
                report.evicted.push(candidate.key.clone());
            }
        }

        if report.evicted.is_empty() {
            report.capacity_exhausted = true;
            warn!(
                total = report.total_keys,
                ceiling,
                examined = report.examined,
                "Capacity exhausted: every examined old collection is pinned"
            );
            return Ok(report);
        }

        let doomed: Vec<&str> = report.evicted.iter().map(|k| k.as_str()).collect();
        self.store.remove(&doomed)?;
        info!(
            total = report.total_keys,
            ceiling,
            evicted = report.evicted.len(),
            protected = report.protected.len(),
            "Evicted oldest bookmark collections"
        );
        Ok(report)
    }

    fn is_protected(&self, candidate: &ScannedKey) -> Result<bool> {
        if self
            .pinned
            .is_pinned(&candidate.parts.profile_id, &candidate.parts.conversation_id)?
        {
            return Ok(true);
        }
        for (profile_id, conversation_id) in key::candidate_splits(candidate.key.as_str()) {
            if profile_id == candidate.parts.profile_id {
                continue;
            }
            // An alternate prefix may name an unrelated key such as `settings`
            match self.pinned.is_pinned(&profile_id, &conversation_id) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(Error::Serialization(e)) => {
                    debug!(key = %candidate.key, profile_id = %profile_id, error = %e, "Alternate profile holds no pinned list");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }
}

impl std::fmt::Debug for CapacityGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapacityGovernor")
            .field("examine_factor", &self.examine_factor)
            .finish_non_exhaustive()
    }
}
