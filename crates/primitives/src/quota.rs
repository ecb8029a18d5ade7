//! Per-item quota admission
//!
//! Any write that can grow a collection (add, rename) is checked here
//! before it reaches the backing store. A rejected write is abandoned
//! whole; nothing is partially applied.

use pinmark_core::Error;

/// Message shown to the user when a bookmark cannot be saved
pub const QUOTA_USER_MESSAGE: &str = "Not enough storage capacity to save this bookmark.";

/// Details of a rejected write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaExceeded {
    /// Key the write targeted
    pub key: String,
    /// Current size of the item in bytes (0 if absent)
    pub existing: usize,
    /// Bytes the write would add
    pub candidate: usize,
    /// Per-item quota in bytes
    pub quota: usize,
}

impl QuotaExceeded {
    /// Size the item would have had
    pub fn attempted_size(&self) -> usize {
        self.existing.saturating_add(self.candidate)
    }

    /// User-facing explanation
    pub fn user_message(&self) -> &'static str {
        QUOTA_USER_MESSAGE
    }
}

impl From<QuotaExceeded> for Error {
    fn from(q: QuotaExceeded) -> Self {
        Error::StorageQuotaExceeded {
            size: q.attempted_size(),
            key: q.key,
            quota: q.quota,
        }
    }
}

/// Result of a quota check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Write fits
    Admit,
    /// Write would exceed the quota
    Reject(QuotaExceeded),
}

impl Admission {
    /// Check if the write was admitted
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admit)
    }
}

/// Decide whether a write of `candidate` bytes on top of `existing` bytes fits
///
/// Rejects exactly when `existing + candidate > per_item_quota`.
pub fn admit_write(
    key: &str,
    existing: usize,
    candidate: usize,
    per_item_quota: usize,
) -> Admission {
    if existing.saturating_add(candidate) > per_item_quota {
        Admission::Reject(QuotaExceeded {
            key: key.to_string(),
            existing,
            candidate,
            quota: per_item_quota,
        })
    } else {
        Admission::Admit
    }
}

/// Quota checker bound to one per-item limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaGuard {
    per_item_quota: usize,
}

impl QuotaGuard {
    /// Create a guard for the given per-item quota in bytes
    pub fn new(per_item_quota: usize) -> Self {
        Self { per_item_quota }
    }

    /// The per-item quota in bytes
    pub fn per_item_quota(&self) -> usize {
        self.per_item_quota
    }

    /// Check a write; see [`admit_write`]
    pub fn admit_write(&self, key: &str, existing: usize, candidate: usize) -> Admission {
        admit_write(key, existing, candidate, self.per_item_quota)
    }

    /// Check replacing an item of `old_size` bytes with one of `new_size` bytes
    ///
    /// Shrinking writes are always admitted.
    pub fn admit_resize(&self, key: &str, old_size: usize, new_size: usize) -> Admission {
        if new_size <= old_size {
            return Admission::Admit;
        }
        self.admit_write(key, old_size, new_size - old_size)
    }
}
