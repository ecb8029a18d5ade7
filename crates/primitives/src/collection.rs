//! BookmarkCollectionStore: CRUD over one date-bucketed collection
//!
//! ## Design: STATELESS FACADE
//!
//! Holds only shared handles (store, clock) and a quota guard. Every
//! mutation is a read-modify-write of the whole collection under one key;
//! two tabs racing on the same key are last-write-wins.
//!
//! ## Outcomes instead of errors
//!
//! Quota rejections and missing records are recovered here and reported
//! through [`AddOutcome`], [`RemoveOutcome`] and [`RenameOutcome`]. Only
//! backing-store and serialization failures come back as `Err`. Callers
//! that prefer `?` can use each outcome's `into_result`.
//!
//! ## Invariants
//!
//! - Insertion order is preserved
//! - `articleId` is unique within a collection (`add` is idempotent)
//! - An empty collection is never stored; its key is deleted instead

use crate::quota::{Admission, QuotaExceeded, QuotaGuard};
use crate::scanner::KeySpaceScanner;
use pinmark_core::{item_size, BackingStore, BookmarkRecord, Clock, Error, Result, StorageKey};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of [`BookmarkCollectionStore::add`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Record appended
    Added,
    /// A record with this `articleId` already exists; nothing written
    AlreadyPresent,
    /// The collection would exceed the per-item quota; nothing written
    Rejected(QuotaExceeded),
}

impl AddOutcome {
    /// Map a quota rejection to [`Error::StorageQuotaExceeded`]
    pub fn into_result(self) -> Result<()> {
        match self {
            AddOutcome::Added | AddOutcome::AlreadyPresent => Ok(()),
            AddOutcome::Rejected(q) => Err(q.into()),
        }
    }
}

/// Result of [`BookmarkCollectionStore::remove`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Record removed, collection still has records
    Removed,
    /// Last record removed, key deleted
    CollectionDeleted,
    /// No such record; nothing written
    NotFound {
        /// Collection key
        key: String,
        /// Requested article id
        article_id: String,
    },
}

impl RemoveOutcome {
    /// Map a missing record to [`Error::RecordNotFound`]
    pub fn into_result(self) -> Result<()> {
        match self {
            RemoveOutcome::Removed | RemoveOutcome::CollectionDeleted => Ok(()),
            RemoveOutcome::NotFound { key, article_id } => {
                Err(Error::RecordNotFound { key, article_id })
            }
        }
    }
}

/// Result of [`BookmarkCollectionStore::rename`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// `customName` overwritten
    Renamed,
    /// No such record; nothing written
    NotFound {
        /// Collection key
        key: String,
        /// Requested article id
        article_id: String,
    },
    /// The longer name would exceed the per-item quota; nothing written
    Rejected(QuotaExceeded),
}

impl RenameOutcome {
    /// Map rejections and missing records to errors
    pub fn into_result(self) -> Result<()> {
        match self {
            RenameOutcome::Renamed => Ok(()),
            RenameOutcome::NotFound { key, article_id } => {
                Err(Error::RecordNotFound { key, article_id })
            }
            RenameOutcome::Rejected(q) => Err(q.into()),
        }
    }
}

/// Decode a stored collection value
pub fn decode_collection(key: &str, value: Value) -> Result<Vec<BookmarkRecord>> {
    serde_json::from_value(value)
        .map_err(|e| Error::Serialization(format!("collection {key}: {e}")))
}

/// CRUD over bookmark collections
#[derive(Clone)]
pub struct BookmarkCollectionStore {
    store: Arc<dyn BackingStore>,
    scanner: KeySpaceScanner,
    quota: QuotaGuard,
    clock: Arc<dyn Clock>,
}

impl BookmarkCollectionStore {
    /// Create a collection store
    ///
    /// `clock` stamps new records; `quota` bounds each collection's size.
    pub fn new(store: Arc<dyn BackingStore>, quota: QuotaGuard, clock: Arc<dyn Clock>) -> Self {
        Self {
            scanner: KeySpaceScanner::new(store.clone()),
            store,
            quota,
            clock,
        }
    }

    /// The quota guard in use
    pub fn quota(&self) -> QuotaGuard {
        self.quota
    }

    /// Check whether a collection is stored under `key`
    pub fn exists(&self, key: &StorageKey) -> Result<bool> {
        Ok(self.store.get_one(key.as_str())?.is_some())
    }

    /// Read a collection; `None` if the key is absent
    pub fn read(&self, key: &StorageKey) -> Result<Option<Vec<BookmarkRecord>>> {
        self.store
            .get_one(key.as_str())?
            .map(|v| decode_collection(key.as_str(), v))
            .transpose()
    }

    /// Records and current item size (`None` when the key is absent)
    fn load(&self, key: &StorageKey) -> Result<(Vec<BookmarkRecord>, Option<usize>)> {
        match self.store.get_one(key.as_str())? {
            None => Ok((Vec::new(), None)),
            Some(value) => {
                let size = item_size(key.as_str(), &value);
                Ok((decode_collection(key.as_str(), value)?, Some(size)))
            }
        }
    }

    /// Append a bookmark, stamped with the clock's current time
    ///
    /// No-op if `article_id` is already present, so retries after an
    /// interleaved write never duplicate a record.
    pub fn add(
        &self,
        key: &StorageKey,
        article_id: &str,
        custom_name: Option<&str>,
    ) -> Result<AddOutcome> {
        self.add_with(key, article_id, custom_name, || Ok(()))
    }

    /// Like [`add`](Self::add), running `before_create` when the write
    /// would create `key`
    ///
    /// The hook runs only after the quota admitted the write, so a rejected
    /// or duplicate add never triggers it. If it fails nothing is written.
    pub fn add_with(
        &self,
        key: &StorageKey,
        article_id: &str,
        custom_name: Option<&str>,
        before_create: impl FnOnce() -> Result<()>,
    ) -> Result<AddOutcome> {
        let (mut records, existing) = self.load(key)?;
        if records.iter().any(|r| r.article_id == article_id) {
            debug!(key = %key, article_id, "Bookmark already present");
            return Ok(AddOutcome::AlreadyPresent);
        }

        records.push(BookmarkRecord::new(
            article_id,
            custom_name.map(str::to_string),
            self.clock.now_millis(),
        ));
        let value = serde_json::to_value(&records)?;
        if let Admission::Reject(q) = self.quota.admit_resize(
            key.as_str(),
            existing.unwrap_or(0),
            item_size(key.as_str(), &value),
        ) {
            warn!(key = %key, article_id, size = q.attempted_size(), quota = q.quota, "Bookmark rejected: per-item quota exceeded");
            return Ok(AddOutcome::Rejected(q));
        }

        if existing.is_none() {
            before_create()?;
        }
        self.store.set_one(key.as_str(), value)?;
        debug!(key = %key, article_id, count = records.len(), "Bookmark added");
        Ok(AddOutcome::Added)
    }

    /// Remove a bookmark
    ///
    /// Removing the last record deletes the key rather than storing `[]`.
    pub fn remove(&self, key: &StorageKey, article_id: &str) -> Result<RemoveOutcome> {
        let (mut records, _) = self.load(key)?;
        let before = records.len();
        records.retain(|r| r.article_id != article_id);
        if records.len() == before {
            debug!(key = %key, article_id, "Bookmark to remove not found");
            return Ok(RemoveOutcome::NotFound {
                key: key.to_string(),
                article_id: article_id.to_string(),
            });
        }

        if records.is_empty() {
            self.store.remove(&[key.as_str()])?;
            debug!(key = %key, article_id, "Last bookmark removed, collection deleted");
            return Ok(RemoveOutcome::CollectionDeleted);
        }

        self.store
            .set_one(key.as_str(), serde_json::to_value(&records)?)?;
        debug!(key = %key, article_id, count = records.len(), "Bookmark removed");
        Ok(RemoveOutcome::Removed)
    }

    /// Overwrite a bookmark's `customName`
    pub fn rename(&self, key: &StorageKey, article_id: &str, new_name: &str) -> Result<RenameOutcome> {
        let (mut records, existing) = self.load(key)?;
        let Some(record) = records.iter_mut().find(|r| r.article_id == article_id) else {
            warn!(key = %key, article_id, "Bookmark to rename not found");
            return Ok(RenameOutcome::NotFound {
                key: key.to_string(),
                article_id: article_id.to_string(),
            });
        };
        record.custom_name = Some(new_name.to_string());

        let value = serde_json::to_value(&records)?;
        if let Admission::Reject(q) = self.quota.admit_resize(
            key.as_str(),
            existing.unwrap_or(0),
            item_size(key.as_str(), &value),
        ) {
            warn!(key = %key, article_id, size = q.attempted_size(), quota = q.quota, "Rename rejected: per-item quota exceeded");
            return Ok(RenameOutcome::Rejected(q));
        }

        self.store.set_one(key.as_str(), value)?;
        debug!(key = %key, article_id, "Bookmark renamed");
        Ok(RenameOutcome::Renamed)
    }

    /// All records under `key`, in insertion order; empty if absent
    pub fn list(&self, key: &StorageKey) -> Result<Vec<BookmarkRecord>> {
        Ok(self.read(key)?.unwrap_or_default())
    }

    /// Article ids across every bucket of one conversation
    ///
    /// Scans for all `bm_{profile}_{conversation}_lastAccess_*` keys, not
    /// just the current one, and concatenates their records oldest bucket
    /// first. Duplicates across buckets are kept.
    pub fn list_ids(&self, profile_id: &str, conversation_id: &str) -> Result<Vec<String>> {
        let keys = self.scanner.conversation_keys(profile_id, conversation_id)?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<&str> = keys.iter().map(|(k, _)| k.as_str()).collect();
        let mut values = self.store.get(&raw)?;

        let mut ids = Vec::new();
        for (key, _) in &keys {
            if let Some(value) = values.remove(key.as_str()) {
                ids.extend(
                    decode_collection(key.as_str(), value)?
                        .into_iter()
                        .map(|r| r.article_id),
                );
            }
        }
        Ok(ids)
    }
}

impl std::fmt::Debug for BookmarkCollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookmarkCollectionStore")
            .field("quota", &self.quota)
            .finish_non_exhaustive()
    }
}
