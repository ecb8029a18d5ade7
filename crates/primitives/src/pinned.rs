//! Pinned-conversation lookup
//!
//! The pinning subsystem owns one key per profile, named by the bare
//! profile id, holding `[{urlId, title}, ...]`. This module only reads it.
//!
//! Protection is a live property: the list is read at the moment of the
//! question, so a conversation unpinned after its bookmarks were created
//! loses protection immediately.

use pinmark_core::{BackingStore, Error, PinnedConversation, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Answers "is conversation X pinned for profile P?"
pub trait PinnedSetOracle: Send + Sync {
    /// Check whether `conversation_id` is pinned for `profile_id`
    fn is_pinned(&self, profile_id: &str, conversation_id: &str) -> Result<bool>;
}

/// Oracle backed by the pinned lists in the shared store
#[derive(Clone)]
pub struct StoragePinnedSet {
    store: Arc<dyn BackingStore>,
}

impl StoragePinnedSet {
    /// Create an oracle reading from `store`
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self { store }
    }

    /// The pinned list of a profile; empty if the profile has none
    pub fn pinned_for(&self, profile_id: &str) -> Result<Vec<PinnedConversation>> {
        match self.store.get_one(profile_id)? {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                Error::Serialization(format!("pinned list for {profile_id}: {e}"))
            }),
        }
    }
}

impl PinnedSetOracle for StoragePinnedSet {
    fn is_pinned(&self, profile_id: &str, conversation_id: &str) -> Result<bool> {
        Ok(self
            .pinned_for(profile_id)?
            .iter()
            .any(|p| p.url_id == conversation_id))
    }
}

impl std::fmt::Debug for StoragePinnedSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoragePinnedSet").finish_non_exhaustive()
    }
}

/// Fixed set of `(profile, conversation)` pairs
impl PinnedSetOracle for HashSet<(String, String)> {
    fn is_pinned(&self, profile_id: &str, conversation_id: &str) -> Result<bool> {
        Ok(self.contains(&(profile_id.to_string(), conversation_id.to_string())))
    }
}
