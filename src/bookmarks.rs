//! Main entry point for pinmark.
//!
//! This module provides the `Bookmarks` struct, which wires the key codec,
//! rotation, eviction and collection CRUD together over one backing store.

use crate::config::GovernorConfig;
use crate::error::Result;
use pinmark_core::{BackingStore, BookmarkRecord, Clock, StorageKey, SystemClock};
use pinmark_primitives::{
    AddOutcome, BookmarkCollectionStore, BucketRotator, CapacityGovernor, EvictionReport,
    KeySpaceScanner, PinnedSetOracle, QuotaGuard, RemoveOutcome, RenameOutcome,
    StoragePinnedSet,
};
use pinmark_storage::MemoryStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Bookmark storage over a shared, quota-limited key-value store.
///
/// Create one with [`Bookmarks::builder`] or [`Bookmarks::in_memory`].
/// Cloning is cheap; clones share the same store.
///
/// # Example
///
/// ```ignore
/// use pinmark::prelude::*;
///
/// let bookmarks = Bookmarks::in_memory()?;
///
/// // Once per page activation: rotates the collection onto today's key
/// let chat = bookmarks.conversation("profile-1", "chat-42")?;
///
/// chat.add("msg-7", Some("Key insight"))?;
/// chat.rename("msg-7", "Key insight (revised)")?;
/// let ids = chat.ids()?;
/// ```
#[derive(Clone)]
pub struct Bookmarks {
    store: Arc<dyn BackingStore>,
    scanner: KeySpaceScanner,
    collections: BookmarkCollectionStore,
    rotator: BucketRotator,
    governor: CapacityGovernor,
    config: GovernorConfig,
}

impl Bookmarks {
    /// Create a builder.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let bookmarks = Bookmarks::builder()
    ///     .store(Arc::new(FileStore::open("bookmarks.json", StoreLimits::default())?))
    ///     .config(GovernorConfig::default().ceiling(400))
    ///     .build()?;
    /// ```
    pub fn builder() -> BookmarksBuilder {
        BookmarksBuilder::new()
    }

    /// Bookmarks over a fresh in-memory store with the platform's limits.
    ///
    /// Data is gone when the last clone is dropped.
    pub fn in_memory() -> Result<Self> {
        Self::builder().build()
    }

    /// Activate a conversation.
    ///
    /// Moves its collection onto today's bucket (once, here, rather than on
    /// every mutation) and returns a handle bound to the resolved key.
    pub fn conversation(
        &self,
        profile_id: &str,
        conversation_id: &str,
    ) -> Result<ConversationBookmarks> {
        let key = self.rotator.ensure_current_bucket(profile_id, conversation_id)?;
        debug!(key = %key, "Conversation activated");
        Ok(ConversationBookmarks {
            bookmarks: self.clone(),
            profile_id: profile_id.to_string(),
            conversation_id: conversation_id.to_string(),
            key,
        })
    }

    /// Run one eviction pass with the configured ceiling and batch size.
    pub fn ensure_capacity(&self) -> Result<EvictionReport> {
        Ok(self
            .governor
            .ensure_capacity(self.config.ceiling, self.config.batch_size)?)
    }

    /// Number of bookmark keys currently in the store.
    pub fn bookmark_key_count(&self) -> Result<usize> {
        Ok(self.scanner.count()?)
    }

    /// The active configuration.
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// The backing store shared by every component.
    pub fn store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }

    /// Direct access to collection CRUD by key.
    pub fn collections(&self) -> &BookmarkCollectionStore {
        &self.collections
    }

    fn make_room(&self, key: &StorageKey) -> pinmark_core::Result<()> {
        let report = self
            .governor
            .ensure_capacity(self.config.ceiling, self.config.batch_size)?;
        if report.capacity_exhausted {
            // Fail open: the user's bookmark is still attempted
            warn!(
                key = %key,
                total = report.total_keys,
                "Creating collection although no capacity could be freed"
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for Bookmarks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bookmarks")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Bookmarks of one conversation, bound to the key resolved at activation.
///
/// Activate again (see [`Bookmarks::conversation`]) on the next page load;
/// the handle does not follow a day change on its own.
#[derive(Clone)]
pub struct ConversationBookmarks {
    bookmarks: Bookmarks,
    profile_id: String,
    conversation_id: String,
    key: StorageKey,
}

impl ConversationBookmarks {
    /// Key the collection lives under.
    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    /// Profile this handle belongs to.
    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    /// Conversation this handle belongs to.
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Bookmark an article.
    ///
    /// Creating the collection's key runs an eviction pass first, once the
    /// quota has admitted the record. Adding an id that is already present
    /// is a no-op.
    pub fn add(&self, article_id: &str, custom_name: Option<&str>) -> Result<AddOutcome> {
        let bookmarks = &self.bookmarks;
        Ok(bookmarks
            .collections
            .add_with(&self.key, article_id, custom_name, || {
                bookmarks.make_room(&self.key)
            })?)
    }

    /// Remove a bookmark; the key is deleted with the last one.
    pub fn remove(&self, article_id: &str) -> Result<RemoveOutcome> {
        Ok(self.bookmarks.collections.remove(&self.key, article_id)?)
    }

    /// Set a bookmark's custom name.
    pub fn rename(&self, article_id: &str, new_name: &str) -> Result<RenameOutcome> {
        Ok(self
            .bookmarks
            .collections
            .rename(&self.key, article_id, new_name)?)
    }

    /// Records under the current key, in insertion order.
    pub fn list(&self) -> Result<Vec<BookmarkRecord>> {
        Ok(self.bookmarks.collections.list(&self.key)?)
    }

    /// Article ids across every bucket of this conversation.
    pub fn ids(&self) -> Result<Vec<String>> {
        Ok(self
            .bookmarks
            .collections
            .list_ids(&self.profile_id, &self.conversation_id)?)
    }
}

impl std::fmt::Debug for ConversationBookmarks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationBookmarks")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Bookmarks`].
///
/// Unset parts default to:
/// - store: [`MemoryStore::sync_platform`]
/// - pinned: [`StoragePinnedSet`] over the same store
/// - clock: [`SystemClock`]
/// - config: [`GovernorConfig::default`]
#[derive(Default)]
pub struct BookmarksBuilder {
    store: Option<Arc<dyn BackingStore>>,
    pinned: Option<Arc<dyn PinnedSetOracle>>,
    clock: Option<Arc<dyn Clock>>,
    config: GovernorConfig,
}

impl BookmarksBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backing store.
    pub fn store(mut self, store: Arc<dyn BackingStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the pinned-conversation oracle.
    pub fn pinned(mut self, pinned: Arc<dyn PinnedSetOracle>) -> Self {
        self.pinned = Some(pinned);
        self
    }

    /// Set the clock used for buckets and timestamps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the capacity and quota configuration.
    pub fn config(mut self, config: GovernorConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and wire the components.
    pub fn build(self) -> Result<Bookmarks> {
        self.config.validate()?;
        let store: Arc<dyn BackingStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::sync_platform()),
        };
        let pinned: Arc<dyn PinnedSetOracle> = match self.pinned {
            Some(pinned) => pinned,
            None => Arc::new(StoragePinnedSet::new(store.clone())),
        };
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };

        Ok(Bookmarks {
            scanner: KeySpaceScanner::new(store.clone()),
            collections: BookmarkCollectionStore::new(
                store.clone(),
                QuotaGuard::new(self.config.per_item_quota),
                clock.clone(),
            ),
            rotator: BucketRotator::new(store.clone(), clock),
            governor: CapacityGovernor::new(store.clone(), pinned)
                .with_examine_factor(self.config.examine_factor),
            config: self.config,
            store,
        })
    }
}
