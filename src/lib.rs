//! # Pinmark
//!
//! Bookmark storage for chat transcripts on a quota-limited, synced
//! key-value store.
//!
//! Bookmarks of one conversation live in a single collection keyed by
//! profile, conversation and the date it was last accessed:
//!
//! ```text
//! bm_{profileId}_{conversationId}_lastAccess_{YYYYMMDD}
//! ```
//!
//! The store holds a fixed number of keys, so the oldest collections are
//! evicted as the key count approaches a ceiling, except those of pinned
//! conversations, which are never evicted.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pinmark::prelude::*;
//!
//! let bookmarks = Bookmarks::in_memory()?;
//!
//! // Page activation: moves the collection onto today's key
//! let chat = bookmarks.conversation("profile-1", "chat-42")?;
//!
//! match chat.add("msg-7", None)? {
//!     AddOutcome::Rejected(q) => eprintln!("{}", q.user_message()),
//!     _ => {}
//! }
//! ```
//!
//! ## Consistency
//!
//! The backing store has no locks or transactions. Every mutation is a
//! read-modify-write of one key and concurrent writers are last-write-wins;
//! `add` is idempotent so retries never duplicate a bookmark.
//!
//! ## Components
//!
//! - [`BucketRotator`] - keeps a collection on today's key
//! - [`CapacityGovernor`] - evicts the oldest unpinned collections
//! - [`BookmarkCollectionStore`] - add / remove / rename / list
//! - [`QuotaGuard`] - per-item byte quota admission
//! - [`PinnedSetOracle`] - which conversations are pinned

#![warn(missing_docs)]

mod bookmarks;
mod config;
mod error;

pub mod prelude;

// Re-export main entry points
pub use bookmarks::{Bookmarks, BookmarksBuilder, ConversationBookmarks};
pub use config::{GovernorConfig, DEFAULT_BATCH_SIZE, DEFAULT_CEILING, DEFAULT_PER_ITEM_QUOTA};
pub use error::{Error, Result};

// Re-export components
pub use pinmark_primitives::{
    AddOutcome, BookmarkCollectionStore, BucketRotator, CapacityGovernor, EvictionReport,
    KeySpaceScanner, PinnedSetOracle, QuotaExceeded, QuotaGuard, RemoveOutcome, RenameOutcome,
    ScannedKey, StoragePinnedSet, DEFAULT_EXAMINE_FACTOR,
};

// Re-export stores
pub use pinmark_storage::{FileStore, MemoryStore, StoreLimits};

// Re-export core types
pub use pinmark_core::{
    current_date_bucket, key, BackingStore, BookmarkRecord, Clock, DateBucket, FixedClock,
    PinnedConversation, StorageKey, SystemClock,
};
