//! Convenient imports for pinmark.
//!
//! ```ignore
//! use pinmark::prelude::*;
//!
//! let bookmarks = Bookmarks::in_memory()?;
//! bookmarks.conversation("p1", "c1")?.add("a1", None)?;
//! ```

// Main entry point
pub use crate::bookmarks::{Bookmarks, BookmarksBuilder, ConversationBookmarks};

// Error handling
pub use crate::error::{Error, Result};

// Configuration
pub use crate::config::GovernorConfig;

// Outcomes
pub use pinmark_primitives::{AddOutcome, EvictionReport, RemoveOutcome, RenameOutcome};

// Collaborator seams
pub use pinmark_core::{BackingStore, Clock};
pub use pinmark_primitives::PinnedSetOracle;

// Core types
pub use pinmark_core::{BookmarkRecord, DateBucket, StorageKey};

// Stores
pub use pinmark_storage::{FileStore, MemoryStore, StoreLimits};
