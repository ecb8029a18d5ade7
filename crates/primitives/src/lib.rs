//! Bookmark storage primitives for Pinmark
//!
//! Every primitive here is a stateless facade over an
//! `Arc<dyn BackingStore>`: no caches, no locks, all state lives in the
//! shared key space. That keeps any number of instances (one per open tab)
//! safe to create, with last-write-wins between them.
//!
//! - [`KeySpaceScanner`]: the one place that enumerates bookmark keys
//! - [`QuotaGuard`]: per-item byte quota admission
//! - [`PinnedSetOracle`]: read-only view of pinned conversations
//! - [`BookmarkCollectionStore`]: CRUD on one date-bucketed collection
//! - [`BucketRotator`]: moves a collection onto today's bucket
//! - [`CapacityGovernor`]: evicts the oldest unpinned collections

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod governor;
pub mod pinned;
pub mod quota;
pub mod rotation;
pub mod scanner;

pub use collection::{AddOutcome, BookmarkCollectionStore, RemoveOutcome, RenameOutcome};
pub use governor::{CapacityGovernor, EvictionReport, DEFAULT_EXAMINE_FACTOR};
pub use pinned::{PinnedSetOracle, StoragePinnedSet};
pub use quota::{admit_write, Admission, QuotaExceeded, QuotaGuard};
pub use rotation::BucketRotator;
pub use scanner::{KeySpaceScanner, ScannedKey};
