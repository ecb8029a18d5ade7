//! Core types for Pinmark
//!
//! This crate defines the fundamental pieces every other layer builds on:
//! - [`DateBucket`], [`StorageKey`], [`BookmarkRecord`]: the data model
//! - [`key`]: the composite key codec (`bm_{profile}_{conversation}_lastAccess_{YYYYMMDD}`)
//! - [`Clock`]: injected time source so lower layers never read the wall clock
//! - [`BackingStore`]: the narrow get/set/remove contract of the synced store
//! - [`Error`]: the core error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod error;
pub mod key;
pub mod traits;
pub mod types;

pub use clock::{current_date_bucket, Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use key::KeyParts;
pub use traits::{item_size, BackingStore};
pub use types::{BookmarkRecord, DateBucket, PinnedConversation, StorageKey};
