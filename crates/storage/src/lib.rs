//! Storage layer for Pinmark
//!
//! This crate implements [`pinmark_core::BackingStore`] for:
//! - MemoryStore: in-memory emulation of the synced-storage platform, with
//!   its item/byte limits and fault injection for failure-path tests
//! - FileStore: the same namespace persisted as one JSON file
//! - StoreLimits: the platform quotas both stores enforce

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;
pub mod limits;
pub mod memory;

pub use file::FileStore;
pub use limits::StoreLimits;
pub use memory::MemoryStore;
