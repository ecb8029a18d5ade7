//! Error types for the bookmark storage core
//!
//! ## Taxonomy
//!
//! | Variant | Recovery |
//! |---------|----------|
//! | InvalidDateBucket | Programmer error, fails fast |
//! | StorageQuotaExceeded | Mutation abandoned, user is told storage is full |
//! | RecordNotFound | Logged, treated as a no-op |
//! | BackingStoreUnavailable | Propagated unchanged, caller decides on retry |
//! | Serialization | Stored value is not a bookmark collection |
//!
//! `CapacityExhausted` is deliberately not an error: eviction that frees
//! nothing is reported on the eviction report and logged as a warning.

use thiserror::Error;

/// Errors produced by the core components.
#[derive(Debug, Error)]
pub enum Error {
    /// Date bucket is not exactly 8 ASCII digits
    #[error("invalid date bucket: {0:?}")]
    InvalidDateBucket(String),

    /// A write would push a single item past the per-item byte quota
    #[error("storage quota exceeded for {key}: {size} bytes > {quota} bytes")]
    StorageQuotaExceeded {
        /// Key the write targeted
        key: String,
        /// Size the item would have after the write
        size: usize,
        /// Per-item quota in bytes
        quota: usize,
    },

    /// Rename or remove target is absent from the collection
    #[error("bookmark {article_id} not found under {key}")]
    RecordNotFound {
        /// Collection key
        key: String,
        /// Missing article id
        article_id: String,
    },

    /// Failure of the underlying get/set/remove calls
    #[error("backing store unavailable: {0}")]
    BackingStoreUnavailable(String),

    /// Stored value could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a backing-store failure from any displayable cause.
    pub fn unavailable(cause: impl std::fmt::Display) -> Self {
        Error::BackingStoreUnavailable(cause.to_string())
    }

    /// Check if this error came from the backing store.
    ///
    /// The core never retries these itself.
    pub fn is_backing_store(&self) -> bool {
        matches!(self, Error::BackingStoreUnavailable(_))
    }

    /// Check if this is a quota rejection.
    pub fn is_quota(&self) -> bool {
        matches!(self, Error::StorageQuotaExceeded { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackingStoreUnavailable(e.to_string())
    }
}
