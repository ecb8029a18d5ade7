//! Unified error type for pinmark.
//!
//! This module provides a stable error type that wraps the errors of the
//! member crates and presents a consistent interface to callers.

use thiserror::Error;

/// All pinmark errors.
///
/// Quota rejections and missing records are normally reported as outcomes
/// (see [`AddOutcome`](crate::AddOutcome)); they only show up here when a
/// caller converts an outcome with `into_result`.
#[derive(Debug, Error)]
pub enum Error {
    /// Date bucket is not exactly 8 ASCII digits
    #[error("invalid date bucket: {0:?}")]
    InvalidDateBucket(String),

    /// Write would exceed the per-item byte quota
    #[error("storage quota exceeded for {key}: {size} bytes > {quota} bytes")]
    QuotaExceeded {
        /// Key the write targeted
        key: String,
        /// Size the item would have had
        size: usize,
        /// Per-item quota in bytes
        quota: usize,
    },

    /// Bookmark not found in its collection
    #[error("bookmark {article_id} not found under {key}")]
    NotFound {
        /// Collection key
        key: String,
        /// Missing article id
        article_id: String,
    },

    /// Backing store get/set/remove failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration rejected by validation or parsing
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for pinmark operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// Backing-store failures may succeed on retry; the library never
    /// retries on its own. A failed write is "outcome unknown", not "no-op".
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this is a quota rejection.
    pub fn is_quota(&self) -> bool {
        matches!(self, Error::QuotaExceeded { .. })
    }
}

// Convert from internal core errors
impl From<pinmark_core::Error> for Error {
    fn from(e: pinmark_core::Error) -> Self {
        use pinmark_core::Error as CoreError;
        match e {
            CoreError::InvalidDateBucket(bucket) => Error::InvalidDateBucket(bucket),
            CoreError::StorageQuotaExceeded { key, size, quota } => {
                Error::QuotaExceeded { key, size, quota }
            }
            CoreError::RecordNotFound { key, article_id } => Error::NotFound { key, article_id },
            CoreError::BackingStoreUnavailable(msg) => Error::Storage(msg),
            CoreError::Serialization(msg) => Error::Serialization(msg),
        }
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
