//! Core data model
//!
//! This module defines the values that flow through every layer:
//! - [`DateBucket`]: 8-digit `YYYYMMDD` time partition of a storage key
//! - [`StorageKey`]: the composite key identifying one bookmark collection
//! - [`BookmarkRecord`]: one bookmarked location in a conversation
//! - [`PinnedConversation`]: an entry of a profile's pinned list (read only)

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Calendar-date partition of a storage key
///
/// Always exactly 8 ASCII digits. Lexicographic order equals chronological
/// order, so buckets compare directly as strings.
///
/// # Examples
///
/// ```
/// use pinmark_core::DateBucket;
///
/// let bucket = DateBucket::parse("20250102").unwrap();
/// assert!(DateBucket::parse("2025-01-02").is_err());
/// assert!(bucket > DateBucket::parse("20250101").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateBucket(String);

impl DateBucket {
    /// Validate and wrap a bucket string
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(DateBucket(s))
        } else {
            Err(Error::InvalidDateBucket(s))
        }
    }

    /// Bucket for a calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        DateBucket(date.format("%Y%m%d").to_string())
    }

    /// Get the bucket as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DateBucket {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        DateBucket::parse(s)
    }
}

impl From<DateBucket> for String {
    fn from(b: DateBucket) -> Self {
        b.0
    }
}

/// Storage key of one bookmark collection
///
/// Built only through [`crate::key::encode`] or [`crate::key::parse`], so
/// every `StorageKey` has the `bm_{profile}_{conversation}_lastAccess_{YYYYMMDD}`
/// shape. Deserializing validates the same way. Ordering is plain string
/// ordering, used as the eviction tie-breaker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageKey(pub(crate) String);

impl StorageKey {
    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the raw string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for StorageKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        crate::key::parse(&s)
            .ok_or_else(|| Error::Serialization(format!("not a bookmark key: {s:?}")))
    }
}

impl From<StorageKey> for String {
    fn from(k: StorageKey) -> Self {
        k.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StorageKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A bookmarked location inside a conversation
///
/// Serialized as `{"articleId": .., "customName": .., "timestamp": ..}`.
/// `customName` is written as `null` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    /// Identifier of the bookmarked article, unique within its collection
    pub article_id: String,
    /// Optional user-chosen label
    #[serde(default)]
    pub custom_name: Option<String>,
    /// Creation time in milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
}

impl BookmarkRecord {
    /// Create a record
    pub fn new(article_id: impl Into<String>, custom_name: Option<String>, timestamp: i64) -> Self {
        Self {
            article_id: article_id.into(),
            custom_name,
            timestamp,
        }
    }
}

/// Entry of a profile's pinned-conversations list
///
/// Owned by the pinning subsystem; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedConversation {
    /// Conversation identifier
    pub url_id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
}
