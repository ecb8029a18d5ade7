//! Composite storage key codec
//!
//! Key layout:
//!
//! ```text
//! bm_{profileId}_{conversationId}_lastAccess_{YYYYMMDD}
//! ```
//!
//! The bucket is part of the key's identity, but scanning code must treat
//! it purely as a sort key. Decoding is ambiguous when ids contain `_`:
//! [`decode`] gives the profile the longest possible prefix and the
//! conversation the last segment, while [`candidate_splits`] lists every
//! interpretation for callers that must be conservative.
//!
//! Keys that do not match the full pattern decode to `None`, never to an
//! error, so unrelated keys in the shared namespace are ignored by scans.

use crate::error::Result;
use crate::types::{DateBucket, StorageKey};
use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix shared by every bookmark key
pub const KEY_PREFIX: &str = "bm_";

/// Literal separating the ids from the date bucket
pub const ACCESS_MARKER: &str = "_lastAccess_";

/// Length of `_lastAccess_YYYYMMDD`
const SUFFIX_LEN: usize = ACCESS_MARKER.len() + 8;

static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^bm_(.+)_(.+?)_lastAccess_([0-9]{8})$").expect("bookmark key pattern is valid")
});

/// Decoded components of a bookmark key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyParts {
    /// Profile the collection belongs to
    pub profile_id: String,
    /// Conversation the collection belongs to
    pub conversation_id: String,
    /// Access-date bucket
    pub bucket: DateBucket,
}

impl KeyParts {
    /// Re-encode these parts into the key they were decoded from
    pub fn key(&self) -> StorageKey {
        key_for(&self.profile_id, &self.conversation_id, &self.bucket)
    }
}

/// Encode a key from raw components
///
/// Fails with [`crate::Error::InvalidDateBucket`] unless `bucket` is exactly
/// 8 ASCII digits.
///
/// # Examples
///
/// ```
/// use pinmark_core::key::encode;
///
/// let key = encode("p1", "c1", "20250101").unwrap();
/// assert_eq!(key.as_str(), "bm_p1_c1_lastAccess_20250101");
/// assert!(encode("p1", "c1", "2025").is_err());
/// ```
pub fn encode(profile_id: &str, conversation_id: &str, bucket: &str) -> Result<StorageKey> {
    let bucket = DateBucket::parse(bucket)?;
    Ok(key_for(profile_id, conversation_id, &bucket))
}

/// Encode a key from an already-validated bucket
pub fn key_for(profile_id: &str, conversation_id: &str, bucket: &DateBucket) -> StorageKey {
    StorageKey(format!(
        "{}{}",
        conversation_prefix(profile_id, conversation_id),
        bucket
    ))
}

/// Decode a raw key
///
/// Returns `None` for anything that is not a bookmark key.
pub fn decode(raw: &str) -> Option<KeyParts> {
    let caps = KEY_PATTERN.captures(raw)?;
    let bucket = DateBucket::parse(&caps[3]).ok()?;
    Some(KeyParts {
        profile_id: caps[1].to_string(),
        conversation_id: caps[2].to_string(),
        bucket,
    })
}

/// Validate a raw key, returning it typed
pub fn parse(raw: &str) -> Option<StorageKey> {
    decode(raw).map(|_| StorageKey(raw.to_string()))
}

/// Check whether a raw key has the bookmark key shape
pub fn is_bookmark_key(raw: &str) -> bool {
    KEY_PATTERN.is_match(raw)
}

/// Everything before the date bucket for one conversation
pub fn conversation_prefix(profile_id: &str, conversation_id: &str) -> String {
    format!("{KEY_PREFIX}{profile_id}_{conversation_id}{ACCESS_MARKER}")
}

/// Match a raw key against one `(profile, conversation)` pair
///
/// Exact prefix match, so it is unaffected by decoding ambiguity. Returns
/// the key's bucket on a match.
pub fn matches_conversation(
    raw: &str,
    profile_id: &str,
    conversation_id: &str,
) -> Option<DateBucket> {
    let rest = raw.strip_prefix(&conversation_prefix(profile_id, conversation_id))?;
    DateBucket::parse(rest).ok()
}

/// Every `(profile, conversation)` pair a key could have been encoded from
///
/// A body `a_b_c` yields `("a", "b_c")` and `("a_b", "c")`. Empty for keys
/// that do not decode.
pub fn candidate_splits(raw: &str) -> Vec<(String, String)> {
    if !is_bookmark_key(raw) {
        return Vec::new();
    }
    let body = &raw[KEY_PREFIX.len()..raw.len() - SUFFIX_LEN];
    body.match_indices('_')
        .map(|(i, _)| i)
        .filter(|&i| i > 0 && i + 1 < body.len())
        .map(|i| (body[..i].to_string(), body[i + 1..].to_string()))
        .collect()
}
