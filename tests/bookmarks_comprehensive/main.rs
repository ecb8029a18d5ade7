//! Bookmarks Comprehensive Test Suite
//!
//! End-to-end tests through the public `pinmark` API: activation and
//! rotation, eviction under a key ceiling, collection CRUD, quota
//! enforcement, concurrent writers and persistence.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test bookmarks_comprehensive
//!
//! # Run eviction tests only
//! cargo test --test bookmarks_comprehensive eviction::
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use pinmark::{
    key, BackingStore, Bookmarks, DateBucket, FixedClock, GovernorConfig, MemoryStore,
};
use serde_json::{json, Value};

// Test modules
mod collections;
mod persistence;
mod properties;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Route `tracing` output to the test harness; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Store, clock and facade wired together
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub bookmarks: Bookmarks,
}

/// Unbounded in-memory store, default config, clock on `today` (YYYYMMDD)
pub fn harness(today: &str) -> Harness {
    harness_with(today, GovernorConfig::default(), MemoryStore::unbounded())
}

/// Harness with explicit config and store
pub fn harness_with(today: &str, config: GovernorConfig, store: MemoryStore) -> Harness {
    init_tracing();
    let store = Arc::new(store);
    let clock = Arc::new(clock_at(today));
    let bookmarks = Bookmarks::builder()
        .store(store.clone())
        .clock(clock.clone())
        .config(config)
        .build()
        .expect("valid configuration");
    Harness {
        store,
        clock,
        bookmarks,
    }
}

/// Clock on the date of a YYYYMMDD bucket
pub fn clock_at(bucket: &str) -> FixedClock {
    FixedClock::at_bucket(&DateBucket::parse(bucket).expect("8 digits")).expect("real date")
}

/// Bucket `offset` days after 2020-01-01
pub fn bucket_after(offset: i64) -> String {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
    DateBucket::from_date(base + Duration::days(offset))
        .as_str()
        .to_string()
}

/// Write a collection holding `ids` directly into the store
pub fn seed(store: &MemoryStore, key: &str, ids: &[&str]) {
    let records: Vec<Value> = ids
        .iter()
        .map(|id| json!({"articleId": id, "customName": null, "timestamp": 0}))
        .collect();
    store.set_one(key, Value::Array(records)).expect("seed write");
}

/// Pin conversations for a profile the way the pinning subsystem stores them
pub fn pin(store: &MemoryStore, profile_id: &str, conversation_ids: &[&str]) {
    let list: Vec<Value> = conversation_ids
        .iter()
        .map(|c| json!({"urlId": c, "title": format!("Pinned {c}")}))
        .collect();
    store
        .set_one(profile_id, Value::Array(list))
        .expect("pin write");
}

/// Static oracle over `(profile, conversation)` pairs
pub fn pinned_set(pairs: &[(&str, &str)]) -> Arc<HashSet<(String, String)>> {
    Arc::new(
        pairs
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect(),
    )
}

/// Keys in the store belonging to one conversation
pub fn conversation_keys(store: &dyn BackingStore, profile_id: &str, conversation_id: &str) -> Vec<String> {
    store
        .keys()
        .expect("keys")
        .into_iter()
        .filter(|k| key::matches_conversation(k, profile_id, conversation_id).is_some())
        .collect()
}
