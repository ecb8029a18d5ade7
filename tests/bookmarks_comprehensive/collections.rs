//! Collection Tests
//!
//! add / remove / rename / list through a conversation handle.

use crate::*;
use pinmark::{AddOutcome, RemoveOutcome, RenameOutcome};

#[test]
fn test_add_then_list_in_order() {
    let h = harness("20250101");
    let chat = h.bookmarks.conversation("p1", "c1").unwrap();

    chat.add("a1", None).unwrap();
    h.clock.tick(1_000);
    chat.add("a2", Some("Second")).unwrap();
    chat.add("a3", None).unwrap();

    let records = chat.list().unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.article_id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "a2", "a3"]);
    assert_eq!(records[1].custom_name.as_deref(), Some("Second"));
    assert_eq!(records[1].timestamp - records[0].timestamp, 1_000);
}

#[test]
fn test_add_is_idempotent() {
    let h = harness("20250101");
    let chat = h.bookmarks.conversation("p1", "c1").unwrap();

    assert_eq!(chat.add("a1", Some("name")).unwrap(), AddOutcome::Added);
    assert_eq!(chat.add("a1", Some("name")).unwrap(), AddOutcome::AlreadyPresent);
    assert_eq!(chat.add("a1", Some("other")).unwrap(), AddOutcome::AlreadyPresent);

    let records = chat.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].custom_name.as_deref(), Some("name"));
}

#[test]
fn test_stored_layout() {
    let h = harness("20250101");
    let chat = h.bookmarks.conversation("p1", "c1").unwrap();
    chat.add("a1", None).unwrap();

    let stored = h.store.get_one("bm_p1_c1_lastAccess_20250101").unwrap().unwrap();
    assert_eq!(
        stored,
        json!([{"articleId": "a1", "customName": null, "timestamp": 1735689600000i64}])
    );
}

#[test]
fn test_remove_last_deletes_key() {
    let h = harness("20250101");
    let chat = h.bookmarks.conversation("p1", "c1").unwrap();
    chat.add("a1", None).unwrap();
    chat.add("a2", None).unwrap();

    assert_eq!(chat.remove("a1").unwrap(), RemoveOutcome::Removed);
    assert!(h.store.contains(chat.key().as_str()));

    assert_eq!(chat.remove("a2").unwrap(), RemoveOutcome::CollectionDeleted);
    assert!(!h.store.contains(chat.key().as_str()));
    assert!(h.store.is_empty());
    assert!(chat.list().unwrap().is_empty());
}

#[test]
fn test_remove_missing_is_noop() {
    let h = harness("20250101");
    let chat = h.bookmarks.conversation("p1", "c1").unwrap();
    chat.add("a1", None).unwrap();
    let before = h.store.snapshot();

    let outcome = chat.remove("nope").unwrap();
    assert!(matches!(outcome, RemoveOutcome::NotFound { .. }));
    assert_eq!(h.store.snapshot(), before);
}

#[test]
fn test_rename() {
    let h = harness("20250101");
    let chat = h.bookmarks.conversation("p1", "c1").unwrap();
    chat.add("a1", None).unwrap();
    chat.add("a2", Some("keep")).unwrap();

    assert_eq!(chat.rename("a1", "Renamed").unwrap(), RenameOutcome::Renamed);
    let records = chat.list().unwrap();
    assert_eq!(records[0].custom_name.as_deref(), Some("Renamed"));
    assert_eq!(records[1].custom_name.as_deref(), Some("keep"));
}

#[test]
fn test_rename_missing_reports_not_found() {
    let h = harness("20250101");
    let chat = h.bookmarks.conversation("p1", "c1").unwrap();

    let outcome = chat.rename("ghost", "x").unwrap();
    assert!(matches!(
        &outcome,
        RenameOutcome::NotFound { article_id, .. } if article_id == "ghost"
    ));
    // Rename never creates a collection
    assert!(h.store.is_empty());

    let err = outcome.into_result().map_err(pinmark::Error::from).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_conversations_are_isolated() {
    let h = harness("20250101");
    let c1 = h.bookmarks.conversation("p1", "c1").unwrap();
    let c2 = h.bookmarks.conversation("p1", "c2").unwrap();
    c1.add("a1", None).unwrap();
    c2.add("b1", None).unwrap();

    assert_eq!(c1.ids().unwrap(), vec!["a1"]);
    assert_eq!(c2.ids().unwrap(), vec!["b1"]);
    assert_eq!(h.bookmarks.bookmark_key_count().unwrap(), 2);
}

#[test]
fn test_corrupt_collection_is_serialization_error() {
    let h = harness("20250101");
    h.store
        .set_one("bm_p1_c1_lastAccess_20250101", json!({"not": "an array"}))
        .unwrap();
    let chat = h.bookmarks.conversation("p1", "c1").unwrap();
    assert!(matches!(chat.list(), Err(pinmark::Error::Serialization(_))));
}

#[test]
fn test_store_failures_propagate() {
    let h = harness("20250101");
    let chat = h.bookmarks.conversation("p1", "c1").unwrap();
    chat.add("a1", None).unwrap();

    h.store.fail_next_sets(1);
    assert!(chat.add("a2", None).unwrap_err().is_retryable());
    assert_eq!(chat.ids().unwrap(), vec!["a1"]);

    h.store.fail_next_removes(1);
    assert!(chat.remove("a1").unwrap_err().is_retryable());
    assert_eq!(chat.ids().unwrap(), vec!["a1"]);

    h.store.fail_next_gets(1);
    assert!(chat.list().is_err());
}
