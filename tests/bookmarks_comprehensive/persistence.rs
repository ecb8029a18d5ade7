//! Persistence Tests
//!
//! Bookmarks over a `FileStore` survive reopening, including across a
//! day change.

use crate::*;
use pinmark::{FileStore, StoreLimits};
use tempfile::TempDir;

fn open(path: &std::path::Path, today: &str) -> (Arc<FileStore>, Bookmarks) {
    init_tracing();
    let store = Arc::new(FileStore::open(path, StoreLimits::sync_platform()).unwrap());
    let bookmarks = Bookmarks::builder()
        .store(store.clone())
        .clock(Arc::new(clock_at(today)))
        .build()
        .unwrap();
    (store, bookmarks)
}

#[test]
fn test_reopen_preserves_bookmarks() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bookmarks.json");

    {
        let (_, bookmarks) = open(&path, "20250101");
        let chat = bookmarks.conversation("p1", "c1").unwrap();
        chat.add("a1", Some("first")).unwrap();
        chat.add("a2", None).unwrap();
    }

    let (_, bookmarks) = open(&path, "20250101");
    let records = bookmarks.conversation("p1", "c1").unwrap().list().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].custom_name.as_deref(), Some("first"));
}

#[test]
fn test_rotation_is_persisted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bookmarks.json");

    {
        let (_, bookmarks) = open(&path, "20250101");
        bookmarks
            .conversation("p1", "c1")
            .unwrap()
            .add("a1", None)
            .unwrap();
    }
    {
        let (_, bookmarks) = open(&path, "20250103");
        bookmarks.conversation("p1", "c1").unwrap();
    }

    let (store, _) = open(&path, "20250103");
    assert_eq!(
        store.keys().unwrap(),
        vec!["bm_p1_c1_lastAccess_20250103".to_string()]
    );
}

#[test]
fn test_pinned_list_read_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bookmarks.json");
    std::fs::write(
        &path,
        r#"{
            "p1": [{"urlId": "old", "title": "Keep me"}],
            "bm_p1_old_lastAccess_20240101": [{"articleId": "a", "customName": null, "timestamp": 0}],
            "bm_p1_older_lastAccess_20240102": [{"articleId": "b", "customName": null, "timestamp": 0}]
        }"#,
    )
    .unwrap();

    let store = Arc::new(FileStore::open(&path, StoreLimits::sync_platform()).unwrap());
    let bookmarks = Bookmarks::builder()
        .store(store.clone())
        .clock(Arc::new(clock_at("20250101")))
        .config(GovernorConfig::default().ceiling(2).batch_size(1))
        .build()
        .unwrap();

    let report = bookmarks.ensure_capacity().unwrap();
    assert_eq!(report.evicted[0].as_str(), "bm_p1_older_lastAccess_20240102");
    assert!(store.get_one("bm_p1_old_lastAccess_20240101").unwrap().is_some());
}

#[test]
fn test_corrupt_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bookmarks.json");
    std::fs::write(&path, "not json").unwrap();

    let err = FileStore::open(&path, StoreLimits::sync_platform()).unwrap_err();
    assert!(matches!(
        pinmark::Error::from(err),
        pinmark::Error::Serialization(_)
    ));
}
