//! Property Tests
//!
//! Randomized checks of the invariants that must hold for any sequence of
//! operations: one key per conversation, lossless rotation, pinned
//! collections never evicted and bounded eviction work.

use crate::*;
use pinmark::CapacityGovernor;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Advance(i64),
    Add(u8, u8),
    Remove(u8, u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0i64..3).prop_map(Op::Advance),
        (0u8..3, 0u8..6).prop_map(|(c, a)| Op::Add(c, a)),
        (0u8..3, 0u8..6).prop_map(|(c, a)| Op::Remove(c, a)),
    ]
}

fn unique_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z0-9]{1,8}", 0..12)
        .prop_map(|set| set.into_iter().collect())
        .prop_shuffle()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_at_most_one_key_per_conversation(ops in prop::collection::vec(op(), 1..40)) {
        let h = harness("20250101");
        for op in ops {
            match op {
                Op::Advance(days) => h.clock.advance_days(days),
                Op::Add(c, a) => {
                    let chat = h.bookmarks.conversation("p1", &format!("c{c}")).unwrap();
                    chat.add(&format!("a{a}"), None).unwrap();
                }
                Op::Remove(c, a) => {
                    let chat = h.bookmarks.conversation("p1", &format!("c{c}")).unwrap();
                    chat.remove(&format!("a{a}")).unwrap();
                }
            }
            for c in 0..3 {
                let keys = conversation_keys(h.store.as_ref(), "p1", &format!("c{c}"));
                prop_assert!(keys.len() <= 1, "{:?}", keys);
            }
            // Empty collections are never stored
            for (_, value) in h.store.snapshot() {
                prop_assert!(value.as_array().map_or(true, |a| !a.is_empty()));
            }
        }
    }

    #[test]
    fn prop_rotation_preserves_content(ids in unique_ids(), gap in 1i64..400) {
        let h = harness("20250101");
        let chat = h.bookmarks.conversation("p1", "c1").unwrap();
        for (i, id) in ids.iter().enumerate() {
            let name = if i % 2 == 0 { Some(id.as_str()) } else { None };
            chat.add(id, name).unwrap();
        }
        let before = chat.list().unwrap();
        let old_key = chat.key().clone();

        h.clock.advance_days(gap);
        let rotated = h.bookmarks.conversation("p1", "c1").unwrap();

        prop_assert_eq!(rotated.list().unwrap(), before);
        prop_assert!(!h.store.contains(old_key.as_str()));
    }

    #[test]
    fn prop_pinned_never_evicted(
        n in 1usize..60,
        pinned_mask in prop::collection::vec(any::<bool>(), 60),
        ceiling in 1usize..60,
        batch in 1usize..8,
    ) {
        init_tracing();
        let store = Arc::new(MemoryStore::unbounded());
        let mut pinned = Vec::new();
        for i in 0..n {
            let conversation = format!("c{i:02}");
            seed(&store, &format!("bm_p1_{conversation}_lastAccess_{}", bucket_after(i as i64)), &["a"]);
            if pinned_mask[i] {
                pinned.push(("p1".to_string(), conversation));
            }
        }
        let pairs: Vec<(&str, &str)> = pinned.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let governor = CapacityGovernor::new(store.clone(), pinned_set(&pairs));

        let report = governor.ensure_capacity(ceiling, batch).unwrap();

        prop_assert!(report.examined <= 10 * batch);
        prop_assert!(report.evicted.len() <= batch);
        for key in &report.evicted {
            let parts = key::decode(key.as_str()).unwrap();
            prop_assert!(!pinned.contains(&(parts.profile_id, parts.conversation_id)));
        }
        for (p, c) in &pinned {
            prop_assert_eq!(conversation_keys(store.as_ref(), p, c).len(), 1);
        }
        if n < ceiling {
            prop_assert!(report.is_noop());
        }
    }

    #[test]
    fn prop_eviction_bounded_when_all_pinned(n in 1usize..200, batch in 1usize..10) {
        init_tracing();
        let store = Arc::new(MemoryStore::unbounded());
        let mut pairs = Vec::new();
        for i in 0..n {
            let conversation = format!("c{i:03}");
            seed(&store, &format!("bm_p1_{conversation}_lastAccess_{}", bucket_after(i as i64)), &["a"]);
            pairs.push(("p1".to_string(), conversation));
        }
        let refs: Vec<(&str, &str)> = pairs.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let governor = CapacityGovernor::new(store.clone(), pinned_set(&refs));

        let report = governor.ensure_capacity(1, batch).unwrap();
        prop_assert!(report.capacity_exhausted);
        prop_assert_eq!(report.examined, n.min(10 * batch));
        prop_assert_eq!(store.len(), n);
    }

    #[test]
    fn prop_add_twice_is_one_record(id in "[a-z]{1,10}", name in proptest::option::of("[a-zA-Z ]{0,20}")) {
        let h = harness("20250101");
        let chat = h.bookmarks.conversation("p1", "c1").unwrap();
        chat.add(&id, name.as_deref()).unwrap();
        chat.add(&id, name.as_deref()).unwrap();
        let records = chat.list().unwrap();
        prop_assert_eq!(records.len(), 1);
        prop_assert_eq!(&records[0].article_id, &id);
    }
}
