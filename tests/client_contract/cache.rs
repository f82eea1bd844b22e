//! Cache-then-fetch and accepted-write patching

use crate::support::Fixture;
use scholar::{EntityId, ErrorKind};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn experiments(n: i64) -> serde_json::Value {
    let list: Vec<serde_json::Value> = (1..=n)
        .map(|i| json!({"id": i, "name": format!("exp {}", i), "status": 0}))
        .collect();
    json!({"success": true, "data": list})
}

#[test]
fn test_fetch_all_hits_network_only_when_needed() {
    let f = Fixture::new().logged_in();
    f.backend.push_json(200, experiments(3));
    f.backend.push_json(200, experiments(4));
    let store = f.session.experiments();

    store.fetch_all(false).unwrap();
    assert_eq!(f.backend.calls(), 1);

    for _ in 0..5 {
        assert_eq!(store.fetch_all(false).unwrap().len(), 3);
    }
    assert_eq!(f.backend.calls(), 1);

    assert_eq!(store.fetch_all(true).unwrap().len(), 4);
    assert_eq!(f.backend.calls(), 2);
}

#[test]
fn test_fetch_by_id_reuses_reference() {
    let f = Fixture::new().logged_in();
    f.backend
        .push_json(200, json!({"success": true, "data": {"id": 42, "name": "Optics"}}));
    let store = f.session.experiments();

    let first = store.fetch_by_id(&EntityId::from(42), false).unwrap();
    assert_eq!(f.backend.calls(), 1);

    let second = store.fetch_by_id(&EntityId::from("42"), false).unwrap();
    assert_eq!(f.backend.calls(), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_failed_initial_load_leaves_nothing() {
    let f = Fixture::new().logged_in();
    f.backend.push_json(404, json!({}));
    let store = f.session.experiments();

    let err = store.fetch_by_id(&EntityId::from(7), false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(store.get(&EntityId::from(7)).is_none());
    assert!(!store.is_loading());
}

#[test]
fn test_accepted_write_patches_only_target() {
    let f = Fixture::new().logged_in();
    f.backend.push_json(200, experiments(5));
    f.backend.push_json(200, json!({"code": 200}));
    let store = f.session.experiments();

    let before = store.fetch_all(false).unwrap();
    let before_json: Vec<String> = before
        .iter()
        .map(|e| serde_json::to_string(e.as_ref()).unwrap())
        .collect();

    store.update_status(&EntityId::from(3), 1).unwrap();

    let after = store.fetch_all(false).unwrap();
    for (i, (old, new)) in before.iter().zip(&after).enumerate() {
        if new.id == EntityId::from(3) {
            assert_eq!(new.status, 1);
        } else {
            assert!(Arc::ptr_eq(old, new));
            assert_eq!(serde_json::to_string(new.as_ref()).unwrap(), before_json[i]);
        }
    }
}

#[test]
fn test_rejected_write_applies_nothing() {
    let f = Fixture::new().logged_in();
    f.backend.push_json(200, experiments(2));
    f.backend
        .push_json(200, json!({"success": false, "message": "experiment locked"}));
    let store = f.session.experiments();
    store.fetch_all(false).unwrap();

    let err = store.update_status(&EntityId::from(1), 1).unwrap_err();
    assert_eq!(err.message(), "experiment locked");
    assert_eq!(store.get(&EntityId::from(1)).unwrap().status, 0);
}

#[test]
fn test_concurrent_writes_to_one_id_are_serialized() {
    let f = Fixture::new().logged_in();
    f.backend.push_json(200, json!({"code": 200, "data": [
        {"id": 1, "sendStatus": "SENT"},
        {"id": 2, "sendStatus": "SENT"}
    ]}));
    for _ in 0..8 {
        f.backend.push_json(200, json!({"code": 200}));
    }
    let store = f.session.notifications();
    store.fetch_all(false).unwrap();

    thread::scope(|s| {
        for i in 0..8 {
            let id = EntityId::from(1 + (i % 2));
            s.spawn(move || store.mark_as_read(&id).unwrap());
        }
    });

    assert_eq!(store.unread_count(), 0);
    assert_eq!(f.backend.calls(), 9);
}
