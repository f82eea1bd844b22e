//! Shape equivalence through the whole client

use crate::support::Fixture;
use proptest::prelude::*;
use scholar::{normalize, Experiment, RequestDescriptor};
use serde_json::json;

fn envelope_for(body: serde_json::Value) -> scholar::Envelope {
    let f = Fixture::new();
    f.backend.push_json(200, body);
    f.session
        .client()
        .call(&RequestDescriptor::get("/api/experiment/projects"))
        .unwrap()
}

#[test]
fn test_three_shapes_same_envelope() {
    let payload = json!([{"id": 1, "name": "Pendulum"}, {"id": "2", "status": "1"}]);

    let flagged = envelope_for(json!({"success": true, "data": payload.clone()}));
    let coded = envelope_for(json!({"code": 200, "data": payload.clone()}));
    let bare = envelope_for(payload.clone());

    assert_eq!(flagged, coded);
    assert_eq!(coded, bare);
    assert_eq!(bare.payload, payload);
}

#[test]
fn test_shapes_decode_to_same_records() {
    let payload = json!([{"id": 1, "status": 1}, {"id": 2, "status": "0"}]);
    let shapes = [
        json!({"success": true, "message": "ok", "data": payload.clone()}),
        json!({"code": 200, "message": "ok", "data": payload.clone()}),
        payload.clone(),
    ];

    let decoded: Vec<Vec<Experiment>> = shapes
        .into_iter()
        .map(|body| {
            let f = Fixture::new();
            f.backend.push_json(200, body);
            f.session
                .client()
                .call_list(&RequestDescriptor::get("/api/experiment/projects"))
                .unwrap()
        })
        .collect();

    assert_eq!(decoded[0], decoded[1]);
    assert_eq!(decoded[1], decoded[2]);
    assert_eq!(decoded[0][1].status, 0);
}

#[test]
fn test_unknown_object_passes_through() {
    let envelope = envelope_for(json!({"id": 9, "name": "bare record"}));
    assert!(envelope.succeeded);
    assert_eq!(envelope.payload["id"], 9);
}

proptest! {
    /// Flagged and coded envelopes carrying the same record normalize identically.
    #[test]
    fn prop_object_payload_equivalent(id in any::<i64>(), name in "[a-z]{0,12}") {
        let record = json!({"id": id, "name": name});
        let flagged = normalize(json!({"success": true, "data": record.clone()})).unwrap();
        let coded = normalize(json!({"code": 200, "data": record.clone()})).unwrap();
        let bare = normalize(record).unwrap();
        prop_assert_eq!(&flagged, &coded);
        prop_assert_eq!(&coded, &bare);
    }
}
