//! Status classification, side effects and body handling

use crate::support::Fixture;
use scholar::{ErrorKind, RawResponse, RequestDescriptor, SessionStorage};
use serde_json::json;

#[test]
fn test_every_non_2xx_status_notifies_once() {
    let cases = [
        (400, ErrorKind::ServerError),
        (401, ErrorKind::Unauthorized),
        (403, ErrorKind::Forbidden),
        (404, ErrorKind::NotFound),
        (409, ErrorKind::ServerError),
        (418, ErrorKind::ServerError),
        (500, ErrorKind::ServerError),
        (502, ErrorKind::ServerError),
        (503, ErrorKind::ServerError),
    ];
    for (status, expected) in cases {
        let f = Fixture::new().logged_in();
        f.backend.push_json(status, json!({"message": "nope"}));

        let err = f
            .session
            .client()
            .call(&RequestDescriptor::get("/api/anything"))
            .unwrap_err();

        assert_eq!(err.kind(), expected, "status {}", status);
        assert_eq!(err.status(), Some(status));
        assert_eq!(f.notifier.count(), 1, "status {}", status);
    }
}

#[test]
fn test_flagged_failure_on_200_is_validation_failed() {
    let f = Fixture::new().logged_in();
    f.backend.push_json(
        200,
        json!({"success": false, "message": "quota exceeded", "errorCode": "Q1"}),
    );

    let err = f
        .session
        .client()
        .call(&RequestDescriptor::post("/api/experiment/book").with_json(json!({})))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(err.message(), "quota exceeded");
    assert_eq!(err.error_code(), Some("Q1"));
    assert!(f.navigator.routes().is_empty());
    assert!(f.session.is_authenticated());
    assert_eq!(f.notifier.messages(), vec!["quota exceeded".to_string()]);
}

#[test]
fn test_401_clears_storage_and_navigates() {
    let f = Fixture::new().logged_in();
    f.storage.set("userInfo", r#"{"id":1}"#).unwrap();
    f.backend.push_raw(RawResponse::new(401, b"<html>denied</html>".to_vec()));

    let err = f
        .session
        .client()
        .call(&RequestDescriptor::get("/api/users/1"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(f.storage.is_empty());
    assert_eq!(f.navigator.routes(), vec!["/login".to_string()]);
    assert_eq!(f.notifier.count(), 1);
}

#[test]
fn test_coded_401_behaves_like_http_401() {
    let f = Fixture::new().logged_in();
    f.backend
        .push_json(200, json!({"code": 401, "message": "token expired"}));

    let err = f
        .session
        .client()
        .call(&RequestDescriptor::get("/api/exam-booking/notifications"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(!f.session.is_authenticated());
    assert_eq!(f.navigator.routes(), vec!["/login".to_string()]);
}

#[test]
fn test_inline_errors_skip_notification_except_unauthorized() {
    let f = Fixture::new().logged_in();
    f.backend
        .push_json(200, json!({"success": false, "message": "email taken"}));
    f.backend.push_json(401, json!({}));

    let req = RequestDescriptor::post("/api/users/register")
        .with_json(json!({}))
        .with_inline_errors();
    let err = f.session.client().call(&req).unwrap_err();
    assert_eq!(err.message(), "email taken");
    assert_eq!(f.notifier.count(), 0);

    let err = f.session.client().call(&req).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(f.notifier.count(), 1);
}

#[test]
fn test_network_failure_is_network_error() {
    let f = Fixture::new();
    f.backend.push_failure("connection refused");

    let err = f
        .session
        .client()
        .call(&RequestDescriptor::get("/x").with_inline_errors())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NetworkError);
    assert_eq!(f.notifier.count(), 1);
    assert!(f.navigator.routes().is_empty());
}

#[test]
fn test_empty_and_garbage_bodies_are_no_content() {
    let f = Fixture::new();
    f.backend.push_raw(RawResponse::new(204, Vec::new()));
    f.backend.push_raw(RawResponse::new(200, b"not json".to_vec()));

    for _ in 0..2 {
        let envelope = f
            .session
            .client()
            .call(&RequestDescriptor::delete("/api/x/1"))
            .unwrap();
        assert!(envelope.succeeded);
        assert_eq!(envelope.message, "ok");
        assert!(envelope.payload.is_null());
    }
    assert_eq!(f.notifier.count(), 0);
}

#[test]
fn test_blob_is_returned_unparsed() {
    let f = Fixture::new().logged_in();
    let bytes = b"{\"success\": false, \"message\": \"looks like json\"}".to_vec();
    f.backend.push_raw(RawResponse::new(200, bytes.clone()));

    let report = f
        .session
        .experiments()
        .api()
        .export_report(&scholar::EntityId::from(12), "pdf")
        .unwrap();

    assert_eq!(report, bytes);
    assert_eq!(f.notifier.count(), 0);
}

#[test]
fn test_authorization_conventions() {
    let f = Fixture::new().logged_in();
    f.backend.push_json(200, json!({"success": true, "data": []}));
    f.backend.push_json(200, json!({"code": 200, "data": []}));

    f.session.experiments().fetch_all(false).unwrap();
    f.session.notifications().fetch_all(false).unwrap();

    let requests = f.backend.requests();
    assert_eq!(requests[0].header("Authorization"), Some("Bearer tok-1"));
    assert_eq!(requests[1].header("Authorization"), Some("tok-1"));
}
