//! Login, logout and session isolation

use crate::support::Fixture;
use scholar::{EntityId, ErrorKind, SessionError, SessionStorage};
use serde_json::json;

#[test]
fn test_login_then_calls_carry_token() {
    let f = Fixture::new();
    f.backend.push_json(
        200,
        json!({"success": true, "data": {"token": "Bearer abc", "userInfo": {"id": 3, "role": 0, "status": 1}}}),
    );
    f.backend.push_json(200, json!({"success": true, "data": []}));

    let user = f.session.login("ana", "pw").unwrap();
    assert!(user.is_active());
    assert!(!user.is_admin());

    f.session.experiments().fetch_all(false).unwrap();
    assert_eq!(
        f.backend.last_request().unwrap().header("Authorization"),
        Some("Bearer abc")
    );
}

#[test]
fn test_login_failure_is_not_persisted() {
    let f = Fixture::new();
    f.backend.push_json(500, json!({"message": "db down"}));

    let err = f.session.login("ana", "pw").unwrap_err();
    let SessionError::Classified(err) = err else {
        panic!("expected a classified error");
    };
    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert!(f.storage.get("token").is_none());
    assert!(f.session.current_user().is_none());
}

#[test]
fn test_logout_resets_every_store() {
    let f = Fixture::new().logged_in();
    f.backend
        .push_json(200, json!({"success": true, "data": [{"id": 1}]}));
    f.backend
        .push_json(200, json!({"code": 200, "data": [{"id": 5, "bookingStatus": "BOOKED"}]}));
    f.backend
        .push_json(200, json!({"code": 200, "data": [{"id": 9, "sendStatus": "SENT"}]}));
    f.session.experiments().fetch_all(false).unwrap();
    f.session.exam_bookings().fetch_user_bookings(None, false).unwrap();
    f.session.notifications().fetch_all(false).unwrap();

    f.session.logout().unwrap();

    assert!(!f.session.is_authenticated());
    assert!(f.session.experiments().get(&EntityId::from(1)).is_none());
    assert!(f.session.exam_bookings().bookings().is_empty());
    assert!(f.session.notifications().notifications().is_empty());
    assert_eq!(f.navigator.routes(), vec!["/login".to_string()]);
}

#[test]
fn test_sessions_do_not_share_caches() {
    let a = Fixture::new().logged_in();
    let b = Fixture::new().logged_in();
    a.backend
        .push_json(200, json!({"success": true, "data": [{"id": 1}]}));
    b.backend
        .push_json(200, json!({"success": true, "data": [{"id": 2}, {"id": 3}]}));

    assert_eq!(a.session.experiments().fetch_all(false).unwrap().len(), 1);
    assert_eq!(b.session.experiments().fetch_all(false).unwrap().len(), 2);
    a.session.logout().unwrap();
    assert_eq!(b.session.experiments().fetch_all(false).unwrap().len(), 2);
    assert!(b.session.is_authenticated());
}

#[test]
fn test_custom_login_route() {
    let f = Fixture::with_config(scholar::ClientConfig::new().login_route("/auth/sign-in"));
    f.backend.push_json(401, json!({}));

    f.session.notifications().fetch_all(false).unwrap_err();
    assert_eq!(f.navigator.routes(), vec!["/auth/sign-in".to_string()]);
}
