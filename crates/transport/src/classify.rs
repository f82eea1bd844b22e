//! Error classification
//!
//! Every raw failure is turned into a [`ClassifiedError`] here and nowhere
//! else, and this is the only place that raises user-visible side effects:
//!
//! | Failure | Kind | Side effects |
//! |---------|------|--------------|
//! | HTTP 401 / code 401 | Unauthorized | notify, clear auth storage, navigate to login |
//! | HTTP 403 / code 403 | Forbidden | notify unless handled inline |
//! | HTTP 404 / code 404 | NotFound | notify unless handled inline |
//! | HTTP 5xx, other non-2xx, code >= 500 | ServerError | notify unless handled inline |
//! | `success: false`, other non-200 code | ValidationFailed | notify unless handled inline |
//! | no response | NetworkError | notify |
//!
//! Exactly one notification is raised per failure, or none when the caller
//! asked to render the error inline and the kind allows it.

use scholar_core::json::scalar_to_string;
use scholar_core::{ClassifiedError, ErrorCause, ErrorKind};
use scholar_security::AuthStore;
use scholar_wire::WireFailure;
use std::sync::Arc;

use crate::backend::TransportFailure;
use crate::effects::{Navigator, Notice, Notifier};

/// Turns raw failures into classified errors and raises their side effects
#[derive(Clone)]
pub struct ErrorClassifier {
    auth: AuthStore,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl std::fmt::Debug for ErrorClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorClassifier")
            .field("login_route", &self.login_route)
            .finish_non_exhaustive()
    }
}

impl ErrorClassifier {
    /// Create a classifier
    pub fn new(
        auth: AuthStore,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            notifier,
            navigator,
            login_route: login_route.into(),
        }
    }

    /// Non-2xx HTTP status
    ///
    /// The body's `message` is used when it has one; otherwise the kind's
    /// default message.
    pub fn classify_status(&self, status: u16, body: &[u8], inline: bool) -> ClassifiedError {
        let kind = ErrorKind::from_status(status);
        let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|b| b.get(name))
                .and_then(scalar_to_string)
                .filter(|s| !s.trim().is_empty())
        };
        let message = field("message").unwrap_or_else(|| kind.default_message().to_string());
        let error_code = field("errorCode");

        let err = ClassifiedError::new(
            kind,
            message,
            ErrorCause::Status {
                status,
                body: parsed,
            },
        )
        .with_error_code(error_code);
        self.raise(err, inline)
    }

    /// No response was received
    pub fn classify_transport(&self, failure: &TransportFailure) -> ClassifiedError {
        let kind = ErrorKind::NetworkError;
        let err = ClassifiedError::new(
            kind,
            kind.default_message(),
            ErrorCause::Transport(failure.0.clone()),
        );
        self.raise(err, false)
    }

    /// Failure reported inside a 2xx response body
    pub fn classify_wire(&self, failure: WireFailure, inline: bool) -> ClassifiedError {
        let err = match failure {
            WireFailure::Flagged {
                message,
                error_code,
                body,
            } => ClassifiedError::new(ErrorKind::ValidationFailed, message, ErrorCause::Payload(body))
                .with_error_code(error_code),
            WireFailure::Coded {
                code,
                message,
                body,
            } => ClassifiedError::new(ErrorKind::from_code(code), message, ErrorCause::Payload(body)),
        };
        self.raise(err, inline)
    }

    /// A request that could not be built or whose response kind does not
    /// fit the call; nothing may have been sent
    pub fn reject_request(&self, err: ClassifiedError, inline: bool) -> ClassifiedError {
        self.raise(err, inline)
    }

    /// A successful response whose payload the caller cannot use
    pub fn reject_payload(&self, err: ClassifiedError, inline: bool) -> ClassifiedError {
        self.raise(err, inline)
    }

    fn raise(&self, err: ClassifiedError, inline: bool) -> ClassifiedError {
        let kind = err.kind();
        tracing::debug!(
            target: "scholar::transport",
            kind = %kind,
            status = ?err.status(),
            error_code = ?err.error_code(),
            reason = err.message(),
            "Request failed"
        );

        if kind == ErrorKind::Unauthorized {
            if let Err(e) = self.auth.clear() {
                tracing::warn!(target: "scholar::session", error = %e, "Failed to clear auth storage");
            }
        }

        if inline && !kind.always_global() {
            tracing::debug!(target: "scholar::transport", kind = %kind, "Error left to caller for inline display");
        } else {
            self.notifier.notify(Notice::error(err.message()));
        }

        if kind == ErrorKind::Unauthorized {
            self.navigator.navigate(&self.login_route);
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingNavigator, RecordingNotifier};
    use scholar_security::MemoryStorage;
    use serde_json::json;

    struct Fixture {
        classifier: ErrorClassifier,
        auth: AuthStore,
        notifier: Arc<RecordingNotifier>,
        navigator: Arc<RecordingNavigator>,
    }

    fn fixture() -> Fixture {
        let auth = AuthStore::new(Arc::new(MemoryStorage::new()));
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let classifier =
            ErrorClassifier::new(auth.clone(), notifier.clone(), navigator.clone(), "/login");
        Fixture {
            classifier,
            auth,
            notifier,
            navigator,
        }
    }

    #[test]
    fn test_status_uses_body_message() {
        let f = fixture();
        let err = f
            .classifier
            .classify_status(400, br#"{"message":"bad date","errorCode":"D1"}"#, false);
        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert_eq!(err.message(), "bad date");
        assert_eq!(err.error_code(), Some("D1"));
        assert_eq!(f.notifier.messages(), vec!["bad date".to_string()]);
    }

    #[test]
    fn test_status_default_message() {
        let f = fixture();
        let err = f.classifier.classify_status(403, b"", false);
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.message(), ErrorKind::Forbidden.default_message());
    }

    #[test]
    fn test_unauthorized_clears_auth_and_navigates() {
        let f = fixture();
        f.auth.set_token("t").unwrap();

        let err = f.classifier.classify_status(401, b"{}", true);
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(f.auth.token().is_none());
        assert_eq!(f.navigator.routes(), vec!["/login".to_string()]);
        // inline does not suppress the global path for Unauthorized
        assert_eq!(f.notifier.count(), 1);
    }

    #[test]
    fn test_inline_suppresses_notification() {
        let f = fixture();
        let failure = WireFailure::Flagged {
            message: "quota exceeded".into(),
            error_code: Some("Q1".into()),
            body: json!({"success": false}),
        };
        let err = f.classifier.classify_wire(failure, true);
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(f.notifier.count(), 0);
        assert!(f.navigator.routes().is_empty());
    }

    #[test]
    fn test_coded_401_redirects() {
        let f = fixture();
        let failure = WireFailure::Coded {
            code: Some(401),
            message: "expired".into(),
            body: json!({"code": 401}),
        };
        let err = f.classifier.classify_wire(failure, false);
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(f.navigator.routes(), vec!["/login".to_string()]);
    }

    #[test]
    fn test_transport_failure_is_network_error() {
        let f = fixture();
        let err = f
            .classifier
            .classify_transport(&TransportFailure("connection refused".into()));
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert!(matches!(err.cause(), ErrorCause::Transport(m) if m == "connection refused"));
        assert_eq!(f.notifier.count(), 1);
    }
}
