//! Test doubles
//!
//! A scripted [`HttpBackend`] and recording side-effect sinks, enabled for
//! this crate's tests and for downstream crates through the `testing`
//! feature.

use parking_lot::Mutex;
use scholar_security::{AuthStore, MemoryStorage};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::backend::{HttpBackend, PreparedRequest, RawResponse, TransportFailure};
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::effects::{Navigator, Notice, Notifier};

/// Backend that replays queued responses and records every request
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<RawResponse, TransportFailure>>>,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedBackend {
    /// Empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        let bytes = serde_json::to_vec(&body).unwrap_or_default();
        self.push_raw(RawResponse::new(status, bytes));
    }

    /// Queue a raw response
    pub fn push_raw(&self, response: RawResponse) {
        self.responses.lock().push_back(Ok(response));
    }

    /// Queue a transport failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .push_back(Err(TransportFailure(message.into())));
    }

    /// Every request executed so far
    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests executed so far
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Last request executed
    pub fn last_request(&self) -> Option<PreparedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Responses still queued
    pub fn pending(&self) -> usize {
        self.responses.lock().len()
    }
}

impl HttpBackend for ScriptedBackend {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportFailure> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure("no scripted response".to_string())))
    }
}

/// Notifier that records every notice
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Every notice so far
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Messages of every notice so far
    pub fn messages(&self) -> Vec<String> {
        self.notices.lock().iter().map(|n| n.message.clone()).collect()
    }

    /// Number of notices so far
    pub fn count(&self) -> usize {
        self.notices.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Navigator that records every route
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Every route so far
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().push(route.to_string());
    }
}

/// A client wired to scripted and recording doubles
pub struct TestHarness {
    /// Client under test
    pub client: Arc<ApiClient>,
    /// Scripted backend
    pub backend: Arc<ScriptedBackend>,
    /// Auth state over in-memory storage
    pub auth: AuthStore,
    /// Recorded notifications
    pub notifier: Arc<RecordingNotifier>,
    /// Recorded navigation
    pub navigator: Arc<RecordingNavigator>,
}

impl TestHarness {
    /// Harness with the default configuration
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Harness with a custom configuration
    pub fn with_config(config: ClientConfig) -> Self {
        let backend = Arc::new(ScriptedBackend::new());
        let auth = AuthStore::new(Arc::new(MemoryStorage::new()));
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let client = Arc::new(ApiClient::new(
            config,
            backend.clone(),
            auth.clone(),
            notifier.clone(),
            navigator.clone(),
        ));
        Self {
            client,
            backend,
            auth,
            notifier,
            navigator,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
