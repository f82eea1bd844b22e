//! Shared fixtures

use scholar::{ClientConfig, MemoryStorage, Session, SessionBuilder};
use scholar_transport::testing::{RecordingNavigator, RecordingNotifier, ScriptedBackend};
use std::sync::Arc;

/// A session wired to scripted and recording doubles
pub struct Fixture {
    pub session: Session,
    pub backend: Arc<ScriptedBackend>,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::new())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let backend = Arc::new(ScriptedBackend::new());
        let storage = Arc::new(MemoryStorage::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let session = SessionBuilder::new(config)
            .storage(storage.clone())
            .backend(backend.clone())
            .notifier(notifier.clone())
            .navigator(navigator.clone())
            .open()
            .expect("fixture session opens");
        Self {
            session,
            backend,
            storage,
            notifier,
            navigator,
        }
    }

    /// Store a token as if a login had happened
    pub fn logged_in(self) -> Self {
        self.session
            .auth()
            .set_token("tok-1")
            .expect("token stored");
        self
    }
}
