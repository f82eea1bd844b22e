//! Session lifecycle
//!
//! A [`Session`] owns one [`ApiClient`] and every domain store. It is built
//! explicitly with its collaborators, so two sessions never share cache or
//! auth state unless they are handed the same storage.
//!
//! ```no_run
//! use scholar_api::{Session, SessionBuilder};
//! use scholar_transport::ClientConfig;
//!
//! let config = ClientConfig::load(None)?;
//! let session = SessionBuilder::new(config).open()?;
//! session.login("ana", "secret")?;
//! for experiment in session.experiments().fetch_all(false)? {
//!     println!("{}", experiment.id);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use scholar_core::ClassifiedError;
use scholar_security::{AuthStore, FileStorage, MemoryStorage, SessionStorage, StorageError, UserInfo};
use scholar_transport::{
    ApiClient, ClientConfig, ConfigError, HttpBackend, LoggingNavigator, Navigator, Notice,
    Notifier, ReqwestBackend, TracingNotifier, TransportFailure,
};
use std::sync::Arc;
use thiserror::Error;

use crate::endpoints::{ExamBookingApi, ExperimentApi, UserApi};
use crate::stores::{ExamBookingStore, ExperimentStore, NotificationStore};

/// Session-level failures
#[derive(Debug, Error)]
pub enum SessionError {
    /// A request failed; side effects already ran
    #[error(transparent)]
    Classified(#[from] ClassifiedError),

    /// Persistent storage failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP backend could not be built
    #[error(transparent)]
    Transport(#[from] TransportFailure),
}

/// Session result type
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Assembles a [`Session`]
///
/// Anything not supplied gets the production default: file storage when
/// `storage_path` is configured (memory otherwise), the `reqwest` backend,
/// and tracing-backed notifier and navigator.
pub struct SessionBuilder {
    config: ClientConfig,
    storage: Option<Arc<dyn SessionStorage>>,
    backend: Option<Arc<dyn HttpBackend>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl SessionBuilder {
    /// Start from a configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            storage: None,
            backend: None,
            notifier: None,
            navigator: None,
        }
    }

    /// Use this storage for auth state
    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Use this HTTP backend
    pub fn backend(mut self, backend: Arc<dyn HttpBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Send user notifications here
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Send navigation requests here
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Validate the configuration and build the session
    pub fn open(self) -> SessionResult<Session> {
        self.config.validate()?;

        let storage: Arc<dyn SessionStorage> = match (self.storage, &self.config.storage_path) {
            (Some(storage), _) => storage,
            (None, Some(path)) => Arc::new(FileStorage::open(path)?),
            (None, None) => Arc::new(MemoryStorage::new()),
        };
        let backend: Arc<dyn HttpBackend> = match self.backend {
            Some(backend) => backend,
            None => Arc::new(ReqwestBackend::new(self.config.timeout())?),
        };
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(LoggingNavigator));

        let auth = AuthStore::new(storage);
        let client = Arc::new(ApiClient::new(
            self.config,
            backend,
            auth.clone(),
            Arc::clone(&notifier),
            Arc::clone(&navigator),
        ));

        tracing::info!(
            target: "scholar::session",
            base_url = %client.config().base_url,
            authenticated = auth.is_authenticated(),
            "Session opened"
        );

        Ok(Session {
            users: UserApi::new(Arc::clone(&client)),
            experiments: ExperimentStore::new(ExperimentApi::new(Arc::clone(&client)), auth.clone()),
            exam_bookings: ExamBookingStore::new(
                ExamBookingApi::new(Arc::clone(&client)),
                auth.clone(),
            ),
            notifications: NotificationStore::new(ExamBookingApi::new(Arc::clone(&client))),
            client,
            auth,
            notifier,
            navigator,
        })
    }
}

/// One logged-in (or anonymous) client session
pub struct Session {
    client: Arc<ApiClient>,
    auth: AuthStore,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    users: UserApi,
    experiments: ExperimentStore,
    exam_bookings: ExamBookingStore,
    notifications: NotificationStore,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.client)
            .field("authenticated", &self.auth.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session with every default
    pub fn open(config: ClientConfig) -> SessionResult<Self> {
        SessionBuilder::new(config).open()
    }

    /// Log in and persist the token and user record
    ///
    /// If storage cannot take both, neither is kept and no success notice is
    /// sent.
    pub fn login(&self, username: &str, password: &str) -> SessionResult<UserInfo> {
        let grant = self.users.login(username, password)?;
        if grant.token.is_none() {
            tracing::warn!(
                target: "scholar::session",
                username,
                "Login response carried no token"
            );
        }
        self.auth.sign_in(grant.token.as_deref(), &grant.user)?;
        tracing::info!(target: "scholar::session", username, "Logged in");
        self.notifier.notify(Notice::success("Login successful"));
        Ok(grant.user)
    }

    /// Forget the user
    ///
    /// Persistent auth state is cleared and every store is reset before
    /// navigating to the login route. Store and navigation steps run even if
    /// clearing storage fails; that failure is returned afterwards.
    pub fn logout(&self) -> SessionResult<()> {
        let cleared = self.auth.clear();
        self.reset_stores();
        tracing::info!(target: "scholar::session", "Logged out");
        self.notifier.notify(Notice::success("Logged out"));
        self.navigator.navigate(&self.client.config().login_route);
        cleared.map_err(SessionError::from)
    }

    /// Drop every cached record without touching auth state
    pub fn reset_stores(&self) {
        self.experiments.reset();
        self.exam_bookings.reset();
        self.notifications.reset();
    }

    /// The persisted user record, if any
    pub fn current_user(&self) -> Option<UserInfo> {
        self.auth.current_user()
    }

    /// Whether a token is stored
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Underlying client, for calls no store wraps
    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Persisted auth state
    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    /// User endpoints
    pub fn users(&self) -> &UserApi {
        &self.users
    }

    /// Experiment store
    pub fn experiments(&self) -> &ExperimentStore {
        &self.experiments
    }

    /// Exam booking store
    pub fn exam_bookings(&self) -> &ExamBookingStore {
        &self.exam_bookings
    }

    /// Notification store
    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }
}
