//! Transport adapter and error classifier for the scholar client.
//!
//! - [`ApiClient`]: sends a request descriptor and resolves it to one
//!   canonical envelope or one classified error
//! - [`ErrorClassifier`]: the single place raw failures become
//!   [`scholar_core::ClassifiedError`]s and raise notifications or login redirects
//! - [`HttpBackend`]: the network seam ([`ReqwestBackend`] in production)
//! - [`ClientConfig`]: base URL, login route, storage path and timeout

#![warn(missing_docs)]

pub mod backend;
pub mod classify;
pub mod client;
pub mod config;
pub mod effects;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::{
    HttpBackend, PreparedBody, PreparedRequest, RawResponse, ReqwestBackend, TransportFailure,
};
pub use classify::ErrorClassifier;
pub use client::{ApiClient, ApiResponse};
pub use config::{ClientConfig, ConfigError, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_LOGIN_ROUTE};
pub use effects::{LoggingNavigator, Navigator, Notice, NoticeLevel, Notifier, TracingNotifier};
