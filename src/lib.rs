//! # scholar
//!
//! Blocking API client and session-scoped cache for the scholar education
//! platform.
//!
//! ```no_run
//! use scholar::{ClientConfig, Session};
//!
//! let session = Session::open(ClientConfig::load(None)?)?;
//! session.login("ana", "secret")?;
//!
//! let unread = session.notifications().fetch_all(false)?;
//! println!("{} notifications", unread.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crates
//!
//! | Crate | Concern |
//! |-------|---------|
//! | `scholar-core` | request descriptors, envelopes, classified errors |
//! | `scholar-wire` | legacy response shape normalization |
//! | `scholar-security` | persisted token and user record |
//! | `scholar-transport` | HTTP client, error classification, configuration |
//! | `scholar-storage` | cache collections and per-id write slots |
//! | `scholar-api` | endpoints, stores and the [`Session`] |

pub mod types;

pub use types::*;

pub use scholar_api::{
    endpoints, stores, ExamBookingApi, ExamBookingStore, ExperimentApi, ExperimentStore,
    NotificationStore, Session, SessionBuilder, UserApi,
};
pub use scholar_transport::ApiClient;

/// Result type for client calls
pub type Result<T> = std::result::Result<T, ClassifiedError>;
