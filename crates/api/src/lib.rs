//! Endpoint wrappers, domain stores and session lifecycle for the scholar
//! client.
//!
//! # Layers
//!
//! - [`endpoints`]: stateless wrappers, one per backend module. Each call is
//!   one request and returns a typed record or a classified error.
//! - [`stores`]: session-scoped caches over those endpoints.
//! - [`Session`]: owns the client and every store; logs in and out.
//!
//! All of them share one [`scholar_transport::ApiClient`], so every failure
//! goes through the same classifier and raises at most one notification.

#![warn(missing_docs)]

pub mod endpoints;
pub mod models;
pub mod session;
pub mod stores;

pub use endpoints::{ExamBookingApi, ExperimentApi, UserApi};
pub use models::{
    BookExam, BookExperiment, ExamBooking, Experiment, ExperimentBooking, LoginGrant,
    Notification, Registration, TimeSlot,
};
pub use session::{Session, SessionBuilder, SessionError, SessionResult};
pub use stores::{ExamBookingStore, ExperimentStore, NotificationStore};
