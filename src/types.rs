//! Public types for the scholar client.
//!
//! This module re-exports types from the internal crates with one flat
//! interface.

// ============================================================================
// Request and response model
// ============================================================================

pub use scholar_core::{
    AuthScheme, EntityId, Envelope, FormPayload, Method, QueryValue, RequestDescriptor,
    ResponseKind,
};

// Response normalization
pub use scholar_wire::{decode_body, normalize, LegacyShape, WireFailure};

// Errors
pub use scholar_core::{ClassifiedError, ErrorCause, ErrorKind};
pub use scholar_api::SessionError;
pub use scholar_security::StorageError;
pub use scholar_transport::ConfigError;

// ============================================================================
// Auth state
// ============================================================================

pub use scholar_security::{
    AuthStore, FileStorage, MemoryStorage, SessionStorage, UserInfo, UserRole, UserStatus,
};

// ============================================================================
// Transport seams
// ============================================================================

pub use scholar_transport::{
    ClientConfig, HttpBackend, Navigator, Notice, NoticeLevel, Notifier, RawResponse,
};

// ============================================================================
// Domain records
// ============================================================================

pub use scholar_api::{
    BookExam, BookExperiment, ExamBooking, Experiment, ExperimentBooking, LoginGrant,
    Notification, Registration, TimeSlot,
};
