//! Core types for the scholar API client.
//!
//! This crate defines the data model shared by every other layer:
//! - [`RequestDescriptor`]: what a single HTTP call looks like before it is sent
//! - [`Envelope`]: the canonical response shape every call resolves to
//! - [`ClassifiedError`]: the typed failure every rejected call carries
//! - [`EntityId`]: the canonical identifier used at the cache boundary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod envelope;
pub mod error;
pub mod id;
pub mod json;
pub mod request;

pub use envelope::Envelope;
pub use error::{ClassifiedError, ErrorCause, ErrorKind, Result};
pub use id::EntityId;
pub use request::{
    AuthScheme, FormPart, FormPayload, FormValue, Method, QueryValue, RequestBody,
    RequestDescriptor, ResponseKind,
};
