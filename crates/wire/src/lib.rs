//! Response normalization for the scholar client.
//!
//! The backend answers in one of several envelope conventions. This crate
//! decodes a raw body into an explicit [`LegacyShape`] and maps it to the
//! canonical [`scholar_core::Envelope`], or reports a [`WireFailure`] when the
//! body itself says the request failed.

#![warn(missing_docs)]

pub mod normalize;
pub mod shape;

pub use normalize::{decode_body, normalize, WireFailure};
pub use shape::{CodedBody, FlaggedBody, LegacyShape};
