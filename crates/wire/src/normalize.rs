//! Response normalization
//!
//! Maps a decoded [`LegacyShape`] to the canonical [`Envelope`], or to a
//! [`WireFailure`] when the body itself reports failure. The normalizer has
//! no side effects beyond logging: turning a failure into a classified error
//! (and notifying the user) is the transport's classifier's job.

use scholar_core::Envelope;
use thiserror::Error;
use tracing::{debug, warn};

use crate::shape::LegacyShape;

const DEFAULT_FLAGGED_FAILURE: &str = "Request failed";
const DEFAULT_CODED_FAILURE: &str = "Operation failed";

/// A response body that reports failure at the payload level
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireFailure {
    /// `success` was false
    #[error("request failed: {message}")]
    Flagged {
        /// Backend message or a default
        message: String,
        /// Backend `errorCode`
        error_code: Option<String>,
        /// The original body
        body: serde_json::Value,
    },
    /// `code` was not 200
    #[error("request failed with code {code:?}: {message}")]
    Coded {
        /// Backend code, if it was an integer
        code: Option<i64>,
        /// Backend message or a default
        message: String,
        /// The original body
        body: serde_json::Value,
    },
}

impl WireFailure {
    /// Backend message
    pub fn message(&self) -> &str {
        match self {
            WireFailure::Flagged { message, .. } | WireFailure::Coded { message, .. } => message,
        }
    }

    /// The original body
    pub fn body(&self) -> &serde_json::Value {
        match self {
            WireFailure::Flagged { body, .. } | WireFailure::Coded { body, .. } => body,
        }
    }
}

/// Normalize a parsed JSON body
pub fn normalize(raw: serde_json::Value) -> Result<Envelope, WireFailure> {
    // keep a copy only for failures; success paths move the payload out
    let original = raw.clone();
    let shape = LegacyShape::decode(raw);
    debug!(target: "scholar::wire", shape = shape.name(), "Decoded response shape");

    match shape {
        LegacyShape::Flagged(body) => {
            if body.success {
                Ok(Envelope::success(
                    body.message.unwrap_or_else(|| Envelope::DEFAULT_MESSAGE.to_string()),
                    body.data,
                ))
            } else {
                Err(WireFailure::Flagged {
                    message: body
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| DEFAULT_FLAGGED_FAILURE.to_string()),
                    error_code: body.error_code,
                    body: original,
                })
            }
        }
        LegacyShape::Coded(body) => {
            if body.code == Some(200) {
                Ok(Envelope::success(
                    body.message.unwrap_or_else(|| Envelope::DEFAULT_MESSAGE.to_string()),
                    body.data,
                ))
            } else {
                Err(WireFailure::Coded {
                    code: body.code,
                    message: body
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| DEFAULT_CODED_FAILURE.to_string()),
                    body: original,
                })
            }
        }
        LegacyShape::Sequence(items) => Ok(Envelope::implicit(serde_json::Value::Array(items))),
        LegacyShape::Unknown(value) => {
            warn!(
                target: "scholar::wire",
                kind = json_kind(&value),
                "Unrecognized response shape, passing body through as payload"
            );
            Ok(Envelope::implicit(value))
        }
    }
}

/// Parse and normalize a raw response body
///
/// Empty bodies and bodies that are not valid JSON yield
/// [`Envelope::no_content`] instead of failing.
pub fn decode_body(bytes: &[u8]) -> Result<Envelope, WireFailure> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Envelope::no_content());
    }
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => normalize(value),
        Err(e) => {
            debug!(target: "scholar::wire", error = %e, len = bytes.len(), "Body is not JSON, treating as no content");
            Ok(Envelope::no_content())
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
