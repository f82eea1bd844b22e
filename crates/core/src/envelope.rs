//! Canonical response envelope
//!
//! Every JSON response, whatever legacy shape the backend used, reaches the
//! caller as an [`Envelope`]. Failures never do: they are turned into
//! [`ClassifiedError`]s at the transport boundary, so an envelope handed to
//! a caller always has `succeeded == true`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifiedError, Result};

/// Canonical response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Whether the backend reported success
    pub succeeded: bool,
    /// Backend message, or `"ok"` when none was given
    pub message: String,
    /// Response payload; `Null` when the backend sent none
    pub payload: serde_json::Value,
    /// Backend error code, when one was reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl Envelope {
    /// Message used when the backend supplies none
    pub const DEFAULT_MESSAGE: &'static str = "ok";

    /// Successful envelope with the given message and payload
    pub fn success(message: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
            payload,
            error_code: None,
        }
    }

    /// Successful envelope wrapping a payload with the default message
    pub fn implicit(payload: serde_json::Value) -> Self {
        Self::success(Self::DEFAULT_MESSAGE, payload)
    }

    /// Envelope synthesized for empty or unparseable bodies
    pub fn no_content() -> Self {
        Self::implicit(serde_json::Value::Null)
    }

    /// Whether a non-null payload is present
    pub fn has_payload(&self) -> bool {
        !self.payload.is_null()
    }

    /// Decode the payload into a typed value
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.payload).map_err(ClassifiedError::decode)
    }

    /// Decode the payload into a typed value, consuming the envelope
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self.payload).map_err(ClassifiedError::decode)
    }

    /// Decode a list payload; a null payload is an empty list
    pub fn into_list<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        if self.payload.is_null() {
            return Ok(Vec::new());
        }
        self.into_payload()
    }
}
