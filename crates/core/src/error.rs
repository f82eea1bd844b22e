//! Classified errors
//!
//! A [`ClassifiedError`] is created exactly once, at the point where a raw
//! failure is detected (non-2xx status, a failure envelope, a transport
//! failure, or a payload that does not decode). Its [`ErrorKind`] is fixed at
//! construction and never re-derived downstream.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// HTTP 401 or backend code 401
    Unauthorized,
    /// HTTP 403 or backend code 403
    Forbidden,
    /// HTTP 404 or backend code 404
    NotFound,
    /// HTTP 5xx, any other non-2xx status, or an undecodable payload
    ServerError,
    /// No response was received
    NetworkError,
    /// The backend rejected the request at the payload level
    ValidationFailed,
}

impl ErrorKind {
    /// Kind for a non-success HTTP status
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            _ => ErrorKind::ServerError,
        }
    }

    /// Kind for a non-200 code in the legacy numeric envelope
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(401) => ErrorKind::Unauthorized,
            Some(403) => ErrorKind::Forbidden,
            Some(404) => ErrorKind::NotFound,
            Some(c) if c >= 500 => ErrorKind::ServerError,
            _ => ErrorKind::ValidationFailed,
        }
    }

    /// Kinds that always surface through the global notification path
    pub fn always_global(&self) -> bool {
        matches!(self, ErrorKind::Unauthorized | ErrorKind::NetworkError)
    }

    /// User-facing message used when the backend supplies none
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "Unauthorized, please log in again",
            ErrorKind::Forbidden => "Access denied",
            ErrorKind::NotFound => "Requested resource was not found",
            ErrorKind::ServerError => "Internal server error",
            ErrorKind::NetworkError => "Network error, please check your connection",
            ErrorKind::ValidationFailed => "Request failed",
        }
    }

    /// Stable name
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ServerError => "ServerError",
            ErrorKind::NetworkError => "NetworkError",
            ErrorKind::ValidationFailed => "ValidationFailed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the error was derived from
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorCause {
    /// Non-2xx HTTP status, with the parsed body if there was one
    Status {
        /// HTTP status code
        status: u16,
        /// Parsed JSON body, if any
        body: Option<serde_json::Value>,
    },
    /// Failure envelope returned with a success status
    Payload(serde_json::Value),
    /// No response was received
    Transport(String),
    /// A successful payload did not match the expected shape
    Decode(String),
    /// The request could not be built
    Encode(String),
}

/// Typed failure produced at the transport boundary
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct ClassifiedError {
    kind: ErrorKind,
    message: String,
    error_code: Option<String>,
    cause: ErrorCause,
}

impl ClassifiedError {
    /// Create a classified error
    pub fn new(kind: ErrorKind, message: impl Into<String>, cause: ErrorCause) -> Self {
        Self {
            kind,
            message: message.into(),
            error_code: None,
            cause,
        }
    }

    /// Attach the backend error code
    pub fn with_error_code(mut self, code: Option<String>) -> Self {
        self.error_code = code;
        self
    }

    /// Payload that did not match the expected shape
    pub fn decode(err: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::ServerError,
            format!("unexpected response payload: {}", err),
            ErrorCause::Decode(err.to_string()),
        )
    }

    /// Request that could not be built
    pub fn encode(err: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::ValidationFailed,
            format!("invalid request: {}", err),
            ErrorCause::Encode(err.to_string()),
        )
    }

    /// Error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Backend error code, if reported
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    /// Original failure
    pub fn cause(&self) -> &ErrorCause {
        &self.cause
    }

    /// HTTP status, when the error came from one
    pub fn status(&self) -> Option<u16> {
        match &self.cause {
            ErrorCause::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClassifiedError>;
