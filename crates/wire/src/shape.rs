//! Legacy response shapes
//!
//! The backend has gone through several envelope conventions. A raw body is
//! decoded into exactly one [`LegacyShape`] variant before anything else
//! looks at it, checked in this order:
//!
//! | Order | Shape | Detected by |
//! |-------|-------|-------------|
//! | 1 | Flagged | object with a `success` (or `succeeded`) key |
//! | 2 | Coded | object with a `code` key |
//! | 3 | Sequence | top-level array |
//! | 4 | Unknown | anything else |

use scholar_core::json::{scalar_to_string, truthy};

/// `{ success, message, data, errorCode }`
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedBody {
    /// Truthiness of the `success` flag
    pub success: bool,
    /// `message`, if it was a scalar
    pub message: Option<String>,
    /// `data`, `Null` when absent
    pub data: serde_json::Value,
    /// `errorCode`, rendered as a string
    pub error_code: Option<String>,
}

/// `{ code, message, data }`
#[derive(Debug, Clone, PartialEq)]
pub struct CodedBody {
    /// Numeric `code`; `None` when it was not an integer
    pub code: Option<i64>,
    /// `message`, if it was a scalar
    pub message: Option<String>,
    /// `data`, `Null` when absent
    pub data: serde_json::Value,
}

/// A raw response body, decoded by shape
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyShape {
    /// Boolean-flag envelope
    Flagged(FlaggedBody),
    /// Numeric-code envelope
    Coded(CodedBody),
    /// Bare array
    Sequence(Vec<serde_json::Value>),
    /// Unrecognized shape, passed through as the payload
    Unknown(serde_json::Value),
}

impl LegacyShape {
    /// Decode a raw JSON body into its shape
    pub fn decode(raw: serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Object(mut map) => {
                let flag = map.remove("success").or_else(|| map.remove("succeeded"));
                if let Some(flag) = flag {
                    return LegacyShape::Flagged(FlaggedBody {
                        success: truthy(&flag),
                        message: map.get("message").and_then(scalar_to_string),
                        data: map.remove("data").unwrap_or(serde_json::Value::Null),
                        error_code: map.get("errorCode").and_then(scalar_to_string),
                    });
                }
                if let Some(code) = map.remove("code") {
                    return LegacyShape::Coded(CodedBody {
                        code: code.as_i64(),
                        message: map.get("message").and_then(scalar_to_string),
                        data: map.remove("data").unwrap_or(serde_json::Value::Null),
                    });
                }
                LegacyShape::Unknown(serde_json::Value::Object(map))
            }
            serde_json::Value::Array(items) => LegacyShape::Sequence(items),
            other => LegacyShape::Unknown(other),
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            LegacyShape::Flagged(_) => "flagged",
            LegacyShape::Coded(_) => "coded",
            LegacyShape::Sequence(_) => "sequence",
            LegacyShape::Unknown(_) => "unknown",
        }
    }
}
