//! Lenient JSON helpers
//!
//! The backend is loose about scalar types: status fields arrive as numbers,
//! numeric strings, or not at all; success flags are sometimes not booleans;
//! error codes are sometimes numbers. These helpers read such values into
//! fixed Rust types.

use serde::{Deserialize, Deserializer};

/// JavaScript-style truthiness of a JSON value
///
/// `false`, `null`, `0`, `NaN` and `""` are falsy; everything else is truthy.
pub fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

/// Integer reading of a JSON value, defaulting to 0
///
/// Numbers are truncated, strings are parsed by their leading integer
/// digits, anything else yields 0.
pub fn int_or_zero(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => leading_int(s).unwrap_or(0),
        _ => 0,
    }
}

/// String rendering of a JSON scalar; `None` for null and containers
pub fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Serde adapter for integer fields the backend may send as strings
///
/// Use with `#[serde(default, deserialize_with = "scholar_core::json::lenient_int")]`.
pub fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(int_or_zero(&value))
}

/// Serde adapter for optional string fields the backend may send as numbers
pub fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
