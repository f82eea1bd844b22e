//! Canonical entity identifiers
//!
//! The backend returns identifiers as JSON numbers on some endpoints and as
//! strings on others. Every identifier is normalized to one string form when
//! it crosses into the client, so `42` and `"42"` compare equal without any
//! loose comparison.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a cached entity record
///
/// Stored as a trimmed string. Serializes back as a JSON number when the
/// string is a canonical integer, so numeric ids round-trip to the backend
/// in the representation it expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    /// Create an identifier from any string-like value
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.len() == raw.len() {
            EntityId(raw)
        } else {
            EntityId(trimmed.to_string())
        }
    }

    /// Borrow the canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier as a signed integer, if it is a canonical one
    ///
    /// `"42"` yields `Some(42)`; `"042"` and `"abc"` yield `None`.
    pub fn as_i64(&self) -> Option<i64> {
        self.0
            .parse::<i64>()
            .ok()
            .filter(|n| n.to_string() == self.0)
    }

    /// Render the identifier the way the backend expects it in a JSON body
    pub fn to_json(&self) -> serde_json::Value {
        match self.as_i64() {
            Some(n) => serde_json::Value::from(n),
            None => serde_json::Value::String(self.0.clone()),
        }
    }

    /// Extract an identifier from a JSON scalar
    ///
    /// Integral numbers and non-empty strings are accepted; anything else
    /// (null, booleans, fractional numbers, containers) is rejected.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(EntityId::from(i))
                } else if let Some(u) = n.as_u64() {
                    Some(EntityId::from(u))
                } else {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.is_finite())
                        .map(|f| EntityId(format!("{}", f as i64)))
                }
            }
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(EntityId::new(s.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(v: &str) -> Self {
        EntityId::new(v)
    }
}

impl From<String> for EntityId {
    fn from(v: String) -> Self {
        EntityId::new(v)
    }
}

impl From<&EntityId> for EntityId {
    fn from(v: &EntityId) -> Self {
        v.clone()
    }
}

impl From<i64> for EntityId {
    fn from(v: i64) -> Self {
        EntityId(v.to_string())
    }
}

impl From<i32> for EntityId {
    fn from(v: i32) -> Self {
        EntityId(v.to_string())
    }
}

impl From<u64> for EntityId {
    fn from(v: u64) -> Self {
        EntityId(v.to_string())
    }
}

impl From<u32> for EntityId {
    fn from(v: u32) -> Self {
        EntityId(v.to_string())
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_i64() {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

struct EntityIdVisitor;

impl<'de> Visitor<'de> for EntityIdVisitor {
    type Value = EntityId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or string identifier")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntityId, E> {
        Ok(EntityId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntityId, E> {
        Ok(EntityId::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<EntityId, E> {
        if v.is_finite() && v.fract() == 0.0 {
            Ok(EntityId(format!("{}", v as i64)))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<EntityId, E> {
        if v.trim().is_empty() {
            return Err(E::invalid_value(de::Unexpected::Str(v), &self));
        }
        Ok(EntityId::new(v))
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EntityIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_string_forms_are_equal() {
        assert_eq!(EntityId::from(42i64), EntityId::from("42"));
        assert_eq!(EntityId::from(42u32), EntityId::new(" 42 "));
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: EntityId = serde_json::from_value(json!(7)).unwrap();
        let b: EntityId = serde_json::from_value(json!("7")).unwrap();
        let c: EntityId = serde_json::from_value(json!(7.0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_deserialize_rejects_non_identifiers() {
        assert!(serde_json::from_value::<EntityId>(json!(null)).is_err());
        assert!(serde_json::from_value::<EntityId>(json!(1.5)).is_err());
        assert!(serde_json::from_value::<EntityId>(json!("  ")).is_err());
        assert!(serde_json::from_value::<EntityId>(json!([1])).is_err());
    }

    #[test]
    fn test_serialize_keeps_numeric_ids_numeric() {
        assert_eq!(serde_json::to_value(EntityId::from("42")).unwrap(), json!(42));
        assert_eq!(serde_json::to_value(EntityId::from("042")).unwrap(), json!("042"));
        assert_eq!(
            serde_json::to_value(EntityId::from("BK-001")).unwrap(),
            json!("BK-001")
        );
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(EntityId::from_json(&json!(3)), Some(EntityId::from(3i64)));
        assert_eq!(EntityId::from_json(&json!("x1")), Some(EntityId::from("x1")));
        assert_eq!(EntityId::from_json(&json!(true)), None);
        assert_eq!(EntityId::from_json(&json!("")), None);
    }

    #[test]
    fn test_as_i64_requires_canonical_form() {
        assert_eq!(EntityId::from("-5").as_i64(), Some(-5));
        assert_eq!(EntityId::from("007").as_i64(), None);
        assert_eq!(EntityId::from("abc").as_i64(), None);
    }
}
