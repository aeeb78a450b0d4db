//! Native values stored in and read back from a table.
//!
//! A [`Record`] is the caller-facing shape of an item: a map from attribute
//! names to [`Value`]s. Records are ordered (`BTreeMap`) so that anything
//! derived from iterating one, such as bind-variable numbering in compiled
//! expressions, is stable across runs.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::CodecError;

/// An item as seen by callers.
pub type Record = BTreeMap<String, Value>;

/// A numeric value.
///
/// The wire format carries numbers as decimal strings without an integer or
/// float distinction; see [`crate::codec`] for how the two are told apart on
/// the way back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
}

impl Number {
    /// Returns the value as `f64`, possibly losing precision for large
    /// integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 string.
    String(String),
    /// Integer or float.
    Number(Number),
    /// Boolean. Never coerced to a number.
    Bool(bool),
    /// Explicit null.
    Null,
    /// Raw bytes.
    Binary(Bytes),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested record.
    Map(Record),
}

impl Value {
    /// Returns the string if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integral `Number`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(Number::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as `f64` if this is any `Number`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns `true` for `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts a JSON value into a `Value`.
    ///
    /// JSON numbers that fit `i64` become integers; everything else numeric
    /// becomes a float.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_json(json: serde_json::Value) -> Result<Self, CodecError> {
        Ok(match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Number(Number::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Number(Number::Float(u as f64))
                } else if let Some(f) = n.as_f64() {
                    Self::Number(Number::Float(f))
                } else {
                    return Err(CodecError::encoding(format!("unrepresentable number {n}")));
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| Ok((k, Self::from_json(v)?)))
                    .collect::<Result<_, CodecError>>()?,
            ),
        })
    }

    /// Converts this value into JSON. Binary data becomes a base64 string.
    #[must_use]
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s),
            Self::Number(Number::Int(i)) => serde_json::Value::from(i),
            Self::Number(Number::Float(f)) => serde_json::Value::from(f),
            Self::Bool(b) => serde_json::Value::Bool(b),
            Self::Null => serde_json::Value::Null,
            Self::Binary(b) => {
                serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(b))
            }
            Self::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Self::into_json).collect())
            }
            Self::Map(record) => serde_json::Value::Object(
                record.into_iter().map(|(k, v)| (k, v.into_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
            Self::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Self::List(items) => write!(f, "[{} items]", items.len()),
            Self::Map(record) => write!(f, "{{{} keys}}", record.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Number(Number::Int(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Number(Number::Int(i64::from(i)))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Number(Number::Int(i64::from(i)))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Number(Number::Float(f))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::Binary(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Map(record)
    }
}

/// Builds a [`Record`] from `(name, value)` pairs.
///
/// ```
/// use keepalive_ddb_client::value::{Value, record};
///
/// let r = record([("id", Value::from("a")), ("n", Value::from(1))]);
/// assert_eq!(r.len(), 2);
/// ```
pub fn record<K, I>(entries: I) -> Record
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Converts any serializable struct into a [`Record`].
///
/// Fails with an encoding error when the value does not serialize to a JSON
/// object.
pub fn to_record<T: Serialize>(value: &T) -> Result<Record, CodecError> {
    let json = serde_json::to_value(value).map_err(|e| CodecError::encoding(e.to_string()))?;
    match Value::from_json(json)? {
        Value::Map(record) => Ok(record),
        other => Err(CodecError::encoding(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Converts a [`Record`] back into a deserializable struct.
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, CodecError> {
    serde_json::from_value(Value::Map(record).into_json())
        .map_err(|e| CodecError::decoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        session_id: String,
        interval_seconds: i64,
        ratio: f64,
        tags: Vec<String>,
    }

    #[test]
    fn test_should_convert_struct_to_record_and_back() {
        let sample = Sample {
            session_id: "s-1".to_owned(),
            interval_seconds: 30,
            ratio: 0.5,
            tags: vec!["a".to_owned()],
        };
        let rec = to_record(&sample).unwrap();
        assert_eq!(rec["sessionId"], Value::from("s-1"));
        assert_eq!(rec["intervalSeconds"], Value::from(30_i64));
        assert_eq!(from_record::<Sample>(rec).unwrap(), sample);
    }

    #[test]
    fn test_should_reject_non_object_as_record() {
        let err = to_record(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, CodecError::Encoding { .. }));
    }

    #[test]
    fn test_should_not_treat_bool_as_number() {
        assert_eq!(Value::from(true).as_i64(), None);
        assert_eq!(Value::from(true).as_bool(), Some(true));
    }

    #[test]
    fn test_should_encode_binary_as_base64_json() {
        let json = Value::Binary(Bytes::from_static(b"hi")).into_json();
        assert_eq!(json, serde_json::json!("aGk="));
    }
}
