//! Conversion between native [`Value`]s and DynamoDB [`AttributeValue`]s.
//!
//! `encode` and `decode` are inverses for every representable record with one
//! documented exception: numbers travel as decimal strings, and a string is
//! decoded as a float only when it contains `.`, `e` or `E`. A float with an
//! integral value (such as `2.0`) is rendered as `2` and therefore comes back
//! as an integer.

use std::collections::HashMap;

use bytes::Bytes;
use keepalive_ddb_model::{AttributeValue, Item};

use crate::value::{Number, Record, Value};

/// Errors raised while converting values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A native value cannot be represented on the wire.
    #[error("encoding error: {reason}")]
    Encoding {
        /// What went wrong.
        reason: String,
    },
    /// A wire value is malformed.
    #[error("decoding error: {reason}")]
    Decoding {
        /// What went wrong.
        reason: String,
    },
}

impl CodecError {
    /// Creates an encoding error.
    #[must_use]
    pub fn encoding(reason: impl Into<String>) -> Self {
        Self::Encoding {
            reason: reason.into(),
        }
    }

    /// Creates a decoding error.
    #[must_use]
    pub fn decoding(reason: impl Into<String>) -> Self {
        Self::Decoding {
            reason: reason.into(),
        }
    }

    fn in_attribute(self, name: &str) -> Self {
        match self {
            Self::Encoding { reason } => Self::encoding(format!("{name}: {reason}")),
            Self::Decoding { reason } => Self::decoding(format!("{name}: {reason}")),
        }
    }
}

/// Encodes a record into a wire item.
pub fn encode(record: &Record) -> Result<Item, CodecError> {
    record
        .iter()
        .map(|(name, value)| {
            encode_value(value)
                .map(|av| (name.clone(), av))
                .map_err(|e| e.in_attribute(name))
        })
        .collect()
}

/// Encodes a single value.
pub fn encode_value(value: &Value) -> Result<AttributeValue, CodecError> {
    Ok(match value {
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Number(n) => AttributeValue::N(encode_number(*n)?),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Null => AttributeValue::Null(true),
        Value::Binary(b) => AttributeValue::B(b.clone()),
        Value::List(items) => AttributeValue::L(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| encode_value(v).map_err(|e| e.in_attribute(&format!("[{i}]"))))
                .collect::<Result<_, _>>()?,
        ),
        Value::Map(record) => AttributeValue::M(encode(record)?),
    })
}

fn encode_number(n: Number) -> Result<String, CodecError> {
    match n {
        Number::Int(i) => Ok(i.to_string()),
        Number::Float(f) if f.is_finite() => Ok(f.to_string()),
        Number::Float(f) => Err(CodecError::encoding(format!(
            "non-finite number {f} cannot be stored"
        ))),
    }
}

/// Decodes a wire item into a record.
pub fn decode(item: &Item) -> Result<Record, CodecError> {
    item.iter()
        .map(|(name, av)| {
            decode_value(av)
                .map(|v| (name.clone(), v))
                .map_err(|e| e.in_attribute(name))
        })
        .collect()
}

/// Decodes a single wire value.
pub fn decode_value(value: &AttributeValue) -> Result<Value, CodecError> {
    Ok(match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(decode_number(n)?),
        AttributeValue::B(b) => Value::Binary(Bytes::clone(b)),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(true) => Value::Null,
        AttributeValue::Null(false) => {
            return Err(CodecError::decoding("NULL must be true"));
        }
        AttributeValue::L(items) => Value::List(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| decode_value(v).map_err(|e| e.in_attribute(&format!("[{i}]"))))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => Value::Map(decode(map)?),
    })
}

fn decode_number(raw: &str) -> Result<Number, CodecError> {
    let invalid = || CodecError::decoding(format!("invalid number {raw:?}"));
    // Out-of-range magnitudes parse as infinity, which encode refuses.
    let finite = |f: f64| f.is_finite().then_some(Number::Float(f));
    if raw.contains(['.', 'e', 'E']) {
        return raw.parse::<f64>().ok().and_then(finite).ok_or_else(invalid);
    }
    match raw.parse::<i64>() {
        Ok(i) => Ok(Number::Int(i)),
        // Integers outside the i64 range still parse as floats.
        Err(_) => {
            let digits = raw.strip_prefix('-').unwrap_or(raw);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                raw.parse::<f64>().ok().and_then(finite).ok_or_else(invalid)
            } else {
                Err(invalid())
            }
        }
    }
}

/// Decodes a JSON item such as `{"id": {"S": "a"}}` into a record.
///
/// Any structural problem, including a value with more than one or an
/// unknown type key, is reported as a decoding error.
pub fn decode_wire_json(json: serde_json::Value) -> Result<Record, CodecError> {
    let item: HashMap<String, AttributeValue> =
        serde_json::from_value(json).map_err(|e| CodecError::decoding(e.to_string()))?;
    decode(&item)
}
