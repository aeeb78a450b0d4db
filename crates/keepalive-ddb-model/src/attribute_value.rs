//! The wire value: a tagged union with exactly one type key.
//!
//! ```json
//! {"S": "a"}   {"N": "1.5"}   {"B": "aGk="}   {"BOOL": true}
//! {"NULL": true}   {"L": [{"S": "a"}]}   {"M": {"k": {"N": "1"}}}
//! ```
//!
//! Set types (`SS`, `NS`, `BS`) are never produced by the store layer and
//! decode as an unknown type key.

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Type keys accepted on the wire.
const TYPE_KEYS: &[&str] = &["S", "N", "B", "BOOL", "NULL", "L", "M"];

/// A single wire value.
///
/// Numbers travel as decimal strings and are not interpreted here.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number, as its decimal string.
    N(String),
    /// Binary; base64 on the wire.
    B(Bytes),
    /// Boolean.
    Bool(bool),
    /// Null. The service only ever sends `true`.
    Null(bool),
    /// List.
    L(Vec<AttributeValue>),
    /// Map.
    M(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// The wire type key of this value, e.g. `"S"` or `"BOOL"`.
    #[must_use]
    pub fn type_descriptor(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::B(_) => "B",
            Self::Bool(_) => "BOOL",
            Self::Null(_) => "NULL",
            Self::L(_) => "L",
            Self::M(_) => "M",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.type_descriptor();
        match self {
            Self::S(v) | Self::N(v) => write!(f, "{tag}({v})"),
            Self::B(v) => write!(f, "{tag}[{} bytes]", v.len()),
            Self::Bool(v) | Self::Null(v) => write!(f, "{tag}({v})"),
            Self::L(v) => write!(f, "{tag}[{}]", v.len()),
            Self::M(v) => write!(f, "{tag}{{{}}}", v.len()),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = self.type_descriptor();
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::S(v) | Self::N(v) => map.serialize_entry(tag, v)?,
            Self::B(v) => map.serialize_entry(tag, &STANDARD.encode(v))?,
            Self::Bool(v) | Self::Null(v) => map.serialize_entry(tag, v)?,
            Self::L(v) => map.serialize_entry(tag, v)?,
            Self::M(v) => map.serialize_entry(tag, v)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TaggedValueVisitor)
    }
}

struct TaggedValueVisitor;

impl<'de> Visitor<'de> for TaggedValueVisitor {
    type Value = AttributeValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object with exactly one type key")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let tag: String = map
            .next_key()?
            .ok_or_else(|| de::Error::custom("wire value has no type key"))?;
        let value = read_payload(&tag, &mut map)?;
        if let Some(extra) = map.next_key::<String>()? {
            return Err(de::Error::custom(format!(
                "wire value has more than one type key: {tag}, {extra}"
            )));
        }
        Ok(value)
    }
}

fn read_payload<'de, M>(tag: &str, map: &mut M) -> Result<AttributeValue, M::Error>
where
    M: MapAccess<'de>,
{
    Ok(match tag {
        "S" => AttributeValue::S(map.next_value()?),
        "N" => AttributeValue::N(map.next_value()?),
        "B" => {
            let encoded: String = map.next_value()?;
            let raw = STANDARD.decode(encoded).map_err(de::Error::custom)?;
            AttributeValue::B(Bytes::from(raw))
        }
        "BOOL" => AttributeValue::Bool(map.next_value()?),
        "NULL" => AttributeValue::Null(map.next_value()?),
        "L" => AttributeValue::L(map.next_value()?),
        "M" => AttributeValue::M(map.next_value()?),
        other => return Err(de::Error::unknown_field(other, TYPE_KEYS)),
    })
}
