//! Types shared by several operations.
//!
//! Structs use `PascalCase` field names and enums `SCREAMING_SNAKE_CASE`
//! strings, as on the wire.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which row image a write returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnValue {
    /// Nothing.
    #[default]
    None,
    /// The row as it was before the write.
    AllOld,
    /// The row as it is after the write.
    AllNew,
}

/// Whether a call reports consumed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnConsumedCapacity {
    /// Report the total for the call.
    Total,
    /// Report nothing.
    #[default]
    None,
}

impl ReturnConsumedCapacity {
    /// Returns `true` unless reporting is off.
    #[must_use]
    pub fn should_report(&self) -> bool {
        *self != Self::None
    }
}

/// What a `Query` or `Scan` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Select {
    /// Whole rows.
    #[default]
    AllAttributes,
    /// Only the number of matching rows.
    Count,
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// Capacity reported for one table when `ReturnConsumedCapacity` is `TOTAL`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConsumedCapacity {
    /// The name of the table that was affected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// The total capacity units consumed by the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_units: Option<f64>,
}

impl ConsumedCapacity {
    /// Capacity consumed against a single table.
    #[must_use]
    pub fn for_table(table_name: impl Into<String>, units: f64) -> Self {
        Self {
            table_name: Some(table_name.into()),
            capacity_units: Some(units),
        }
    }
}

/// One entry of a `BatchWriteItem` call; exactly one field is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WriteRequest {
    /// A request to put an item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put_request: Option<PutRequest>,
    /// A request to delete an item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_request: Option<DeleteRequest>,
}

impl WriteRequest {
    /// A batch entry deleting `key`.
    #[must_use]
    pub fn delete(key: Key) -> Self {
        Self {
            put_request: None,
            delete_request: Some(DeleteRequest { key }),
        }
    }
}

/// Batch entry body for a put.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutRequest {
    /// The item attributes to put.
    pub item: Item,
}

/// Batch entry body for a delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteRequest {
    /// The primary key of the item to delete.
    pub key: Key,
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

/// A row on the wire.
pub type Item = HashMap<String, AttributeValue>;

/// The key attributes of a row.
pub type Key = HashMap<String, AttributeValue>;

/// Bind variables of an expression, keyed with their leading `:`.
pub type ExpressionAttributeValues = HashMap<String, AttributeValue>;
