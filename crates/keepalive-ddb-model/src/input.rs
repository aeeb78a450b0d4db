//! DynamoDB input types for the item-level operations.
//!
//! All input structs use `PascalCase` JSON field naming to match the DynamoDB
//! wire protocol (`awsJson1_0`). Optional fields are omitted when `None`,
//! empty `HashMap`s and `Vec`s are omitted to produce minimal JSON payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;
use crate::types::{
    ExpressionAttributeValues, Item, Key, ReturnConsumedCapacity, ReturnValue,
    Select, WriteRequest,
};

// ---------------------------------------------------------------------------
// Item CRUD
// ---------------------------------------------------------------------------

/// Input for the `GetItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemInput {
    /// The name of the table containing the item.
    pub table_name: String,

    /// The primary key of the item to retrieve.
    pub key: Key,

    /// If `true`, a strongly consistent read is used; otherwise, an eventually
    /// consistent read is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,

    /// Determines the level of detail about provisioned throughput consumption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

/// Input for the `PutItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemInput {
    /// The name of the table to put the item into.
    pub table_name: String,

    /// A map of attribute name to attribute value, representing the item.
    pub item: Item,

    /// A condition that must be satisfied for the put to succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,

    /// Substitution tokens for attribute values in an expression.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,

    /// Determines the attributes to return after the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,

    /// Determines the level of detail about provisioned throughput consumption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

/// Input for the `UpdateItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemInput {
    /// The name of the table containing the item to update.
    pub table_name: String,

    /// The primary key of the item to be updated.
    pub key: Key,

    /// An expression that defines one or more attributes to be updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_expression: Option<String>,

    /// A condition that must be satisfied for the update to succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,

    /// Substitution tokens for attribute values in an expression.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,

    /// Determines the attributes to return after the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,

    /// Determines the level of detail about provisioned throughput consumption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

/// Input for the `DeleteItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemInput {
    /// The name of the table from which to delete the item.
    pub table_name: String,

    /// The primary key of the item to delete.
    pub key: Key,

    /// A condition that must be satisfied for the deletion to succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,

    /// Substitution tokens for attribute values in an expression.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,

    /// Determines the attributes to return after the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,

    /// Determines the level of detail about provisioned throughput consumption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

// ---------------------------------------------------------------------------
// Query & Scan
// ---------------------------------------------------------------------------

/// Input for the `Query` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryInput {
    /// The name of the table to query.
    pub table_name: String,

    /// The condition that specifies the key values for items to be retrieved.
    pub key_condition_expression: String,

    /// Substitution tokens for attribute values in an expression.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,

    /// The attributes to be returned in the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,

    /// If `true`, a strongly consistent read is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
}

/// Input for the `Scan` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanInput {
    /// The name of the table to scan.
    pub table_name: String,

    /// The attributes to be returned in the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,

    /// If `true`, a strongly consistent read is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
}

// ---------------------------------------------------------------------------
// Batch & transactions
// ---------------------------------------------------------------------------

/// Input for the `BatchWriteItem` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchWriteItemInput {
    /// A map of one or more table names to a list of `WriteRequest` objects
    /// (put or delete operations).
    pub request_items: HashMap<String, Vec<WriteRequest>>,

    /// Determines the level of detail about provisioned throughput consumption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

/// A put inside a `TransactWriteItems` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Put {
    /// Target table.
    pub table_name: String,
    /// The item to write.
    pub item: Item,
    /// Condition that must hold for the whole transaction to proceed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Substitution tokens for attribute values in an expression.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,
}

/// An update inside a `TransactWriteItems` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Update {
    /// Target table.
    pub table_name: String,
    /// Primary key of the item to update.
    pub key: Key,
    /// The `SET` expression to apply.
    pub update_expression: String,
    /// Condition that must hold for the whole transaction to proceed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Substitution tokens for attribute values in an expression.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,
}

/// A delete inside a `TransactWriteItems` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Delete {
    /// Target table.
    pub table_name: String,
    /// Primary key of the item to delete.
    pub key: Key,
    /// Condition that must hold for the whole transaction to proceed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Substitution tokens for attribute values in an expression.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: ExpressionAttributeValues,
}

/// One entry of a `TransactWriteItems` request.
///
/// Exactly one of the three members is set; on the wire this is a single-key
/// object such as `{"Put": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactWriteItem {
    /// A put.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Put>,
    /// An update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Update>,
    /// A delete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Delete>,
}

impl TransactWriteItem {
    /// Returns the table this entry targets, if any member is set.
    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.put
            .as_ref()
            .map(|p| p.table_name.as_str())
            .or_else(|| self.update.as_ref().map(|u| u.table_name.as_str()))
            .or_else(|| self.delete.as_ref().map(|d| d.table_name.as_str()))
    }
}

impl From<Put> for TransactWriteItem {
    fn from(put: Put) -> Self {
        Self {
            put: Some(put),
            ..Self::default()
        }
    }
}

impl From<Update> for TransactWriteItem {
    fn from(update: Update) -> Self {
        Self {
            update: Some(update),
            ..Self::default()
        }
    }
}

impl From<Delete> for TransactWriteItem {
    fn from(delete: Delete) -> Self {
        Self {
            delete: Some(delete),
            ..Self::default()
        }
    }
}

/// Input for the `TransactWriteItems` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactWriteItemsInput {
    /// Ordered list of write actions applied atomically.
    pub transact_items: Vec<TransactWriteItem>,

    /// Determines the level of detail about provisioned throughput consumption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

/// Builds a single-entry `ExpressionAttributeValues` map.
#[must_use]
pub fn bind(name: impl Into<String>, value: AttributeValue) -> ExpressionAttributeValues {
    HashMap::from([(name.into(), value)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_omit_empty_expression_values() {
        let input = PutItemInput {
            table_name: "t".to_owned(),
            item: Item::from([("id".to_owned(), AttributeValue::S("a".to_owned()))]),
            ..PutItemInput::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"TableName": "t", "Item": {"id": {"S": "a"}}})
        );
    }

    #[test]
    fn test_should_wrap_transact_items_in_single_key_objects() {
        let input = TransactWriteItemsInput {
            transact_items: vec![
                Put {
                    table_name: "t".to_owned(),
                    ..Put::default()
                }
                .into(),
                Delete {
                    table_name: "t".to_owned(),
                    condition_expression: Some("attribute_exists(id)".to_owned()),
                    ..Delete::default()
                }
                .into(),
            ],
            return_consumed_capacity: None,
        };
        let json = serde_json::to_value(&input).unwrap();
        let items = json["TransactItems"].as_array().unwrap();
        assert!(items[0].get("Put").is_some());
        assert_eq!(items[0].as_object().unwrap().len(), 1);
        assert_eq!(
            items[1]["Delete"]["ConditionExpression"],
            "attribute_exists(id)"
        );
    }

    #[test]
    fn test_should_report_transact_item_table() {
        let item: TransactWriteItem = Update {
            table_name: "sessions".to_owned(),
            ..Update::default()
        }
        .into();
        assert_eq!(item.table_name(), Some("sessions"));
        assert_eq!(TransactWriteItem::default().table_name(), None);
    }
}
