//! Typed write requests and their compilation into wire inputs.
//!
//! The same request types are used for single-item calls and as the entries
//! of a transaction; each one compiles independently.

use keepalive_ddb_model::input::{
    Delete, DeleteItemInput, Put, PutItemInput, TransactWriteItem, Update, UpdateItemInput,
};
use keepalive_ddb_model::types::{ReturnConsumedCapacity, ReturnValue};

use crate::codec;
use crate::expression::{self, Condition, ExpressionError, KeyGuard};
use crate::value::{Record, Value};

/// How a put treats an existing row.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PutGuard {
    /// Replace any existing row.
    #[default]
    Overwrite,
    /// Fail if a row with these key attributes already exists.
    CreateOnly(Vec<String>),
    /// Fail unless the condition holds.
    Condition(Condition),
}

/// A put of a whole item.
#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    /// Target table.
    pub table: String,
    /// The full item, key attributes included.
    pub item: Record,
    /// Existing-row behavior.
    pub guard: PutGuard,
}

impl PutRequest {
    /// An unconditional put.
    #[must_use]
    pub fn new(table: impl Into<String>, item: Record) -> Self {
        Self {
            table: table.into(),
            item,
            guard: PutGuard::Overwrite,
        }
    }

    /// Only create the row; an existing row with the same key is a
    /// primary-key violation.
    ///
    /// # Panics
    ///
    /// Panics if a condition was already set. The two forms are exclusive.
    #[must_use]
    pub fn create_only<I, S>(mut self, key_attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        assert!(
            !matches!(self.guard, PutGuard::Condition(_)),
            "a put cannot combine key_attributes with an explicit condition"
        );
        self.guard = PutGuard::CreateOnly(key_attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Only write when `condition` holds.
    ///
    /// # Panics
    ///
    /// Panics if key attributes were already set. The two forms are exclusive.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        assert!(
            !matches!(self.guard, PutGuard::CreateOnly(_)),
            "a put cannot combine key_attributes with an explicit condition"
        );
        self.guard = PutGuard::Condition(condition);
        self
    }

    /// Returns `true` for create-only puts.
    #[must_use]
    pub fn is_create_only(&self) -> bool {
        matches!(self.guard, PutGuard::CreateOnly(_))
    }

    fn compile(&self) -> Result<Put, ExpressionError> {
        let compiled = match &self.guard {
            PutGuard::Overwrite => expression::compile_condition(None, KeyGuard::None)?,
            PutGuard::CreateOnly(keys) => {
                expression::compile_condition(None, KeyGuard::NotExists(keys))?
            }
            PutGuard::Condition(condition) => {
                expression::compile_condition(Some(condition), KeyGuard::None)?
            }
        };
        Ok(Put {
            table_name: self.table.clone(),
            item: codec::encode(&self.item)?,
            condition_expression: compiled.expression,
            expression_attribute_values: compiled.values,
        })
    }

    /// Compiles into a `PutItem` input.
    pub fn to_input(&self) -> Result<PutItemInput, ExpressionError> {
        let put = self.compile()?;
        Ok(PutItemInput {
            table_name: put.table_name,
            item: put.item,
            condition_expression: put.condition_expression,
            expression_attribute_values: put.expression_attribute_values,
            return_values: None,
            return_consumed_capacity: Some(ReturnConsumedCapacity::Total),
        })
    }
}

/// An update of selected attributes on an existing row.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    /// Target table.
    pub table: String,
    /// Primary key of the row.
    pub key: Record,
    /// Attributes to set. Key attributes are ignored.
    pub item: Record,
    /// Optional caller condition, combined with the existence guard.
    pub condition: Option<Condition>,
}

impl UpdateRequest {
    /// An update guarded only by row existence.
    #[must_use]
    pub fn new(table: impl Into<String>, key: Record, item: Record) -> Self {
        Self {
            table: table.into(),
            key,
            item,
            condition: None,
        }
    }

    /// Adds a caller condition.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    fn compile(&self) -> Result<Update, ExpressionError> {
        let compiled = expression::compile_update(&self.key, &self.item, self.condition.as_ref())?;
        Ok(Update {
            table_name: self.table.clone(),
            key: codec::encode(&self.key)?,
            update_expression: compiled.update_expression,
            condition_expression: compiled.condition_expression,
            expression_attribute_values: compiled.values,
        })
    }

    /// Compiles into an `UpdateItem` input.
    pub fn to_input(&self) -> Result<UpdateItemInput, ExpressionError> {
        let update = self.compile()?;
        Ok(UpdateItemInput {
            table_name: update.table_name,
            key: update.key,
            update_expression: Some(update.update_expression),
            condition_expression: update.condition_expression,
            expression_attribute_values: update.expression_attribute_values,
            return_values: None,
            return_consumed_capacity: Some(ReturnConsumedCapacity::Total),
        })
    }
}

/// A delete of an existing row.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    /// Target table.
    pub table: String,
    /// Primary key of the row.
    pub key: Record,
    /// Optional caller condition, combined with the existence guard.
    pub condition: Option<Condition>,
}

impl DeleteRequest {
    /// A delete guarded only by row existence.
    #[must_use]
    pub fn new(table: impl Into<String>, key: Record) -> Self {
        Self {
            table: table.into(),
            key,
            condition: None,
        }
    }

    /// Adds a caller condition.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    fn compile(&self) -> Result<Delete, ExpressionError> {
        let key_names: Vec<String> = self.key.keys().cloned().collect();
        let compiled =
            expression::compile_condition(self.condition.as_ref(), KeyGuard::Exists(&key_names))?;
        Ok(Delete {
            table_name: self.table.clone(),
            key: codec::encode(&self.key)?,
            condition_expression: compiled.expression,
            expression_attribute_values: compiled.values,
        })
    }

    /// Compiles into a `DeleteItem` input that returns the old row.
    pub fn to_input(&self) -> Result<DeleteItemInput, ExpressionError> {
        let delete = self.compile()?;
        Ok(DeleteItemInput {
            table_name: delete.table_name,
            key: delete.key,
            condition_expression: delete.condition_expression,
            expression_attribute_values: delete.expression_attribute_values,
            return_values: Some(ReturnValue::AllOld),
            return_consumed_capacity: Some(ReturnConsumedCapacity::Total),
        })
    }
}

/// One entry of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactItem {
    /// A put.
    Put(PutRequest),
    /// An update.
    Update(UpdateRequest),
    /// A delete.
    Delete(DeleteRequest),
}

impl TransactItem {
    /// Returns the target table.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Put(r) => &r.table,
            Self::Update(r) => &r.table,
            Self::Delete(r) => &r.table,
        }
    }

    /// Compiles into a tagged transaction entry.
    pub fn to_input(&self) -> Result<TransactWriteItem, ExpressionError> {
        Ok(match self {
            Self::Put(r) => r.compile()?.into(),
            Self::Update(r) => r.compile()?.into(),
            Self::Delete(r) => r.compile()?.into(),
        })
    }
}

impl From<PutRequest> for TransactItem {
    fn from(r: PutRequest) -> Self {
        Self::Put(r)
    }
}

impl From<UpdateRequest> for TransactItem {
    fn from(r: UpdateRequest) -> Self {
        Self::Update(r)
    }
}

impl From<DeleteRequest> for TransactItem {
    fn from(r: DeleteRequest) -> Self {
        Self::Delete(r)
    }
}

/// Builds the key record of a single-attribute key.
#[must_use]
pub fn key(name: impl Into<String>, value: impl Into<Value>) -> Record {
    Record::from([(name.into(), value.into())])
}
