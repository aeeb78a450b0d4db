//! In-memory row storage for a single table.
//!
//! Rows are stored in a [`BTreeMap`] keyed by a derived key string: the
//! rendered key attributes, escaped and joined with `^`.
//!
//! ```text
//! schema (pk, sk), row {pk: "A", sk: 1}  ->  "A^1"
//! schema (pk),     row {pk: "a^b"}       ->  "a\^b"
//! ```
//!
//! Escaping keeps the derived key unambiguous, so a partition query is a
//! prefix match on `<partition>^`.

use std::collections::BTreeMap;

use base64::Engine;
use keepalive_ddb_model::{AttributeValue, Item};
use thiserror::Error;
use tracing::debug;

const KEY_SEPARATOR: char = '^';
const ESCAPE: char = '\\';

/// Errors raised by table storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A required key attribute was not found in the item.
    #[error("One of the required keys was not given a value: missing {attr}")]
    MissingKeyAttribute {
        /// The name of the missing attribute.
        attr: String,
    },
    /// A key attribute is not a string, number or binary.
    #[error("The key attribute {attr} must be of type S, N or B, got {actual}")]
    InvalidKeyType {
        /// The name of the attribute.
        attr: String,
        /// The actual type descriptor.
        actual: String,
    },
    /// A non-replacing insert found an existing row.
    #[error("row with key {key} already exists")]
    DuplicateKey {
        /// The derived key.
        key: String,
    },
}

/// Key attribute names of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    /// Partition (HASH) key name.
    pub partition_key: String,
    /// Optional sort (RANGE) key name.
    pub sort_key: Option<String>,
}

impl KeySchema {
    /// A schema with only a partition key.
    #[must_use]
    pub fn hash(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: None,
        }
    }

    /// A schema with a partition and a sort key.
    #[must_use]
    pub fn composite(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: Some(sort_key.into()),
        }
    }

    /// Returns `true` if `name` is one of the key attributes.
    #[must_use]
    pub fn is_key_attribute(&self, name: &str) -> bool {
        self.partition_key == name || self.sort_key.as_deref() == Some(name)
    }

    /// Key attribute names, partition key first.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.partition_key.as_str()).chain(self.sort_key.as_deref())
    }

    /// Derives the storage key of `item` (which may be a bare key).
    pub fn derive_key(&self, item: &Item) -> Result<String, StorageError> {
        let parts = self
            .attributes()
            .map(|attr| {
                let value = item
                    .get(attr)
                    .ok_or_else(|| StorageError::MissingKeyAttribute {
                        attr: attr.to_owned(),
                    })?;
                render_key_part(attr, value)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(&KEY_SEPARATOR.to_string()))
    }

    /// Extracts only the key attributes of `item`.
    pub fn key_of(&self, item: &Item) -> Result<Item, StorageError> {
        self.attributes()
            .map(|attr| {
                item.get(attr)
                    .map(|v| (attr.to_owned(), v.clone()))
                    .ok_or_else(|| StorageError::MissingKeyAttribute {
                        attr: attr.to_owned(),
                    })
            })
            .collect()
    }
}

/// Renders one key attribute for the derived key.
pub fn render_key_part(attr: &str, value: &AttributeValue) -> Result<String, StorageError> {
    let raw = match value {
        AttributeValue::S(s) => s.clone(),
        AttributeValue::N(n) => n.clone(),
        AttributeValue::B(b) => base64::engine::general_purpose::STANDARD.encode(b),
        other => {
            return Err(StorageError::InvalidKeyType {
                attr: attr.to_owned(),
                actual: other.type_descriptor().to_owned(),
            });
        }
    };
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == ESCAPE || c == KEY_SEPARATOR {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    Ok(escaped)
}

/// Rows of one table.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: KeySchema,
    rows: BTreeMap<String, Item>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: KeySchema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: BTreeMap::new(),
        }
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key schema.
    #[must_use]
    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stores `row`. Without `replace`, an existing row with the same key is
    /// a [`StorageError::DuplicateKey`]. Returns the replaced row.
    pub fn add(&mut self, row: Item, replace: bool) -> Result<Option<Item>, StorageError> {
        let key = self.schema.derive_key(&row)?;
        if !replace && self.rows.contains_key(&key) {
            return Err(StorageError::DuplicateKey { key });
        }
        debug!(table = %self.name, key, "storing row");
        Ok(self.rows.insert(key, row))
    }

    /// Returns the row stored under `key`.
    pub fn get(&self, key: &Item) -> Result<Option<&Item>, StorageError> {
        let key = self.schema.derive_key(key)?;
        Ok(self.rows.get(&key))
    }

    /// Removes and returns the row stored under `key`.
    pub fn remove(&mut self, key: &Item) -> Result<Option<Item>, StorageError> {
        let key = self.schema.derive_key(key)?;
        let removed = self.rows.remove(&key);
        if removed.is_some() {
            debug!(table = %self.name, key, "removed row");
        }
        Ok(removed)
    }

    /// Copies of every row whose partition key renders as `partition`.
    pub fn query(&self, partition: &AttributeValue) -> Result<Vec<Item>, StorageError> {
        let rendered = render_key_part(&self.schema.partition_key, partition)?;
        let prefix = format!("{rendered}{KEY_SEPARATOR}");
        Ok(self
            .rows
            .range(rendered.clone()..)
            .take_while(|(key, _)| key.starts_with(&rendered))
            .filter(|(key, _)| **key == rendered || key.starts_with(&prefix))
            .map(|(_, row)| row.clone())
            .collect())
    }

    /// Copies of every row, in derived-key order.
    #[must_use]
    pub fn scan(&self) -> Vec<Item> {
        self.rows.values().cloned().collect()
    }
}
