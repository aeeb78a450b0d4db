//! In-memory store implementing the client's [`Transport`].
//!
//! Every write takes the table-map write lock for its whole
//! check-then-apply sequence, so a condition is always evaluated against the
//! state the write lands on. A transaction holds the lock across all of its
//! items and restores a snapshot of the affected tables if any item fails.

use std::collections::{BTreeMap, HashMap};

use keepalive_ddb_client::transport::{Transport, TransportError};
use keepalive_ddb_model::input::{
    BatchWriteItemInput, DeleteItemInput, GetItemInput, PutItemInput, QueryInput, ScanInput,
    TransactWriteItem, TransactWriteItemsInput, UpdateItemInput,
};
use keepalive_ddb_model::output::{
    BatchWriteItemOutput, DeleteItemOutput, GetItemOutput, PutItemOutput, QueryOutput, ScanOutput,
    TransactWriteItemsOutput, UpdateItemOutput,
};
use keepalive_ddb_model::types::{
    ConsumedCapacity, ExpressionAttributeValues, ReturnConsumedCapacity, ReturnValue, Select,
};
use keepalive_ddb_model::{CancellationReason, ErrorCode, Item, Key, ServiceError};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{expression_error_to_service, storage_error_to_service};
use crate::expression::{
    Assignment, Predicate, accepts_all, apply_assignments, parse_condition, parse_update,
};
use crate::storage::{KeySchema, Table};

/// Most items accepted by one transaction.
const MAX_TRANSACTION_ITEMS: usize = 100;

/// Capacity units reported per written item.
const WRITE_UNITS_PER_ITEM: f64 = 1.0;

type Tables = HashMap<String, Table>;

type WriteHook = Box<dyn FnOnce(&MockStore) + Send>;

/// In-memory DynamoDB stand-in.
#[derive(Default)]
pub struct MockStore {
    tables: RwLock<Tables>,
    hooks: Mutex<HashMap<String, WriteHook>>,
}

impl std::fmt::Debug for MockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("MockStore")
            .field("tables", &names)
            .field("pending_hooks", &self.hooks.lock().len())
            .finish()
    }
}

impl MockStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a one-shot hook run just before the next update or delete
    /// on `table`. The hook may write to the store.
    pub fn on_next_write(
        &self,
        table: impl Into<String>,
        hook: impl FnOnce(&MockStore) + Send + 'static,
    ) {
        self.hooks.lock().insert(table.into(), Box::new(hook));
    }

    fn run_hook(&self, table: &str) {
        let hook = self.hooks.lock().remove(table);
        if let Some(hook) = hook {
            debug!(table, "running write hook");
            hook(self);
        }
    }

    /// Number of rows in `table`, if it exists.
    #[must_use]
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.tables.read().get(table).map(Table::len)
    }
}

// ---------------------------------------------------------------------------
// Table management
// ---------------------------------------------------------------------------

impl MockStore {
    /// Creates a table. Fails with `ResourceInUseException` if it exists.
    pub fn create_table(
        &self,
        name: impl Into<String>,
        schema: KeySchema,
    ) -> Result<(), ServiceError> {
        let name = name.into();
        let mut tables = self.tables.write();
        if tables.contains_key(&name) {
            return Err(ServiceError::resource_in_use(format!(
                "Table already exists: {name}"
            )));
        }
        debug!(table = %name, ?schema, "created table");
        tables.insert(name.clone(), Table::new(name, schema));
        Ok(())
    }

    /// Inserts fixture rows. A row whose key already exists is a
    /// `ConditionalCheckFailedException`.
    pub fn load(
        &self,
        table: &str,
        rows: impl IntoIterator<Item = Item>,
    ) -> Result<(), ServiceError> {
        let mut tables = self.tables.write();
        let table = require_table(&mut tables, table)?;
        for row in rows {
            table.add(row, false).map_err(storage_error_to_service)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Item operations
// ---------------------------------------------------------------------------

impl MockStore {
    /// Handle `GetItem`. Returns a copy of the stored row.
    pub fn handle_get_item(&self, input: &GetItemInput) -> Result<GetItemOutput, ServiceError> {
        let tables = self.tables.read();
        let table = tables
            .get(&input.table_name)
            .ok_or_else(|| not_found(&input.table_name))?;
        let item = table
            .get(&input.key)
            .map_err(storage_error_to_service)?
            .cloned();
        Ok(GetItemOutput {
            item,
            consumed_capacity: None,
        })
    }

    /// Handle `PutItem`.
    pub fn handle_put_item(&self, input: &PutItemInput) -> Result<PutItemOutput, ServiceError> {
        let predicates = condition_predicates(
            input.condition_expression.as_deref(),
            &input.expression_attribute_values,
        )?;
        let mut tables = self.tables.write();
        let old = put_row(&mut tables, &input.table_name, input.item.clone(), &predicates)?;
        debug!(table = %input.table_name, replaced = old.is_some(), "put item");
        Ok(PutItemOutput {
            attributes: returned(input.return_values, old, None),
            consumed_capacity: capacity(input.return_consumed_capacity, &input.table_name, 1),
        })
    }

    /// Handle `UpdateItem`. Runs the table's pending write hook first.
    pub fn handle_update_item(
        &self,
        input: &UpdateItemInput,
    ) -> Result<UpdateItemOutput, ServiceError> {
        let predicates = condition_predicates(
            input.condition_expression.as_deref(),
            &input.expression_attribute_values,
        )?;
        let update = input.update_expression.as_deref().unwrap_or_default();
        let assignments = if update.trim().is_empty() {
            Vec::new()
        } else {
            parse_update(update, &input.expression_attribute_values)
                .map_err(expression_error_to_service)?
        };

        self.run_hook(&input.table_name);

        let mut tables = self.tables.write();
        let (old, new) = update_row(
            &mut tables,
            &input.table_name,
            &input.key,
            &predicates,
            assignments,
        )?;
        debug!(table = %input.table_name, created = old.is_none(), "updated item");
        Ok(UpdateItemOutput {
            attributes: returned(input.return_values, old, Some(new)),
            consumed_capacity: capacity(input.return_consumed_capacity, &input.table_name, 1),
        })
    }

    /// Handle `DeleteItem`. Runs the table's pending write hook first.
    pub fn handle_delete_item(
        &self,
        input: &DeleteItemInput,
    ) -> Result<DeleteItemOutput, ServiceError> {
        let predicates = condition_predicates(
            input.condition_expression.as_deref(),
            &input.expression_attribute_values,
        )?;

        self.run_hook(&input.table_name);

        let mut tables = self.tables.write();
        let old = delete_row(&mut tables, &input.table_name, &input.key, &predicates)?;
        debug!(table = %input.table_name, removed = old.is_some(), "deleted item");
        Ok(DeleteItemOutput {
            attributes: returned(input.return_values, old, None),
            consumed_capacity: capacity(input.return_consumed_capacity, &input.table_name, 1),
        })
    }

    /// Handle `BatchWriteItem`. Requests are applied unconditionally and
    /// nothing is ever left unprocessed. A malformed request anywhere in the
    /// batch fails it before any row is written.
    pub fn handle_batch_write_item(
        &self,
        input: &BatchWriteItemInput,
    ) -> Result<BatchWriteItemOutput, ServiceError> {
        let mut tables = self.tables.write();
        if let Some(missing) = input.request_items.keys().find(|t| !tables.contains_key(*t)) {
            return Err(not_found(missing));
        }

        // The whole batch is validated before any row changes.
        for (table_name, requests) in &input.request_items {
            let schema = tables.get(table_name).ok_or_else(|| not_found(table_name))?.schema();
            for request in requests {
                let row = match (&request.put_request, &request.delete_request) {
                    (Some(put), None) => &put.item,
                    (None, Some(delete)) => &delete.key,
                    _ => {
                        return Err(ServiceError::validation(
                            "A WriteRequest must contain exactly one of PutRequest or DeleteRequest",
                        ));
                    }
                };
                schema.derive_key(row).map_err(storage_error_to_service)?;
            }
        }

        let mut consumed = Vec::new();
        for (table_name, requests) in &input.request_items {
            let table = require_table(&mut tables, table_name)?;
            for request in requests {
                match (&request.put_request, &request.delete_request) {
                    (Some(put), None) => {
                        table
                            .add(put.item.clone(), true)
                            .map_err(storage_error_to_service)?;
                    }
                    (None, Some(delete)) => {
                        table
                            .remove(&delete.key)
                            .map_err(storage_error_to_service)?;
                    }
                    // Rejected while validating.
                    _ => {}
                }
            }
            debug!(table = %table_name, count = requests.len(), "applied batch write");
            consumed.extend(capacity(
                input.return_consumed_capacity,
                table_name,
                requests.len(),
            ));
        }
        Ok(BatchWriteItemOutput {
            unprocessed_items: HashMap::new(),
            consumed_capacity: consumed,
        })
    }

    /// Handle `TransactWriteItems`.
    ///
    /// Items are applied in order. Every item is classified even after a
    /// failure so the cancellation carries one reason per item; on failure
    /// the affected tables are restored from a snapshot.
    pub fn handle_transact_write_items(
        &self,
        input: &TransactWriteItemsInput,
    ) -> Result<TransactWriteItemsOutput, ServiceError> {
        let items = &input.transact_items;
        if items.is_empty() {
            return Ok(TransactWriteItemsOutput::default());
        }
        if items.len() > MAX_TRANSACTION_ITEMS {
            return Err(ServiceError::validation(format!(
                "Member must have length less than or equal to {MAX_TRANSACTION_ITEMS}"
            )));
        }

        let mut tables = self.tables.write();
        let mut per_table: BTreeMap<String, usize> = BTreeMap::new();
        for item in items {
            let name = item.table_name().ok_or_else(|| {
                ServiceError::validation(
                    "TransactItems can only contain one of Put, Update or Delete",
                )
            })?;
            if !tables.contains_key(name) {
                return Err(not_found(name));
            }
            *per_table.entry(name.to_owned()).or_default() += 1;
        }

        let snapshot: Tables = per_table
            .keys()
            .filter_map(|name| tables.get(name).map(|t| (name.clone(), t.clone())))
            .collect();

        let mut reasons = Vec::with_capacity(items.len());
        let mut cancelled = false;
        for item in items {
            match apply_transact_item(&mut tables, item) {
                Ok(()) => reasons.push(CancellationReason::none()),
                Err(e) if e.code == ErrorCode::ConditionalCheckFailedException => {
                    cancelled = true;
                    reasons.push(CancellationReason::conditional_check_failed());
                }
                Err(e) => {
                    tables.extend(snapshot);
                    return Err(e);
                }
            }
        }

        if cancelled {
            tables.extend(snapshot);
            debug!(items = items.len(), "transaction cancelled, state restored");
            return Err(ServiceError::transaction_canceled(reasons));
        }

        debug!(items = items.len(), "transaction committed");
        Ok(TransactWriteItemsOutput {
            consumed_capacity: per_table
                .iter()
                .filter_map(|(name, count)| {
                    capacity(input.return_consumed_capacity, name, *count)
                })
                .collect(),
        })
    }

    /// Handle `Query`: partition-key equality only.
    pub fn handle_query(&self, input: &QueryInput) -> Result<QueryOutput, ServiceError> {
        let predicates = parse_condition(
            &input.key_condition_expression,
            &input.expression_attribute_values,
        )
        .map_err(expression_error_to_service)?;

        let tables = self.tables.read();
        let table = tables
            .get(&input.table_name)
            .ok_or_else(|| not_found(&input.table_name))?;
        let partition_key = &table.schema().partition_key;
        let value = match predicates.as_slice() {
            [Predicate::Equals { attribute, value }] if attribute == partition_key => value,
            _ => {
                return Err(ServiceError::validation(format!(
                    "Query condition missed key schema element: {partition_key}"
                )));
            }
        };
        let items = table.query(value).map_err(storage_error_to_service)?;
        Ok(select(items, input.select))
    }

    /// Handle `Scan`.
    pub fn handle_scan(&self, input: &ScanInput) -> Result<ScanOutput, ServiceError> {
        let tables = self.tables.read();
        let table = tables
            .get(&input.table_name)
            .ok_or_else(|| not_found(&input.table_name))?;
        let QueryOutput { items, count } = select(table.scan(), input.select);
        Ok(ScanOutput { items, count })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(table: &str) -> ServiceError {
    ServiceError::resource_not_found(format!(
        "Requested resource not found: Table: {table} not found"
    ))
}

fn require_table<'a>(tables: &'a mut Tables, name: &str) -> Result<&'a mut Table, ServiceError> {
    tables.get_mut(name).ok_or_else(|| not_found(name))
}

fn condition_predicates(
    expression: Option<&str>,
    values: &ExpressionAttributeValues,
) -> Result<Vec<Predicate>, ServiceError> {
    match expression {
        Some(expression) => {
            parse_condition(expression, values).map_err(expression_error_to_service)
        }
        None => Ok(Vec::new()),
    }
}

fn check(predicates: &[Predicate], row: Option<&Item>) -> Result<(), ServiceError> {
    if accepts_all(predicates, row) {
        Ok(())
    } else {
        Err(ServiceError::conditional_check_failed(
            "The conditional request failed",
        ))
    }
}

fn put_row(
    tables: &mut Tables,
    table_name: &str,
    item: Item,
    predicates: &[Predicate],
) -> Result<Option<Item>, ServiceError> {
    let table = require_table(tables, table_name)?;
    check(predicates, table.get(&item).map_err(storage_error_to_service)?)?;
    table.add(item, true).map_err(storage_error_to_service)
}

/// Returns the previous row (if any) and the new row.
fn update_row(
    tables: &mut Tables,
    table_name: &str,
    key: &Key,
    predicates: &[Predicate],
    assignments: Vec<Assignment>,
) -> Result<(Option<Item>, Item), ServiceError> {
    let table = require_table(tables, table_name)?;
    if let Some(a) = assignments
        .iter()
        .find(|a| table.schema().is_key_attribute(&a.attribute))
    {
        return Err(ServiceError::validation(format!(
            "Cannot update attribute {}. This attribute is part of the key",
            a.attribute
        )));
    }

    let current = table.get(key).map_err(storage_error_to_service)?.cloned();
    check(predicates, current.as_ref())?;

    let mut row = match &current {
        Some(row) => row.clone(),
        None => table.schema().key_of(key).map_err(storage_error_to_service)?,
    };
    apply_assignments(&mut row, assignments);
    table.add(row.clone(), true).map_err(storage_error_to_service)?;
    Ok((current, row))
}

fn delete_row(
    tables: &mut Tables,
    table_name: &str,
    key: &Key,
    predicates: &[Predicate],
) -> Result<Option<Item>, ServiceError> {
    let table = require_table(tables, table_name)?;
    check(predicates, table.get(key).map_err(storage_error_to_service)?)?;
    table.remove(key).map_err(storage_error_to_service)
}

fn apply_transact_item(tables: &mut Tables, item: &TransactWriteItem) -> Result<(), ServiceError> {
    match (&item.put, &item.update, &item.delete) {
        (Some(put), None, None) => {
            let predicates = condition_predicates(
                put.condition_expression.as_deref(),
                &put.expression_attribute_values,
            )?;
            put_row(tables, &put.table_name, put.item.clone(), &predicates).map(drop)
        }
        (None, Some(update), None) => {
            let predicates = condition_predicates(
                update.condition_expression.as_deref(),
                &update.expression_attribute_values,
            )?;
            let assignments =
                parse_update(&update.update_expression, &update.expression_attribute_values)
                    .map_err(expression_error_to_service)?;
            update_row(
                tables,
                &update.table_name,
                &update.key,
                &predicates,
                assignments,
            )
            .map(drop)
        }
        (None, None, Some(delete)) => {
            let predicates = condition_predicates(
                delete.condition_expression.as_deref(),
                &delete.expression_attribute_values,
            )?;
            delete_row(tables, &delete.table_name, &delete.key, &predicates).map(drop)
        }
        _ => Err(ServiceError::validation(
            "TransactItems can only contain one of Put, Update or Delete",
        )),
    }
}

fn returned(return_values: Option<ReturnValue>, old: Option<Item>, new: Option<Item>) -> Item {
    match return_values {
        Some(ReturnValue::AllOld) => old.unwrap_or_default(),
        Some(ReturnValue::AllNew) => new.unwrap_or_default(),
        Some(ReturnValue::None) | None => Item::new(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn capacity(
    requested: Option<ReturnConsumedCapacity>,
    table: &str,
    items: usize,
) -> Option<ConsumedCapacity> {
    requested
        .filter(ReturnConsumedCapacity::should_report)
        .map(|_| ConsumedCapacity::for_table(table, items as f64 * WRITE_UNITS_PER_ITEM))
}

fn select(items: Vec<Item>, select: Option<Select>) -> QueryOutput {
    let count = items.len();
    match select {
        Some(Select::Count) => QueryOutput {
            items: Vec::new(),
            count,
        },
        _ => QueryOutput { items, count },
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

impl Transport for MockStore {
    fn get_item(&self, input: &GetItemInput) -> Result<GetItemOutput, TransportError> {
        Ok(self.handle_get_item(input)?)
    }

    fn put_item(&self, input: &PutItemInput) -> Result<PutItemOutput, TransportError> {
        Ok(self.handle_put_item(input)?)
    }

    fn update_item(&self, input: &UpdateItemInput) -> Result<UpdateItemOutput, TransportError> {
        Ok(self.handle_update_item(input)?)
    }

    fn delete_item(&self, input: &DeleteItemInput) -> Result<DeleteItemOutput, TransportError> {
        Ok(self.handle_delete_item(input)?)
    }

    fn batch_write_item(
        &self,
        input: &BatchWriteItemInput,
    ) -> Result<BatchWriteItemOutput, TransportError> {
        Ok(self.handle_batch_write_item(input)?)
    }

    fn transact_write_items(
        &self,
        input: &TransactWriteItemsInput,
    ) -> Result<TransactWriteItemsOutput, TransportError> {
        Ok(self.handle_transact_write_items(input)?)
    }

    fn query(&self, input: &QueryInput) -> Result<QueryOutput, TransportError> {
        Ok(self.handle_query(input)?)
    }

    fn scan(&self, input: &ScanInput) -> Result<ScanOutput, TransportError> {
        Ok(self.handle_scan(input)?)
    }
}

#[cfg(test)]
mod tests {
    use keepalive_ddb_model::AttributeValue;
    use keepalive_ddb_model::input::{Put, Update};
    use keepalive_ddb_model::types::WriteRequest;

    use super::*;

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.to_owned())
    }

    fn n(v: &str) -> AttributeValue {
        AttributeValue::N(v.to_owned())
    }

    fn item(pairs: &[(&str, AttributeValue)]) -> Item {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    fn store() -> MockStore {
        let store = MockStore::new();
        store.create_table("t", KeySchema::hash("id")).unwrap();
        store
    }

    fn put(row: Item, condition: Option<&str>) -> PutItemInput {
        PutItemInput {
            table_name: "t".to_owned(),
            item: row,
            condition_expression: condition.map(str::to_owned),
            ..Default::default()
        }
    }

    #[test]
    fn test_should_reject_duplicate_table() {
        let store = store();
        let err = store.create_table("t", KeySchema::hash("id")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceInUseException);
    }

    #[test]
    fn test_should_report_missing_table() {
        let err = store()
            .handle_get_item(&GetItemInput {
                table_name: "missing".to_owned(),
                key: item(&[("id", s("a"))]),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFoundException);
    }

    #[test]
    fn test_should_enforce_create_guard_on_put() {
        let store = store();
        let guarded = put(item(&[("id", s("a"))]), Some("attribute_not_exists(id)"));
        store.handle_put_item(&guarded).unwrap();
        let err = store.handle_put_item(&guarded).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConditionalCheckFailedException);
    }

    #[test]
    fn test_should_report_one_capacity_unit_per_write() {
        let store = store();
        let mut input = put(item(&[("id", s("a"))]), None);
        input.return_consumed_capacity = Some(ReturnConsumedCapacity::Total);
        let output = store.handle_put_item(&input).unwrap();
        assert_eq!(
            output.consumed_capacity.and_then(|c| c.capacity_units),
            Some(1.0)
        );
    }

    #[test]
    fn test_should_reject_reserved_word_in_condition() {
        let store = store();
        let mut input = put(item(&[("id", s("a"))]), Some("name = :n"));
        input
            .expression_attribute_values
            .insert(":n".to_owned(), s("x"));
        let err = store.handle_put_item(&input).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationException);
        assert_eq!(store.row_count("t"), Some(0));
    }

    #[test]
    fn test_should_create_row_on_unguarded_update() {
        let store = store();
        store
            .handle_update_item(&UpdateItemInput {
                table_name: "t".to_owned(),
                key: item(&[("id", s("a"))]),
                update_expression: Some("SET score = :v1".to_owned()),
                expression_attribute_values: item(&[(":v1", n("5"))]),
                ..Default::default()
            })
            .unwrap();
        let row = store
            .handle_get_item(&GetItemInput {
                table_name: "t".to_owned(),
                key: item(&[("id", s("a"))]),
                ..Default::default()
            })
            .unwrap()
            .item
            .unwrap();
        assert_eq!(row, item(&[("id", s("a")), ("score", n("5"))]));
    }

    #[test]
    fn test_should_reject_key_attribute_update() {
        let store = store();
        let err = store
            .handle_update_item(&UpdateItemInput {
                table_name: "t".to_owned(),
                key: item(&[("id", s("a"))]),
                update_expression: Some("SET id = :v1".to_owned()),
                expression_attribute_values: item(&[(":v1", s("b"))]),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationException);
    }

    #[test]
    fn test_should_run_write_hook_once_before_delete() {
        let store = store();
        store.load("t", [item(&[("id", s("a"))])]).unwrap();
        store.on_next_write("t", |store| {
            store.load("t", [item(&[("id", s("b"))])]).unwrap();
        });
        let delete = DeleteItemInput {
            table_name: "t".to_owned(),
            key: item(&[("id", s("a"))]),
            return_values: Some(ReturnValue::AllOld),
            ..Default::default()
        };
        let output = store.handle_delete_item(&delete).unwrap();
        assert_eq!(output.attributes, item(&[("id", s("a"))]));
        assert_eq!(store.row_count("t"), Some(1));

        let output = store.handle_delete_item(&delete).unwrap();
        assert!(output.attributes.is_empty());
        assert_eq!(store.row_count("t"), Some(1));
    }

    #[test]
    fn test_should_validate_whole_batch_before_writing() {
        let store = store();
        store.load("t", [item(&[("id", s("a"))]), item(&[("id", s("b"))])]).unwrap();

        let requests = vec![
            WriteRequest::delete(item(&[("id", s("a"))])),
            WriteRequest::delete(item(&[("id", s("b"))])),
            WriteRequest::delete(item(&[("other", s("c"))])),
        ];
        let err = store
            .handle_batch_write_item(&BatchWriteItemInput {
                request_items: HashMap::from([("t".to_owned(), requests)]),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationException);
        assert_eq!(store.row_count("t"), Some(2));
    }

    #[test]
    fn test_should_restore_state_when_transaction_cancelled() {
        let store = store();
        store.load("t", [item(&[("id", s("b")), ("score", n("1"))])]).unwrap();
        let input = TransactWriteItemsInput {
            transact_items: vec![
                Put {
                    table_name: "t".to_owned(),
                    item: item(&[("id", s("a"))]),
                    ..Default::default()
                }
                .into(),
                Update {
                    table_name: "t".to_owned(),
                    key: item(&[("id", s("b"))]),
                    update_expression: "SET score = :v1".to_owned(),
                    condition_expression: Some("score = :c1".to_owned()),
                    expression_attribute_values: item(&[(":v1", n("3")), (":c1", n("2"))]),
                }
                .into(),
                Put {
                    table_name: "t".to_owned(),
                    item: item(&[("id", s("c"))]),
                    ..Default::default()
                }
                .into(),
            ],
            return_consumed_capacity: None,
        };

        let err = store.handle_transact_write_items(&input).unwrap_err();
        assert_eq!(err.code, ErrorCode::TransactionCanceledException);
        let codes: Vec<&str> = err
            .cancellation_reasons
            .iter()
            .map(|r| r.code.as_str())
            .collect();
        assert_eq!(codes, ["None", "ConditionalCheckFailed", "None"]);
        assert_eq!(store.row_count("t"), Some(1));
    }

    #[test]
    fn test_should_query_partition_and_count() {
        let store = MockStore::new();
        store
            .create_table("t", KeySchema::composite("pk", "sk"))
            .unwrap();
        store
            .load(
                "t",
                [("A", "1"), ("A", "2"), ("B", "1")]
                    .map(|(pk, sk)| item(&[("pk", s(pk)), ("sk", n(sk))])),
            )
            .unwrap();

        let mut input = QueryInput {
            table_name: "t".to_owned(),
            key_condition_expression: "pk = :pk".to_owned(),
            expression_attribute_values: item(&[(":pk", s("A"))]),
            ..Default::default()
        };
        assert_eq!(store.handle_query(&input).unwrap().items.len(), 2);

        input.select = Some(Select::Count);
        let output = store.handle_query(&input).unwrap();
        assert!(output.items.is_empty());
        assert_eq!(output.count, 2);

        input.key_condition_expression = "sk = :pk".to_owned();
        assert_eq!(
            store.handle_query(&input).unwrap_err().code,
            ErrorCode::ValidationException
        );
    }

    #[test]
    fn test_should_scan_copies() {
        let store = store();
        store.load("t", [item(&[("id", s("a"))])]).unwrap();
        let mut rows = store
            .handle_scan(&ScanInput {
                table_name: "t".to_owned(),
                ..Default::default()
            })
            .unwrap()
            .items;
        rows[0].insert("extra".to_owned(), s("x"));
        let again = store
            .handle_scan(&ScanInput {
                table_name: "t".to_owned(),
                ..Default::default()
            })
            .unwrap()
            .items;
        assert!(!again[0].contains_key("extra"));
    }
}
