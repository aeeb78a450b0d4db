//! The store client: the public surface callers use to read and write rows.
//!
//! Every operation compiles its request, runs it through the retry loop and
//! translates failures. Each call returns a [`Response`] carrying its own
//! [`ResponseMetadata`]; the client keeps no per-call state of its own.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use keepalive_ddb_model::input::{
    BatchWriteItemInput, GetItemInput, QueryInput, ScanInput, TransactWriteItemsInput,
};
use keepalive_ddb_model::output::total_capacity;
use keepalive_ddb_model::types::{ConsumedCapacity, ReturnConsumedCapacity, WriteRequest};
use keepalive_ddb_model::{ServiceError, StoreOperation};
use tracing::debug;

use crate::codec;
use crate::config::StoreConfig;
use crate::error::{FailureContext, StoreError, StoreResult, translate};
use crate::expression::check_attribute_name;
use crate::http::HttpTransport;
use crate::request::{DeleteRequest, PutRequest, TransactItem, UpdateRequest};
use crate::retry::{Clock, RetryFailure, RetryPolicy, Retried, SystemClock, with_retry};
use crate::transport::{Transport, TransportError};
use crate::value::{Record, Value};

/// Most keys accepted by one `BatchWriteItem` call.
pub const BATCH_WRITE_LIMIT: usize = 25;
/// Most items accepted by one `TransactWriteItems` call.
pub const TRANSACTION_LIMIT: usize = 100;

/// Per-call bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResponseMetadata {
    /// Wall time spent in the call, retries included.
    pub elapsed: Duration,
    /// Throttled attempts that were retried.
    pub throttle_retries: u32,
    /// Capacity units reported by the service, if any.
    pub consumed_capacity: Option<f64>,
}

/// The result of one call together with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    /// The call's result.
    pub value: T,
    /// How the call went.
    pub metadata: ResponseMetadata,
}

impl<T> Response<T> {
    /// Discards the metadata.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Client for item-level table operations.
#[derive(Debug, Clone)]
pub struct StoreClient {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl StoreClient {
    /// Creates a client over `transport` with the given retry policy.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            retry,
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a client talking HTTP to the configured endpoint.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let transport = HttpTransport::new(config).map_err(StoreError::Transport)?;
        Ok(Self::new(Arc::new(transport), config.retry_policy()))
    }

    /// Replaces the clock used for backoff and elapsed time.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Reads one row. Returns `None` when the row or the table is absent.
    pub fn get(
        &self,
        table: &str,
        key: &Record,
        consistent: bool,
    ) -> StoreResult<Response<Option<Record>>> {
        let input = GetItemInput {
            table_name: table.to_owned(),
            key: codec::encode(key)?,
            consistent_read: consistent.then_some(true),
            return_consumed_capacity: None,
        };
        let result = self.execute(StoreOperation::GetItem, table, FailureContext::Plain, || {
            self.transport.get_item(&input)
        });
        match result {
            Ok(response) => {
                let capacity = capacity_units(response.value.consumed_capacity.as_ref());
                let record = response.value.item.as_ref().map(codec::decode).transpose()?;
                Ok(with_capacity(response.metadata, capacity, record))
            }
            Err(StoreError::ResourceNotFound(message)) => {
                debug!(table, reason = %message, "table not found, treating row as absent");
                Ok(Response {
                    value: None,
                    metadata: ResponseMetadata::default(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Writes a whole item according to the request's guard.
    ///
    /// A create-only put over an existing row fails with
    /// [`StoreError::PrimaryKeyViolation`]; a failed explicit condition with
    /// [`StoreError::PreconditionFailed`].
    pub fn put(&self, request: &PutRequest) -> StoreResult<Response<()>> {
        let input = request.to_input()?;
        let context = if request.is_create_only() {
            FailureContext::CreateOnlyPut
        } else {
            FailureContext::Plain
        };
        let response = self.execute(StoreOperation::PutItem, &request.table, context, || {
            self.transport.put_item(&input)
        })?;
        let capacity = capacity_units(response.value.consumed_capacity.as_ref());
        Ok(with_capacity(response.metadata, capacity, ()))
    }

    /// Updates attributes of an existing row.
    ///
    /// A missing row and a failed condition both surface as
    /// [`StoreError::PreconditionFailed`].
    pub fn update(&self, request: &UpdateRequest) -> StoreResult<Response<()>> {
        let input = request.to_input()?;
        let response = self.execute(
            StoreOperation::UpdateItem,
            &request.table,
            FailureContext::Plain,
            || self.transport.update_item(&input),
        )?;
        let capacity = capacity_units(response.value.consumed_capacity.as_ref());
        Ok(with_capacity(response.metadata, capacity, ()))
    }

    /// Deletes a row. Returns `true` iff a row was removed.
    ///
    /// Without a caller condition an absent row or table yields `false`. With
    /// one, a failed check is [`StoreError::PreconditionFailed`].
    pub fn delete(&self, request: &DeleteRequest) -> StoreResult<Response<bool>> {
        let input = request.to_input()?;
        let result = self.execute(
            StoreOperation::DeleteItem,
            &request.table,
            FailureContext::Plain,
            || self.transport.delete_item(&input),
        );
        match result {
            Ok(response) => {
                let capacity = capacity_units(response.value.consumed_capacity.as_ref());
                let removed = !response.value.attributes.is_empty();
                Ok(with_capacity(response.metadata, capacity, removed))
            }
            Err(StoreError::ResourceNotFound(_)) => Ok(Response {
                value: false,
                metadata: ResponseMetadata::default(),
            }),
            Err(StoreError::PreconditionFailed(_)) if request.condition.is_none() => {
                Ok(Response {
                    value: false,
                    metadata: ResponseMetadata::default(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes many rows unconditionally, in batches of
    /// [`BATCH_WRITE_LIMIT`]. Unprocessed keys are resubmitted under the
    /// retry policy.
    pub fn batch_delete(&self, table: &str, keys: &[Record]) -> StoreResult<Response<()>> {
        let started = self.clock.now();
        let mut retries = 0;
        let mut capacity = None;

        for chunk in keys.chunks(BATCH_WRITE_LIMIT) {
            let requests = chunk
                .iter()
                .map(|key| codec::encode(key).map(WriteRequest::delete))
                .collect::<Result<Vec<_>, _>>()?;
            let mut input = BatchWriteItemInput {
                request_items: HashMap::from([(table.to_owned(), requests)]),
                return_consumed_capacity: Some(ReturnConsumedCapacity::Total),
            };
            let response = self.execute(
                StoreOperation::BatchWriteItem,
                table,
                FailureContext::Plain,
                || {
                    let output = self.transport.batch_write_item(&input)?;
                    if output.unprocessed_items.is_empty() {
                        return Ok(output);
                    }
                    input.request_items = output.unprocessed_items;
                    Err(TransportError::Service(ServiceError::throttling(
                        "unprocessed items remain",
                    )))
                },
            )?;
            retries += response.metadata.throttle_retries;
            capacity = add_capacity(capacity, total_capacity(&response.value.consumed_capacity));
        }

        Ok(Response {
            value: (),
            metadata: ResponseMetadata {
                elapsed: self.clock.now() - started,
                throttle_retries: retries,
                consumed_capacity: capacity,
            },
        })
    }

    /// Applies every item atomically, or none of them.
    ///
    /// On failure returns [`StoreError::TransactionCancelled`] with one
    /// reason per item. An empty list is a no-op.
    pub fn transact_write(&self, items: &[TransactItem]) -> StoreResult<Response<()>> {
        if items.is_empty() {
            return Ok(Response {
                value: (),
                metadata: ResponseMetadata::default(),
            });
        }
        if items.len() > TRANSACTION_LIMIT {
            return Err(StoreError::Validation(format!(
                "Member must have length less than or equal to {TRANSACTION_LIMIT}, got {}",
                items.len()
            )));
        }
        let input = TransactWriteItemsInput {
            transact_items: items
                .iter()
                .map(TransactItem::to_input)
                .collect::<Result<_, _>>()?,
            return_consumed_capacity: Some(ReturnConsumedCapacity::Total),
        };
        let table = items[0].table();
        let response = self.execute(
            StoreOperation::TransactWriteItems,
            table,
            FailureContext::Plain,
            || self.transport.transact_write_items(&input),
        )?;
        let capacity = total_capacity(&response.value.consumed_capacity);
        Ok(with_capacity(response.metadata, capacity, ()))
    }

    /// Returns every row whose partition attribute equals `value`.
    pub fn query(
        &self,
        table: &str,
        partition_attribute: &str,
        value: impl Into<Value>,
    ) -> StoreResult<Response<Vec<Record>>> {
        check_attribute_name(partition_attribute).map_err(StoreError::from)?;
        let input = QueryInput {
            table_name: table.to_owned(),
            key_condition_expression: format!("{partition_attribute} = :pk"),
            expression_attribute_values: HashMap::from([(
                ":pk".to_owned(),
                codec::encode_value(&value.into())?,
            )]),
            select: None,
            consistent_read: None,
        };
        let response = self.execute(StoreOperation::Query, table, FailureContext::Plain, || {
            self.transport.query(&input)
        })?;
        let records = response
            .value
            .items
            .iter()
            .map(codec::decode)
            .collect::<Result<_, _>>()?;
        Ok(with_capacity(response.metadata, None, records))
    }

    /// Returns every row of `table`.
    pub fn scan(&self, table: &str) -> StoreResult<Response<Vec<Record>>> {
        let input = ScanInput {
            table_name: table.to_owned(),
            select: None,
            consistent_read: None,
        };
        let response = self.execute(StoreOperation::Scan, table, FailureContext::Plain, || {
            self.transport.scan(&input)
        })?;
        let records = response
            .value
            .items
            .iter()
            .map(codec::decode)
            .collect::<Result<_, _>>()?;
        Ok(with_capacity(response.metadata, None, records))
    }

    /// Runs one transport call under the retry policy, translating failures
    /// and recording metadata.
    fn execute<T>(
        &self,
        operation: StoreOperation,
        table: &str,
        context: FailureContext,
        call: impl FnMut() -> Result<T, TransportError>,
    ) -> StoreResult<Response<T>> {
        let started = self.clock.now();
        let result = with_retry(&self.retry, self.clock.as_ref(), operation, table, call);
        let elapsed = self.clock.now() - started;
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(Retried { value, retries }) => {
                debug!(%operation, table, elapsed_ms, retries, "store call completed");
                Ok(Response {
                    value,
                    metadata: ResponseMetadata {
                        elapsed,
                        throttle_retries: retries,
                        consumed_capacity: None,
                    },
                })
            }
            Err(RetryFailure::Exhausted { attempts }) => {
                Err(StoreError::RetriesExhausted { attempts })
            }
            Err(RetryFailure::Failed(error)) => {
                let error = translate(error, context);
                debug!(%operation, table, elapsed_ms, error = %error, "store call failed");
                Err(error)
            }
        }
    }
}

fn capacity_units(capacity: Option<&ConsumedCapacity>) -> Option<f64> {
    capacity.and_then(|c| c.capacity_units)
}

fn add_capacity(total: Option<f64>, more: Option<f64>) -> Option<f64> {
    match (total, more) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}

fn with_capacity<T>(metadata: ResponseMetadata, capacity: Option<f64>, value: T) -> Response<T> {
    Response {
        value,
        metadata: ResponseMetadata {
            consumed_capacity: capacity,
            ..metadata
        },
    }
}
