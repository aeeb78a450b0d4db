//! The seam between the store client and whatever executes requests.
//!
//! [`crate::http::HttpTransport`] talks to a real endpoint; the in-memory
//! engine in `keepalive-ddb-mock` implements the same trait for tests.

use std::fmt;

use keepalive_ddb_model::ServiceError;
use keepalive_ddb_model::input::{
    BatchWriteItemInput, DeleteItemInput, GetItemInput, PutItemInput, QueryInput, ScanInput,
    TransactWriteItemsInput, UpdateItemInput,
};
use keepalive_ddb_model::output::{
    BatchWriteItemOutput, DeleteItemOutput, GetItemOutput, PutItemOutput, QueryOutput, ScanOutput,
    TransactWriteItemsOutput, UpdateItemOutput,
};

/// Errors a transport can return.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The service answered with an error.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The request could not be sent or the response not read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The endpoint URL is invalid.
    #[error("invalid endpoint {endpoint}: {reason}")]
    Endpoint {
        /// Configured endpoint.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The service answered with a status and body this layer cannot parse.
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },
    /// A request or response body was not valid JSON for its shape.
    #[error("malformed body: {0}")]
    Body(#[from] serde_json::Error),
}

impl TransportError {
    /// Returns the service error, if this is one.
    #[must_use]
    pub fn as_service(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(e) => Some(e),
            _ => None,
        }
    }
}

/// Executes item-level DynamoDB operations.
///
/// Implementations must be shareable across threads; each call is
/// independent and blocking.
pub trait Transport: Send + Sync + fmt::Debug {
    /// `GetItem`.
    fn get_item(&self, input: &GetItemInput) -> Result<GetItemOutput, TransportError>;
    /// `PutItem`.
    fn put_item(&self, input: &PutItemInput) -> Result<PutItemOutput, TransportError>;
    /// `UpdateItem`.
    fn update_item(&self, input: &UpdateItemInput) -> Result<UpdateItemOutput, TransportError>;
    /// `DeleteItem`.
    fn delete_item(&self, input: &DeleteItemInput) -> Result<DeleteItemOutput, TransportError>;
    /// `BatchWriteItem`.
    fn batch_write_item(
        &self,
        input: &BatchWriteItemInput,
    ) -> Result<BatchWriteItemOutput, TransportError>;
    /// `TransactWriteItems`.
    fn transact_write_items(
        &self,
        input: &TransactWriteItemsInput,
    ) -> Result<TransactWriteItemsOutput, TransportError>;
    /// `Query`.
    fn query(&self, input: &QueryInput) -> Result<QueryOutput, TransportError>;
    /// `Scan`.
    fn scan(&self, input: &ScanInput) -> Result<ScanOutput, TransportError>;
}
