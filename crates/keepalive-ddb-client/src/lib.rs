//! Typed DynamoDB store client.
//!
//! Callers work with plain [`Record`]s of [`Value`]s. The client encodes them
//! into attribute values, compiles conditions and updates into expressions,
//! retries throttled calls and translates service errors into [`StoreError`].
//!
//! The wire is abstracted behind [`Transport`]: [`HttpTransport`] talks to a
//! real endpoint, while tests plug in an in-memory engine.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod expression;
pub mod http;
pub mod request;
pub mod retry;
pub mod signing;
pub mod transport;
pub mod value;

pub use client::{Response, ResponseMetadata, StoreClient};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use expression::Condition;
pub use http::HttpTransport;
pub use request::{DeleteRequest, PutGuard, PutRequest, TransactItem, UpdateRequest, key};
pub use retry::{Clock, RetryPolicy, SystemClock};
pub use transport::{Transport, TransportError};
pub use value::{Number, Record, Value, record};
