//! Integration tests for the store client, the in-memory engine and the
//! session repository.
//!
//! Most tests drive a [`StoreClient`] against a [`MockStore`] and run with a
//! plain `cargo test`. Tests against a live DynamoDB-compatible endpoint are
//! marked `#[ignore]`; run them with:
//!
//! ```text
//! DYNAMODB_ENDPOINT=http://localhost:8000 cargo test -p keepalive-integration -- --ignored
//! ```

use std::sync::{Arc, Once};

use keepalive_ddb_client::{RetryPolicy, StoreClient, StoreConfig};
use keepalive_ddb_mock::{KeySchema, MockStore};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A fresh in-memory store and a client wired to it.
#[must_use]
pub fn mock_client() -> (Arc<MockStore>, StoreClient) {
    init_tracing();
    let store = Arc::new(MockStore::new());
    let client = StoreClient::new(store.clone(), RetryPolicy::default());
    (store, client)
}

/// A mock client with one table already created.
///
/// # Panics
///
/// Panics if the table cannot be created.
#[must_use]
pub fn mock_client_with_table(table: &str, schema: KeySchema) -> (Arc<MockStore>, StoreClient) {
    let (store, client) = mock_client();
    store
        .create_table(table, schema)
        .unwrap_or_else(|e| panic!("failed to create table {table}: {e}"));
    (store, client)
}

/// A client for the endpoint configured in the environment.
///
/// # Errors
///
/// Fails if the HTTP transport cannot be built.
pub fn live_client() -> anyhow::Result<StoreClient> {
    init_tracing();
    Ok(StoreClient::from_config(&StoreConfig::from_env())?)
}

/// Generate a unique table name for a test.
#[must_use]
pub fn test_table_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

mod test_client;
mod test_live;
mod test_session;
mod test_symmetry;
mod test_transaction;
