//! Session storage.

use keepalive_ddb_client::{
    DeleteRequest, PutRequest, Record, StoreClient, StoreError, StoreResult, UpdateRequest, key,
    record,
};
use tracing::{debug, info};

use crate::session::Session;

/// Table holding sessions, keyed by `sessionId`.
pub const SESSION_TABLE: &str = "SSKeepaliveSession";

/// Storage operations on sessions.
pub trait SessionRepo: Send + Sync + std::fmt::Debug {
    /// Stores a new session. Returns `false` if the id is already taken.
    fn create_session(&self, session: &Session) -> StoreResult<bool>;

    /// Moves the expiry of an existing session. Returns `false` if the
    /// session does not exist.
    fn extend_session(&self, session_id: &str, expire_at: i64) -> StoreResult<bool>;

    /// Reads a session with a consistent read.
    fn find_session(&self, session_id: &str) -> StoreResult<Option<Session>>;

    /// Deletes a session. Returns `true` iff it existed.
    fn delete_session(&self, session_id: &str) -> StoreResult<bool>;
}

/// [`SessionRepo`] backed by the store client.
#[derive(Debug, Clone)]
pub struct DynamoSessionRepo {
    client: StoreClient,
    table: String,
}

impl DynamoSessionRepo {
    /// Creates a repository over [`SESSION_TABLE`].
    #[must_use]
    pub fn new(client: StoreClient) -> Self {
        Self::with_table(client, SESSION_TABLE)
    }

    /// Creates a repository over a custom table.
    #[must_use]
    pub fn with_table(client: StoreClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn session_key(session_id: &str) -> Record {
        key(Session::ID_ATTRIBUTE, session_id)
    }
}

impl SessionRepo for DynamoSessionRepo {
    fn create_session(&self, session: &Session) -> StoreResult<bool> {
        let request =
            PutRequest::new(&self.table, session.to_record()?).create_only([Session::ID_ATTRIBUTE]);
        match self.client.put(&request) {
            Ok(_) => {
                info!(session_id = %session.session_id, "session created");
                Ok(true)
            }
            Err(StoreError::PrimaryKeyViolation(_)) => {
                debug!(session_id = %session.session_id, "session already exists");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn extend_session(&self, session_id: &str, expire_at: i64) -> StoreResult<bool> {
        let request = UpdateRequest::new(
            &self.table,
            Self::session_key(session_id),
            record([(Session::EXPIRE_ATTRIBUTE, expire_at.into())]),
        );
        match self.client.update(&request) {
            Ok(_) => {
                debug!(session_id, expire_at, "session extended");
                Ok(true)
            }
            Err(StoreError::PreconditionFailed(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn find_session(&self, session_id: &str) -> StoreResult<Option<Session>> {
        let response = self
            .client
            .get(&self.table, &Self::session_key(session_id), true)?;
        Ok(response
            .value
            .map(Session::from_record)
            .transpose()?)
    }

    fn delete_session(&self, session_id: &str) -> StoreResult<bool> {
        let response = self
            .client
            .delete(&DeleteRequest::new(&self.table, Self::session_key(session_id)))?;
        if response.value {
            info!(session_id, "session deleted");
        }
        Ok(response.value)
    }
}
