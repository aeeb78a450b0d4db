//! Store-layer error taxonomy and translation from transport failures.

use keepalive_ddb_model::{CancellationReason, ErrorCode, ServiceError};

use crate::codec::CodecError;
use crate::expression::ExpressionError;
use crate::transport::TransportError;

/// Errors returned by [`crate::StoreClient`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The table (or row) does not exist.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// A condition or key-existence guard evaluated to false.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// A create-only put found an existing row.
    #[error("primary key violation: {0}")]
    PrimaryKeyViolation(String),

    /// A transaction was cancelled; one reason per submitted item.
    #[error("transaction cancelled: [{}]", format_reasons(.reasons))]
    TransactionCancelled {
        /// Per-item reasons, in submission order. Items that did not cause
        /// the cancellation carry the code `None`.
        reasons: Vec<CancellationReason>,
    },

    /// The request is malformed, e.g. it references a reserved word.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other service error, with its original code.
    #[error("client error {code}: {message}")]
    Client {
        /// The service error code.
        code: String,
        /// The service message.
        message: String,
    },

    /// Throttling outlasted the retry policy.
    #[error("request still throttled after {attempts} attempts")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// A value could not be encoded or a response not decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A failure below the service layer, passed through unchanged.
    #[error(transparent)]
    Transport(TransportError),
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

fn format_reasons(reasons: &[CancellationReason]) -> String {
    reasons
        .iter()
        .map(|r| r.code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<ExpressionError> for StoreError {
    fn from(e: ExpressionError) -> Self {
        match e {
            ExpressionError::Codec(codec) => Self::Codec(codec),
            other => Self::Validation(other.to_string()),
        }
    }
}

/// Broad classes of service error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Table or row missing.
    ResourceNotFound,
    /// Condition failed.
    ConditionFailed,
    /// Transient; retry after a backoff.
    Throttling,
    /// Transaction cancelled.
    TransactionCancelled,
    /// Malformed request.
    Validation,
    /// Everything else.
    Client,
}

/// Maps a service error code to its kind.
#[must_use]
pub fn classify(code: &ErrorCode) -> ErrorKind {
    match code {
        ErrorCode::ResourceNotFoundException => ErrorKind::ResourceNotFound,
        ErrorCode::ConditionalCheckFailedException => ErrorKind::ConditionFailed,
        ErrorCode::ProvisionedThroughputExceededException
        | ErrorCode::ThrottlingException
        | ErrorCode::RequestLimitExceeded => ErrorKind::Throttling,
        ErrorCode::TransactionCanceledException => ErrorKind::TransactionCancelled,
        ErrorCode::ValidationException | ErrorCode::SerializationException => {
            ErrorKind::Validation
        }
        _ => ErrorKind::Client,
    }
}

/// What the failed call was doing, for codes whose meaning depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureContext {
    /// Nothing special.
    #[default]
    Plain,
    /// A put guarded by `attribute_not_exists` on its key.
    CreateOnlyPut,
}

/// Translates a transport failure into a [`StoreError`].
///
/// Non-service failures pass through unchanged.
#[must_use]
pub fn translate(error: TransportError, context: FailureContext) -> StoreError {
    match error {
        TransportError::Service(service) => translate_service(service, context),
        other => StoreError::Transport(other),
    }
}

fn translate_service(error: ServiceError, context: FailureContext) -> StoreError {
    let ServiceError {
        code,
        message,
        cancellation_reasons,
    } = error;
    match (classify(&code), context) {
        (ErrorKind::ResourceNotFound, _) => StoreError::ResourceNotFound(message),
        (ErrorKind::ConditionFailed, FailureContext::CreateOnlyPut) => {
            StoreError::PrimaryKeyViolation(message)
        }
        (ErrorKind::ConditionFailed, FailureContext::Plain) => {
            StoreError::PreconditionFailed(message)
        }
        (ErrorKind::TransactionCancelled, _) => StoreError::TransactionCancelled {
            reasons: cancellation_reasons,
        },
        (ErrorKind::Validation, _) => StoreError::Validation(message),
        // Throttling reaches here only if a caller bypasses the retry loop.
        (ErrorKind::Throttling | ErrorKind::Client, _) => StoreError::Client {
            code: code.as_str().to_owned(),
            message,
        },
    }
}
