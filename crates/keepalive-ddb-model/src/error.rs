//! DynamoDB service error types.
//!
//! DynamoDB errors use JSON format with a `__type` field containing the
//! fully-qualified error type name, e.g.
//! `com.amazonaws.dynamodb.v20120810#ConditionalCheckFailedException`.
//! Transaction cancellations additionally carry a `CancellationReasons` array.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known DynamoDB error codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Table already exists.
    ResourceInUseException,
    /// Table not found.
    ResourceNotFoundException,
    /// Condition check failed.
    ConditionalCheckFailedException,
    /// Transaction canceled.
    TransactionCanceledException,
    /// Transaction conflict.
    TransactionConflictException,
    /// Provisioned throughput exceeded.
    ProvisionedThroughputExceededException,
    /// Request rate too high.
    ThrottlingException,
    /// Request limit exceeded.
    RequestLimitExceeded,
    /// Validation error.
    #[default]
    ValidationException,
    /// Serialization error.
    SerializationException,
    /// Internal server error.
    InternalServerError,
    /// Access denied.
    AccessDeniedException,
    /// Unknown operation or bad credentials.
    UnrecognizedClientException,
    /// Any code this crate does not model, kept verbatim.
    Other(String),
}

impl ErrorCode {
    /// Parse a short code or a fully-qualified `__type` string.
    ///
    /// Everything up to and including the last `#` is ignored, so both
    /// `ResourceNotFoundException` and
    /// `com.amazonaws.dynamodb.v20120810#ResourceNotFoundException` parse to
    /// the same code.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let short = name.rsplit_once('#').map_or(name, |(_, code)| code);
        match short {
            "ResourceInUseException" => Self::ResourceInUseException,
            "ResourceNotFoundException" => Self::ResourceNotFoundException,
            "ConditionalCheckFailedException" => Self::ConditionalCheckFailedException,
            "TransactionCanceledException" => Self::TransactionCanceledException,
            "TransactionConflictException" => Self::TransactionConflictException,
            "ProvisionedThroughputExceededException" => {
                Self::ProvisionedThroughputExceededException
            }
            "ThrottlingException" => Self::ThrottlingException,
            "RequestLimitExceeded" => Self::RequestLimitExceeded,
            "ValidationException" => Self::ValidationException,
            "SerializationException" => Self::SerializationException,
            "InternalServerError" => Self::InternalServerError,
            "AccessDeniedException" => Self::AccessDeniedException,
            "UnrecognizedClientException" => Self::UnrecognizedClientException,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ResourceInUseException => "ResourceInUseException",
            Self::ResourceNotFoundException => "ResourceNotFoundException",
            Self::ConditionalCheckFailedException => "ConditionalCheckFailedException",
            Self::TransactionCanceledException => "TransactionCanceledException",
            Self::TransactionConflictException => "TransactionConflictException",
            Self::ProvisionedThroughputExceededException => {
                "ProvisionedThroughputExceededException"
            }
            Self::ThrottlingException => "ThrottlingException",
            Self::RequestLimitExceeded => "RequestLimitExceeded",
            Self::ValidationException => "ValidationException",
            Self::SerializationException => "SerializationException",
            Self::InternalServerError => "InternalServerError",
            Self::AccessDeniedException => "AccessDeniedException",
            Self::UnrecognizedClientException => "UnrecognizedClientException",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-item outcome attached to a cancelled transaction.
///
/// Items that would have succeeded carry the code `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CancellationReason {
    /// Reason code, e.g. `None` or `ConditionalCheckFailed`.
    #[serde(default = "CancellationReason::none_code")]
    pub code: String,
    /// Optional human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CancellationReason {
    /// Code used for items that did not cause the cancellation.
    pub const NONE: &'static str = "None";
    /// Code used for items whose condition evaluated to false.
    pub const CONDITIONAL_CHECK_FAILED: &'static str = "ConditionalCheckFailed";

    fn none_code() -> String {
        Self::NONE.to_owned()
    }

    /// A reason for an item that would have succeeded.
    #[must_use]
    pub fn none() -> Self {
        Self {
            code: Self::NONE.to_owned(),
            message: None,
        }
    }

    /// A reason for an item whose condition failed.
    #[must_use]
    pub fn conditional_check_failed() -> Self {
        Self {
            code: Self::CONDITIONAL_CHECK_FAILED.to_owned(),
            message: Some("The conditional request failed".to_owned()),
        }
    }

    /// Returns `true` if this item did not cause the cancellation.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.code == Self::NONE
    }
}

/// A DynamoDB error response.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceError {
    /// The error code.
    pub code: ErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// Per-item reasons, populated only for `TransactionCanceledException`.
    pub cancellation_reasons: Vec<CancellationReason>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    /// Create a new `ServiceError` from an error code.
    #[must_use]
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.as_str().to_owned(),
            code,
            cancellation_reasons: Vec::new(),
        }
    }

    /// Create a new `ServiceError` with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cancellation_reasons: Vec::new(),
        }
    }

    // -- Convenience constructors --

    /// Table already exists.
    #[must_use]
    pub fn resource_in_use(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ResourceInUseException, message)
    }

    /// Table or resource not found.
    #[must_use]
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ResourceNotFoundException, message)
    }

    /// Condition expression evaluated to false.
    #[must_use]
    pub fn conditional_check_failed(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConditionalCheckFailedException, message)
    }

    /// Validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationException, message)
    }

    /// Request throttled by the service.
    #[must_use]
    pub fn throttling(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ThrottlingException, message)
    }

    /// Internal server error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalServerError, message)
    }

    /// Transaction cancelled, with one reason per submitted item.
    #[must_use]
    pub fn transaction_canceled(reasons: Vec<CancellationReason>) -> Self {
        let summary = reasons
            .iter()
            .map(|r| r.code.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            code: ErrorCode::TransactionCanceledException,
            message: format!(
                "Transaction cancelled, please refer cancellation reasons for specific reasons \
                 [{summary}]"
            ),
            cancellation_reasons: reasons,
        }
    }
}
