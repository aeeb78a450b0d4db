//! Conversions from engine-internal errors to service errors.

use keepalive_ddb_model::ServiceError;

use crate::expression::ExpressionError;
use crate::storage::StorageError;

/// Convert a storage error into the service error the store would return.
///
/// Takes `e` by value because this is used as a closure argument to `.map_err()`.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn storage_error_to_service(e: StorageError) -> ServiceError {
    match e {
        StorageError::DuplicateKey { .. } => {
            ServiceError::conditional_check_failed("The conditional request failed")
        }
        other => ServiceError::validation(other.to_string()),
    }
}

/// Convert an expression error into a validation error.
///
/// Takes `e` by value because this is used as a closure argument to `.map_err()`.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn expression_error_to_service(e: ExpressionError) -> ServiceError {
    ServiceError::validation(e.to_string())
}
