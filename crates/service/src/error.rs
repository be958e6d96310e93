//! Service error types.

use domain::{EnrollmentError, ValidationErrors};
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by the course, student, and enrollment services.
///
/// The variants mirror the outward taxonomy: not-found maps to 404,
/// business-rule violations to 400, validation to 422, and store failures
/// propagate unwrapped as 500s.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A referenced entity does not exist.
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A business rule rejected the operation.
    #[error(transparent)]
    Business(#[from] EnrollmentError),

    /// Entity construction failed field validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The persistence layer failed; the in-flight transaction was rolled
    /// back before this was raised.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Password hashing failed.
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
