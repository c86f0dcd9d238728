//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Request-time failures, surfaced to the caller synchronously. Failures during a job
/// run never reach a caller; they are recorded in the job row instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad or missing input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A natural key is already taken (e.g. duplicate tax id).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
