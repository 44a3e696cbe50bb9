use thiserror::Error;

/// Shared error taxonomy for the booking domain.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Booking reference collided with an existing row; callers retry
    /// with a freshly generated reference.
    #[error("Booking reference already exists: {0}")]
    DuplicateReference(String),

    /// Storage failure. Retryable by the caller; the current operation
    /// has been aborted.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn infra(err: impl std::fmt::Display) -> Self {
        Self::Infrastructure(err.to_string())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
