//! Domain errors
//!
//! Every service operation fails with one of these variants. The HTTP layer
//! matches them exhaustively when building problem responses.

use thiserror::Error;

/// Domain-level error kinds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Client supplied malformed or missing data
    #[error("{0}")]
    Invalid(String),

    /// Referenced resource does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// State precondition violated (concurrent modification, duplicate id)
    #[error("{0}")]
    Conflict(String),

    /// Anything else. The message is for operators only.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable discriminant of a [`DomainError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Invalid,
    NotFound,
    Conflict,
    Internal,
}

impl DomainError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
