//! Application layer error types
//!
//! These errors represent application-level failures that are suitable
//! for API/UI consumption. Entity state errors pass through unchanged so
//! their messages reach the caller as written.

use otus_domain::errors::DomainError;
use thiserror::Error;

/// Application layer result type
pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Coarse classification for transports mapping errors to status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Internal,
}

/// Application layer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplicationError {
    // === Validation Errors ===
    /// Input validation failed
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Required field missing
    #[error("Required field missing: {0}")]
    RequiredFieldMissing(String),

    // === Not Found Errors ===
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    // === Permission / Conflict ===
    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Infrastructure Errors ===
    /// Repository operation failed
    #[error("Repository error: {0}")]
    RepositoryError(String),

    // === Domain Error Wrapper ===
    /// Entity rule violation, surfaced as-is
    #[error(transparent)]
    Domain(DomainError),
}

impl ApplicationError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationFailed(_) | Self::RequiredFieldMissing(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::RepositoryError(_) => ErrorKind::Internal,
            Self::Domain(err) => match err {
                DomainError::ValidationError { .. }
                | DomainError::InvalidEnumValue { .. }
                | DomainError::MissingResolver => ErrorKind::Validation,
                DomainError::AlreadyClosed { .. } | DomainError::NotClosed { .. } => {
                    ErrorKind::Conflict
                }
                DomainError::EntityNotFound { .. } => ErrorKind::NotFound,
                DomainError::Forbidden { .. } => ErrorKind::Forbidden,
                DomainError::Repository { .. } => ErrorKind::Internal,
            },
        }
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError { field, reason } => {
                ApplicationError::ValidationFailed(format!("{}: {}", field, reason))
            }
            DomainError::EntityNotFound { entity_type, id } => ApplicationError::NotFound {
                entity: entity_type,
                id,
            },
            DomainError::Forbidden { reason } => ApplicationError::Forbidden(reason),
            DomainError::Repository { reason } => ApplicationError::RepositoryError(reason),
            other => ApplicationError::Domain(other),
        }
    }
}
