//! Persistence Layer Error Types
//!
//! Error mapping to domain types

use otus_domain::errors::DomainError;
use thiserror::Error;

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Unique key already taken
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// A stored row no longer parses into its aggregate
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Snapshot file I/O
    #[error("I/O error: {0}")]
    Io(String),

    /// Backing table or lookup source not reachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convert persistence errors to domain errors
impl From<PersistenceError> for DomainError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { entity_type, id } => DomainError::EntityNotFound {
                entity_type: entity_type.to_string(),
                id,
            },
            other => DomainError::Repository {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type alias for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = PersistenceError::not_found("Todo", 12);
        assert!(err.to_string().contains("Todo"));
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_error_conversion() {
        let domain_err: DomainError = PersistenceError::not_found("Relato", 3).into();
        assert!(matches!(domain_err, DomainError::EntityNotFound { .. }));

        let domain_err: DomainError = PersistenceError::Unavailable("users".into()).into();
        assert!(matches!(domain_err, DomainError::Repository { .. }));
    }
}
