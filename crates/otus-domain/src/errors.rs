//! Domain errors for the lifecycle core

use thiserror::Error;

/// Core domain errors
///
/// Messages are meant for direct display: they name the offending field
/// or value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error(
        "Invalid {field} '{provided_value}'. Allowed values: {}",
        .allowed_values.join(", ")
    )]
    InvalidEnumValue {
        field: String,
        provided_value: String,
        allowed_values: Vec<String>,
    },

    #[error("Entity not found: {entity_type} with id {id}")]
    EntityNotFound { entity_type: String, id: String },

    #[error("Todo {id} is already closed")]
    AlreadyClosed { id: String },

    #[error("Todo {id} is not closed")]
    NotClosed { id: String },

    #[error("A resolver is required to resolve a relato")]
    MissingResolver,

    #[error("Permission denied: {reason}")]
    Forbidden { reason: String },

    #[error("Repository error: {reason}")]
    Repository { reason: String },
}

impl DomainError {
    /// Shorthand for a field validation failure
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a missing aggregate
    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        Self::EntityNotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Whether this error belongs to the invalid-state-transition family
    pub fn is_state_transition(&self) -> bool {
        matches!(
            self,
            Self::AlreadyClosed { .. } | Self::NotClosed { .. } | Self::MissingResolver
        )
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
