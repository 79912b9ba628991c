//! Use cases
//!
//! One struct per operation, each exposing a single `execute`. Every
//! `execute` runs the same phases in order: validate raw input, load the
//! aggregate, mutate it through entity behaviours, persist, then enrich
//! and shape the response.

mod catalog;
mod relato;
mod todo;

pub use catalog::*;
pub use relato::*;
pub use todo::*;

use async_trait::async_trait;

use otus_domain::UserId;

use crate::errors::{ApplicationError, ApplicationResult};

/// A single-purpose orchestration operation
#[async_trait]
pub trait UseCase: Send + Sync {
    type Input: Send + 'static;
    type Output: Send;

    async fn execute(&self, input: Self::Input) -> ApplicationResult<Self::Output>;
}

/// Trimmed text, or `RequiredFieldMissing` when blank
pub(crate) fn require_text(field: &str, value: &str) -> ApplicationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApplicationError::RequiredFieldMissing(field.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Blank user references are treated as absent
pub(crate) fn optional_user(raw: Option<&str>) -> ApplicationResult<Option<UserId>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => Ok(Some(UserId::new(id)?)),
        None => Ok(None),
    }
}
