//! Otus Domain Layer
//!
//! Value objects, aggregates and repository contracts for the todo and
//! relato (project diary) lifecycle.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Domain Layer                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  value_objects  │ TaskStatus, TaskPriority, RelatoTipo, ...      │
//! │  entities       │ Todo, Relato, CatalogEntry                     │
//! │  query          │ TodoQuery, TodoSort, RelatoFilters             │
//! │  repositories   │ TodoRepository, RelatoRepository (traits only) │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The domain layer performs no I/O. Concrete repositories live in
//! `otus-persistence`; orchestration lives in `otus-application`.

pub mod entities;
pub mod errors;
pub mod patch;
pub mod query;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use errors::{DomainError, DomainResult};
pub use patch::Patch;
pub use query::*;
pub use repositories::*;
pub use value_objects::*;
