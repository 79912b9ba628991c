//! Otus Application Layer
//!
//! Use cases that orchestrate the todo and relato aggregates over the
//! repository traits declared in `otus-domain`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Application Layer                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Use cases          │ DTOs                │ Enrichment                  │
//! │  ─────────          │ ────                │ ──────────                  │
//! │  CreateTodo ...     │ CreateTodoCommand   │ load_todo_lookups           │
//! │  CreateRelato ...   │ TodoResponse        │ load_relato_lookups         │
//! │  ListCatalog ...    │ RelatoResponse      │                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │ depends on
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Layer                                     │
//! │  Todo, Relato, value objects, repository traits                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Non-Goals
//!
//! - Domain rules (belong in the domain layer)
//! - Storage (belongs in `otus-persistence`)
//! - Argument parsing and output formatting (belong in `otus-cli`)

pub mod di;
pub mod dto;
pub mod enrichment;
pub mod errors;
pub mod use_cases;

pub use di::{CatalogUseCases, RelatoUseCases, TodoUseCases, UseCases};
pub use dto::*;
pub use errors::{ApplicationError, ApplicationResult, ErrorKind};
pub use use_cases::*;
