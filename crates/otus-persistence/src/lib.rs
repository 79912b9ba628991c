//! Otus Persistence Layer
//!
//! Infrastructure layer providing repository implementations for the
//! lifecycle aggregates. This crate implements the repository interfaces
//! defined in `otus-domain`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Infrastructure Layer                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  memory/                      │  snapshot                        │
//! │  ─────────                    │  ────────                        │
//! │  MemoryStore (shared tables)  │  SnapshotFile (JSON on disk)     │
//! │  InMemoryTodoRepository       │                                  │
//! │  InMemoryRelatoRepository     │                                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │ implements
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Domain Layer                               │
//! │            TodoRepository, RelatoRepository                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use otus_persistence::{InMemoryTodoRepository, MemoryStore};
//! use otus_domain::repositories::TodoRepository;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! store.seed_default_catalog();
//! let todos: Arc<dyn TodoRepository> = Arc::new(InMemoryTodoRepository::new(store));
//! ```

pub mod error;
pub mod memory;
pub mod snapshot;

pub use error::{PersistenceError, PersistenceResult};
pub use memory::{InMemoryRelatoRepository, InMemoryTodoRepository, MemoryStore, MemoryTables};
pub use snapshot::SnapshotFile;
