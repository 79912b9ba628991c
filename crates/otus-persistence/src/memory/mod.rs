//! In-Memory Repository Implementations
//!
//! Thread-safe in-memory implementations of the domain repository
//! interfaces over one shared [`MemoryStore`]. The CLI persists the store
//! between runs through [`crate::snapshot::SnapshotFile`].

mod relato_repository;
mod store;
mod todo_repository;

pub use relato_repository::InMemoryRelatoRepository;
pub use store::{AgendaProjectLink, MemoryStore, MemoryTables, Sequences};
pub use todo_repository::InMemoryTodoRepository;
