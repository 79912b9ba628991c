//! Data Transfer Objects (DTOs) for layer boundary crossing
//!
//! Commands carry raw caller input (strings, integers, patches) and are
//! validated by the use case before any I/O. Responses are flat,
//! serialisable views with display data already joined in.

pub mod catalog;
pub mod relato;
pub mod todo;

// Re-export commonly used DTOs
pub use catalog::*;
pub use relato::*;
pub use todo::*;
