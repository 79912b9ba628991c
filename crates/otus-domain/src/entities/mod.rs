//! Aggregates and records
//!
//! - `todo`: Todo aggregate with close/open bookkeeping
//! - `relato`: Relato aggregate with the resolution toggle
//! - `catalog`: admin-managed tipo/prioridade catalogs

mod catalog;
mod relato;
mod todo;

pub use catalog::*;
pub use relato::*;
pub use todo::*;
