//! Otus command-line interface
//!
//! Each invocation loads the JSON snapshot, runs exactly one use case,
//! writes the snapshot back when the command changed something, and prints
//! the response DTO as JSON.

pub mod cli;
pub mod commands;
pub mod output;

pub use cli::Cli;
pub use commands::{execute, run};
