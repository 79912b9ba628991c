//! Otus configuration
//!
//! Loads [`AppConfig`] from an optional TOML file overlaid with `OTUS__*`
//! environment variables, and sets up the process-wide tracing subscriber.

pub mod error;
pub mod logging;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use logging::init_tracing;
pub use manager::ConfigManager;
pub use types::{AppConfig, LogFormat, LoggingConfig, StoreConfig, TodoDefaultsConfig};
