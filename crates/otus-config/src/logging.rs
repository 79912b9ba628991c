//! Tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};
use crate::types::{LogFormat, LoggingConfig};

/// Install the global subscriber, writing to stderr
///
/// `RUST_LOG` wins over `config.level` when set. Fails if a subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| ConfigError::Validation(format!("logging.level: {}", e)))?,
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match config.format {
        LogFormat::Pretty => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| ConfigError::Logging(e.to_string()))
}
