//! Core configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use otus_domain::{DomainResult, SortDirection, SortField, TodoSort};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub todos: TodoDefaultsConfig,
}

/// Log output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `otus_application=debug`
    pub level: String,
    pub format: LogFormat,
}

/// Where the snapshot store lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub data_path: PathBuf,
    /// Seed the default tipo/prioridade catalog into an empty store
    pub seed_catalog: bool,
}

/// List defaults applied when a query leaves them unset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TodoDefaultsConfig {
    pub default_sort: String,
    pub default_direction: String,
    pub hide_closed_by_default: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./otus-data.json"),
            seed_catalog: true,
        }
    }
}

impl Default for TodoDefaultsConfig {
    fn default() -> Self {
        Self {
            default_sort: "created_at".to_string(),
            default_direction: "desc".to_string(),
            hide_closed_by_default: false,
        }
    }
}

impl TodoDefaultsConfig {
    /// The configured sort, parsed
    pub fn sort(&self) -> DomainResult<TodoSort> {
        let field: SortField = self.default_sort.parse()?;
        let direction: SortDirection = self.default_direction.parse()?;
        Ok(TodoSort::new(field, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [logging]
            format = "json"

            [todos]
            hide_closed_by_default = true
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert!(config.todos.hide_closed_by_default);
        assert_eq!(config.todos.default_sort, "created_at");
        assert!(config.store.seed_catalog);
    }

    #[test]
    fn test_default_sort_parses() {
        let sort = TodoDefaultsConfig::default().sort().unwrap();
        assert_eq!(sort, TodoSort::default());
    }
}
