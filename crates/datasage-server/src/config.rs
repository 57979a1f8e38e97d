//! Configuration system for the DataSage server
//!
//! Loads configuration from:
//! 1. config.yaml - operational settings (port, database, profiling, logging)
//! 2. .env file - loaded into the environment before this runs
//!
//! Environment variables always override config.yaml values.

use datasage_core::{AssistantConfig, FactTarget};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
        }
    }
}

/// Embedded store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// DuckDB file path, or ":memory:"
    pub path: String,

    /// Create and fill the demo tables on startup
    pub seed_demo: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "datasage.duckdb".to_string(),
            seed_demo: true,
        }
    }
}

/// Profiling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Sample rows returned with a table profile
    pub sample_limit: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            sample_limit: datasage_core::profile::DEFAULT_SAMPLE_LIMIT,
        }
    }
}

/// Which table the chat facts and SQL templates describe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSection {
    pub designated_table: String,
    pub region_column: String,
    pub locality_column: String,
}

impl Default for AssistantSection {
    fn default() -> Self {
        let target = FactTarget::default();
        Self {
            designated_table: target.table,
            region_column: target.region_column,
            locality_column: target.locality_column,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stdout, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub profile: ProfileConfig,
    pub assistant: AssistantSection,
    pub logging: LoggingConfig,
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        })
}

impl Config {
    /// Load configuration from YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file means defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        let mut config = Config::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("DATASAGE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("DATASAGE_SERVER_PORT") {
            self.server.port = parse_env("DATASAGE_SERVER_PORT", port)?;
        }

        if let Ok(path) = std::env::var("DATASAGE_DB_PATH") {
            self.database.path = path;
        }
        if let Ok(seed) = std::env::var("DATASAGE_SEED_DEMO") {
            self.database.seed_demo = parse_env("DATASAGE_SEED_DEMO", seed)?;
        }

        if let Ok(limit) = std::env::var("DATASAGE_SAMPLE_LIMIT") {
            self.profile.sample_limit = parse_env("DATASAGE_SAMPLE_LIMIT", limit)?;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.logging.directory = dir;
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.profile.sample_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "profile.sample_limit".to_string(),
                value: "0".to_string(),
            });
        }
        if self.assistant.designated_table.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "assistant.designated_table".to_string(),
                value: self.assistant.designated_table.clone(),
            });
        }
        Ok(())
    }

    /// Engine settings derived from this configuration
    pub fn assistant_config(&self) -> AssistantConfig {
        AssistantConfig {
            sample_limit: self.profile.sample_limit,
            target: FactTarget {
                table: self.assistant.designated_table.clone(),
                region_column: self.assistant.region_column.clone(),
                locality_column: self.assistant.locality_column.clone(),
            },
        }
    }

    /// Set logging environment variables for the logging module
    pub fn apply_logging_env(&self) {
        std::env::set_var("RUST_LOG", &self.logging.level);
        std::env::set_var("LOG_FORMAT", &self.logging.format);
        std::env::set_var("LOG_OUTPUT", &self.logging.output);
        std::env::set_var("LOG_DIR", &self.logging.directory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.database.path, "datasage.duckdb");
        assert!(config.database.seed_demo);
        assert_eq!(config.profile.sample_limit, 5);
        assert_eq!(config.assistant.designated_table, "customers");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "stdout");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
database:
  path: ":memory:"
profile:
  sample_limit: 8
"#,
        )
        .unwrap();

        assert_eq!(config.database.path, ":memory:");
        assert!(config.database.seed_demo);
        assert_eq!(config.profile.sample_limit, 8);
        assert_eq!(config.server.port, 5001);

        let assistant = config.assistant_config();
        assert_eq!(assistant.sample_limit, 8);
        assert_eq!(assistant.target, FactTarget::default());
    }

    #[test]
    fn test_env_var_override() {
        std::env::set_var("DATASAGE_SERVER_PORT", "9090");
        std::env::set_var("DATASAGE_SAMPLE_LIMIT", "3");

        // Create a temp config file
        let config_yaml = r#"
server:
  host: "127.0.0.1"
  port: 5001
database:
  path: "demo.duckdb"
  seed_demo: false
assistant:
  designated_table: "clients"
  region_column: "province"
  locality_column: "town"
"#;
        let temp_file = std::env::temp_dir().join("datasage_test_config.yaml");
        std::fs::write(&temp_file, config_yaml).unwrap();

        let config = Config::load(&temp_file).unwrap();
        assert_eq!(config.server.port, 9090); // Overridden
        assert_eq!(config.profile.sample_limit, 3); // Overridden
        assert!(!config.database.seed_demo);
        assert_eq!(config.assistant_config().target.table, "clients");

        std::env::remove_var("DATASAGE_SERVER_PORT");
        std::env::remove_var("DATASAGE_SAMPLE_LIMIT");
        std::fs::remove_file(temp_file).ok();
    }

    #[test]
    fn test_zero_sample_limit_rejected() {
        let mut config = Config::default();
        config.profile.sample_limit = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("datasage_definitely_missing.yaml");
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.assistant.designated_table, "customers");
    }
}
