//! Configuration Loader
//!
//! Loads and validates configuration from TOML files. Every section is
//! optional and falls back to its defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::ports::DEFAULT_CHANNEL_CAPACITY;
use crate::strategy::StrategyConfig;

/// Environment variable overriding `[logging] level`
pub const LOG_LEVEL_ENV: &str = "BREAKOUT_LOG";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub strategy: StrategyConfig,
    pub account: AccountSection,
    pub feed: FeedSection,
    pub logging: LoggingSection,
}

/// Simulated account section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSection {
    /// Cash balance set at the start of every run
    pub initial_cash: f64,
}

impl Default for AccountSection {
    fn default() -> Self {
        Self {
            initial_cash: 1_000_000.0,
        }
    }
}

/// Price feed section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// Fail the run if no price arrives within this many milliseconds
    pub read_timeout_ms: Option<u64>,
    /// Capacity of the streaming price channel
    pub channel_capacity: usize,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            read_timeout_ms: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl FeedSection {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

/// Logging configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if !self.account.initial_cash.is_finite() || self.account.initial_cash < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "initial_cash must be finite and >= 0, got {}",
                self.account.initial_cash
            )));
        }

        if self.feed.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "channel_capacity must be > 0".to_string(),
            ));
        }

        if self.feed.read_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "read_timeout_ms must be > 0 when set".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.logging.level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::PriceBasis;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[strategy]
window_size = 20
stddev_factor = 2.5
lookahead = true
price_basis = "last_accepted"

[account]
initial_cash = 50000.0

[feed]
read_timeout_ms = 1500
channel_capacity = 64

[logging]
level = "info"
"#
        .to_string()
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.strategy.window_size, 20);
        assert_eq!(config.strategy.stddev_factor, 2.5);
        assert!(config.strategy.lookahead);
        assert_eq!(config.strategy.price_basis, PriceBasis::LastAccepted);
        assert_eq!(config.account.initial_cash, 50000.0);
        assert_eq!(config.feed.read_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.feed.channel_capacity, 64);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.strategy.window_size, 30);
        assert_eq!(config.feed.read_timeout(), None);
    }

    #[test]
    fn test_partial_section() {
        let config = parse_config("[strategy]\nwindow_size = 0\n").unwrap();
        assert_eq!(config.strategy.window_size, 0);
        assert_eq!(config.strategy.stddev_factor, 2.0);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let result = parse_config("[strategy\nwindow_size = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_stddev_factor() {
        let result = parse_config("[strategy]\nstddev_factor = 0.0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_cash() {
        let result = parse_config("[account]\ninitial_cash = -1.0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_feed() {
        assert!(parse_config("[feed]\nchannel_capacity = 0\n").is_err());
        assert!(parse_config("[feed]\nread_timeout_ms = 0\n").is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let result = parse_config("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
