//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    load_config, parse_config, AccountSection, Config, ConfigError, FeedSection, LoggingSection,
    LOG_LEVEL_ENV,
};
