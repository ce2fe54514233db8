//! Strategy Parameters
//!
//! Configuration structs for the Bollinger Band breakout strategy.
//! Defaults match the classic setup: 30 observations, 2 standard deviations.

use serde::{Deserialize, Serialize};

use super::statistics::StatisticsMode;

/// Default number of observations in the rolling window
pub const DEFAULT_WINDOW_SIZE: usize = 30;

/// Default band width in standard deviations
pub const DEFAULT_STDDEV_FACTOR: f64 = 2.0;

/// Which price is classified against the band on each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// The price fed on this tick; a non-finite tick classifies as invalid
    Tick,
    /// The most recent finite price accepted by the statistics
    LastAccepted,
}

impl Default for PriceBasis {
    fn default() -> Self {
        PriceBasis::Tick
    }
}

/// Main strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Observations in the rolling window, 0 for continuous statistics
    pub window_size: usize,
    /// Band half-width in standard deviations
    pub stddev_factor: f64,
    /// Feed the previous tick's price instead of the current one
    pub lookahead: bool,
    /// Price classified against the band
    pub price_basis: PriceBasis,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            stddev_factor: DEFAULT_STDDEV_FACTOR,
            lookahead: false,
            price_basis: PriceBasis::Tick,
        }
    }
}

impl StrategyConfig {
    /// Create a new config with a custom window size (0 = continuous)
    pub fn with_window(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Create a new config with a custom band width
    pub fn with_stddev_factor(mut self, factor: f64) -> Self {
        self.stddev_factor = factor;
        self
    }

    pub fn with_lookahead(mut self, lookahead: bool) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_price_basis(mut self, basis: PriceBasis) -> Self {
        self.price_basis = basis;
        self
    }

    /// Statistics mode implied by the window size
    pub fn statistics_mode(&self) -> StatisticsMode {
        StatisticsMode::from_window_size(self.window_size)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), StrategyConfigError> {
        if !self.stddev_factor.is_finite() || self.stddev_factor <= 0.0 {
            return Err(StrategyConfigError::InvalidStddevFactor(self.stddev_factor));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyConfigError {
    #[error("Invalid stddev factor: {0} (must be finite and > 0)")]
    InvalidStddevFactor(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = StrategyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size, 30);
        assert_eq!(config.stddev_factor, 2.0);
        assert!(!config.lookahead);
        assert_eq!(config.price_basis, PriceBasis::Tick);
    }

    #[test]
    fn test_builders() {
        let config = StrategyConfig::default()
            .with_window(0)
            .with_stddev_factor(2.5)
            .with_lookahead(true)
            .with_price_basis(PriceBasis::LastAccepted);

        assert_eq!(config.statistics_mode(), StatisticsMode::Continuous);
        assert_eq!(config.stddev_factor, 2.5);
        assert!(config.lookahead);
        assert_eq!(config.price_basis, PriceBasis::LastAccepted);
    }

    #[test]
    fn test_invalid_factor() {
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = StrategyConfig::default().with_stddev_factor(factor);
            assert!(matches!(
                config.validate(),
                Err(StrategyConfigError::InvalidStddevFactor(_))
            ));
        }
    }

    #[test]
    fn test_windowed_mode() {
        let config = StrategyConfig::default().with_window(20);
        assert_eq!(config.statistics_mode(), StatisticsMode::Windowed(20));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: StrategyConfig = toml::from_str("lookahead = true").unwrap();
        assert!(config.lookahead);
        assert_eq!(config.window_size, DEFAULT_WINDOW_SIZE);

        let config: StrategyConfig = toml::from_str("price_basis = \"last_accepted\"").unwrap();
        assert_eq!(config.price_basis, PriceBasis::LastAccepted);
    }
}
