//! Breakout Strategy
//!
//! Bollinger Band breakout: price -> statistics -> band orientation.
//! The orientation is later mapped to a position signal; breaking below the
//! lower band goes long, breaking above the upper band goes short, and
//! crossing back over the mean closes.

use super::bollinger::{classify, BollingerBand};
use super::params::{PriceBasis, StrategyConfig, StrategyConfigError};
use super::statistics::PriceStatistics;
use crate::domain::BandOrientation;

#[derive(Debug, Clone)]
pub struct BreakoutStrategy {
    config: StrategyConfig,
    statistics: PriceStatistics,
}

impl BreakoutStrategy {
    pub fn new(config: StrategyConfig) -> Result<Self, StrategyConfigError> {
        config.validate()?;
        let statistics = PriceStatistics::new(config.statistics_mode());
        Ok(Self { config, statistics })
    }

    /// Feed a price into the statistics and classify it
    ///
    /// Returns `None` while the statistics are still warming up.
    pub fn update(&mut self, price: f64) -> Option<BandOrientation> {
        self.statistics.add_value(price);

        if !self.statistics.is_valid() {
            return None;
        }

        Some(self.classify(price))
    }

    /// Classify against the current statistics without updating them
    pub fn classify(&self, price: f64) -> BandOrientation {
        let price = match self.config.price_basis {
            PriceBasis::Tick => price,
            PriceBasis::LastAccepted => self.statistics.last(),
        };
        let snapshot = self.statistics.statistics();
        classify(price, Some(&snapshot), self.config.stddev_factor)
    }

    /// Orientation reported before any price has been seen
    pub fn initial_orientation(&self) -> BandOrientation {
        classify(f64::NAN, None, self.config.stddev_factor)
    }

    /// Current band, once the statistics are valid
    pub fn band(&self) -> Option<BollingerBand> {
        if !self.statistics.is_valid() {
            return None;
        }
        Some(BollingerBand::new(
            &self.statistics.statistics(),
            self.config.stddev_factor,
        ))
    }

    pub fn is_ready(&self) -> bool {
        self.statistics.is_valid()
    }

    pub fn statistics(&self) -> &PriceStatistics {
        &self.statistics
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }
}
