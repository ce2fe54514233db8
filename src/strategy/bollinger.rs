//! Bollinger Band Classifier
//!
//! Maps a price and a statistics snapshot to a band orientation.
//!
//! Band: middle = mean, upper/lower = mean +/- factor * stddev
//!
//! Comparisons are strict and ordered, first match wins:
//! 1. price < lower  -> BelowLower
//! 2. price > upper  -> AboveUpper
//! 3. price < mean   -> BelowMiddle
//! 4. price > mean   -> AboveMiddle
//! 5. otherwise      -> OnMiddle
//!
//! A price exactly on a band edge therefore classifies as inside the band.

use serde::{Deserialize, Serialize};

use super::statistics::StatisticsSnapshot;
use crate::domain::BandOrientation;

/// Lower, middle and upper lines of a Bollinger Band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBand {
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
}

impl BollingerBand {
    pub fn new(stats: &StatisticsSnapshot, stddev_factor: f64) -> Self {
        let half_width = stddev_factor * stats.stddev;
        Self {
            lower: stats.mean - half_width,
            middle: stats.mean,
            upper: stats.mean + half_width,
        }
    }

    /// Orientation of a finite price relative to this band
    pub fn orientation(&self, price: f64) -> BandOrientation {
        if !price.is_finite() {
            return BandOrientation::Invalid;
        }

        if price < self.lower {
            BandOrientation::BelowLower
        } else if price > self.upper {
            BandOrientation::AboveUpper
        } else if price < self.middle {
            BandOrientation::BelowMiddle
        } else if price > self.middle {
            BandOrientation::AboveMiddle
        } else {
            BandOrientation::OnMiddle
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Classify `price` against the band built from `stats`
///
/// Returns `Invalid` for a non-finite price or missing/empty statistics.
pub fn classify(
    price: f64,
    stats: Option<&StatisticsSnapshot>,
    stddev_factor: f64,
) -> BandOrientation {
    match stats {
        Some(stats) if price.is_finite() && stats.count >= 1 => {
            BollingerBand::new(stats, stddev_factor).orientation(price)
        }
        _ => BandOrientation::Invalid,
    }
}
