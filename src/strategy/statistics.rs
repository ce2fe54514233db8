//! Price Statistics
//!
//! Maintains the sample the Bollinger Band is computed from, either as a
//! fixed-size rolling window or as an unbounded running aggregate.
//!
//! - Windowed: the last N prices, mean and sample standard deviation
//!   recomputed over the window (oldest observation evicted once full)
//! - Continuous: Welford's streaming mean/variance, valid after one price
//!
//! Non-finite prices (NaN, +/-Infinity) are silently ignored.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// How observations are aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatisticsMode {
    /// Rolling window of the last N observations
    Windowed(usize),
    /// Every observation since the start of the run
    Continuous,
}

impl StatisticsMode {
    /// A window size of 0 selects continuous mode
    pub fn from_window_size(window_size: usize) -> Self {
        if window_size > 0 {
            StatisticsMode::Windowed(window_size)
        } else {
            StatisticsMode::Continuous
        }
    }

    /// Observations required before the statistics are usable
    pub fn required_count(&self) -> u64 {
        match self {
            StatisticsMode::Windowed(size) => *size as u64,
            StatisticsMode::Continuous => 1,
        }
    }
}

/// Read-only view of the current statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator), 0 for a single value
    pub stddev: f64,
    pub count: u64,
}

impl StatisticsSnapshot {
    pub fn empty() -> Self {
        Self {
            mean: 0.0,
            stddev: 0.0,
            count: 0,
        }
    }
}

/// Welford accumulator for the continuous mode
#[derive(Debug, Clone, Default)]
struct RunningMoments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    fn snapshot(&self) -> StatisticsSnapshot {
        if self.count == 0 {
            return StatisticsSnapshot::empty();
        }
        let stddev = if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).max(0.0).sqrt()
        };
        StatisticsSnapshot {
            mean: self.mean,
            stddev,
            count: self.count,
        }
    }
}

/// Price sample backing the band
#[derive(Debug, Clone)]
pub struct PriceStatistics {
    mode: StatisticsMode,
    window: VecDeque<f64>,
    running: RunningMoments,
    last: f64,
    accepted: u64,
}

/// Upper bound on the window buffer reserved up front; larger windows grow on demand
const MAX_PREALLOCATED: usize = 4096;

impl PriceStatistics {
    pub fn new(mode: StatisticsMode) -> Self {
        let capacity = match mode {
            StatisticsMode::Windowed(size) => size.min(MAX_PREALLOCATED),
            StatisticsMode::Continuous => 0,
        };
        Self {
            mode,
            window: VecDeque::with_capacity(capacity),
            running: RunningMoments::default(),
            last: f64::NAN,
            accepted: 0,
        }
    }

    /// Incorporate a price; non-finite values are a no-op
    pub fn add_value(&mut self, price: f64) {
        if !price.is_finite() {
            return;
        }

        self.last = price;
        self.accepted += 1;

        match self.mode {
            StatisticsMode::Windowed(size) => {
                self.window.push_back(price);
                while self.window.len() > size {
                    self.window.pop_front();
                }
            }
            StatisticsMode::Continuous => self.running.push(price),
        }
    }

    /// Enough observations for a meaningful mean/stddev
    pub fn is_valid(&self) -> bool {
        self.count() >= self.mode.required_count()
    }

    /// Observations currently contributing to the statistics
    pub fn count(&self) -> u64 {
        match self.mode {
            StatisticsMode::Windowed(_) => self.window.len() as u64,
            StatisticsMode::Continuous => self.running.count,
        }
    }

    pub fn statistics(&self) -> StatisticsSnapshot {
        match self.mode {
            StatisticsMode::Windowed(_) => {
                let count = self.window.len() as u64;
                if count == 0 {
                    return StatisticsSnapshot::empty();
                }
                let mean = self.window.iter().mean();
                let stddev = if count < 2 {
                    0.0
                } else {
                    self.window.iter().std_dev()
                };
                StatisticsSnapshot {
                    mean,
                    stddev,
                    count,
                }
            }
            StatisticsMode::Continuous => self.running.snapshot(),
        }
    }

    /// Most recently accepted finite price, NaN before the first one
    pub fn last(&self) -> f64 {
        self.last
    }

    /// Total finite prices accepted over the run, including evicted ones
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn mode(&self) -> StatisticsMode {
        self.mode
    }
}
