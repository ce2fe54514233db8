//! Synthetic Price Generator
//!
//! Seeded geometric random walk for demo runs without a data file.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates a reproducible random-walk price series
pub struct RandomWalk {
    rng: StdRng,
    price: f64,
    /// Maximum relative move per step, e.g. 0.01 for +/-1%
    step_volatility: f64,
    /// Probability of a shock move on any given step
    shock_probability: f64,
    /// Relative size of a shock move
    shock_size: f64,
}

impl RandomWalk {
    pub fn new(seed: u64, start_price: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            price: start_price,
            step_volatility: 0.01,
            shock_probability: 0.02,
            shock_size: 0.08,
        }
    }

    pub fn with_volatility(mut self, step_volatility: f64) -> Self {
        self.step_volatility = step_volatility.abs();
        self
    }

    /// Occasional large moves so the band actually gets broken
    pub fn with_shocks(mut self, probability: f64, size: f64) -> Self {
        self.shock_probability = probability.clamp(0.0, 1.0);
        self.shock_size = size.abs();
        self
    }

    pub fn next_price(&mut self) -> f64 {
        let mut change = self.rng.gen_range(-1.0..=1.0) * self.step_volatility;

        if self.rng.gen_bool(self.shock_probability) {
            let direction = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            change += direction * self.shock_size;
        }

        self.price = (self.price * (1.0 + change)).max(f64::EPSILON);
        self.price
    }

    pub fn take_prices(&mut self, count: usize) -> Vec<f64> {
        (0..count).map(|_| self.next_price()).collect()
    }
}

impl Iterator for RandomWalk {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_price())
    }
}
