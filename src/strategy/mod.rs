//! Strategy Layer - Bollinger Band breakout signal generation
//!
//! Pure signal logic, composed stage by stage:
//! - `PriceStatistics`: rolling window or continuous mean/stddev
//! - `classify`: price + statistics -> band orientation
//! - `DistinctUntilChanged`: drop repeated orientations
//! - `PositionStateMachine`: signal + position direction -> close/open steps
//!
//! `BreakoutStrategy` ties the first two stages together.

pub mod bollinger;
pub mod breakout;
pub mod distinct;
pub mod params;
pub mod state_machine;
pub mod statistics;

pub use bollinger::{classify, BollingerBand};
pub use breakout::BreakoutStrategy;
pub use distinct::DistinctUntilChanged;
pub use params::{
    PriceBasis, StrategyConfig, StrategyConfigError, DEFAULT_STDDEV_FACTOR, DEFAULT_WINDOW_SIZE,
};
pub use state_machine::{PositionStateMachine, Transition};
pub use statistics::{PriceStatistics, StatisticsMode, StatisticsSnapshot};
