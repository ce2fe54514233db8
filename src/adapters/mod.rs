//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits and the I/O
//! around the core:
//! - Paper: in-memory simulator account
//! - Candles: CSV close-price reader
//! - Synthetic: seeded random-walk prices
//! - CLI: Command-line interface handlers

pub mod candles;
pub mod cli;
pub mod paper;
pub mod synthetic;

pub use candles::{parse_candles, parse_close_prices, read_candles, read_close_prices, Candle};
pub use cli::CliApp;
pub use paper::{Fill, PaperSimulator};
pub use synthetic::RandomWalk;
