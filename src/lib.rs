//! Bollinger Breakout - Band breakout strategy simulator library
//!
//! Turns a stream of prices into Bollinger Band breakout signals and trades
//! them against an account-like simulator.
//!
//! # Modules
//!
//! - `domain`: Core types (BandOrientation, PositionSignal, Position, Order)
//! - `ports`: Trait abstractions (SimulatorPort, PriceFeed)
//! - `strategy`: Signal generation (PriceStatistics, classifier, state machine)
//! - `application`: Signal pipeline and position executor
//! - `adapters`: External implementations (paper simulator, CSV, CLI)
//! - `config`: Configuration loading and validation

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod strategy;
