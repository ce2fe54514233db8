//! Domain Layer - Core types for the breakout strategy
//!
//! Pure value types with no external dependencies. The simulator owns the
//! position; everything here only describes it.

pub mod orientation;
pub mod position;
pub mod signal;

pub use orientation::BandOrientation;
pub use position::{Order, OrderSide, Position, PositionDirection, PositionError};
pub use signal::PositionSignal;
