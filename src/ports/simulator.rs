//! Simulator Port
//!
//! The account/order simulator the strategy trades against. The core only
//! reads the position and sends orders; the simulator applies them.

use thiserror::Error;

use crate::domain::{OrderSide, Position};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulatorError {
    #[error("Order rejected: {0}")]
    OrderRejected(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
    #[error("No valid mark price to fill at")]
    NoMarkPrice,
}

/// Account-like simulator capability
#[cfg_attr(test, mockall::automock)]
pub trait SimulatorPort {
    /// Reset the available cash
    fn set_cash_balance(&mut self, amount: f64);

    /// Cash currently available for opening positions
    fn cash_balance(&self) -> f64;

    /// Publish the latest mark price (valuation only)
    fn set_current_price(&mut self, price: f64);

    /// Current position, `None` if nothing has ever been held
    fn position(&self) -> Option<Position>;

    /// Submit a market order for a whole number of units
    fn send_order(&mut self, side: OrderSide, quantity: i64) -> Result<(), SimulatorError>;
}
