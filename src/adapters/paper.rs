//! Paper Simulator
//!
//! In-memory account that fills every order at the current mark price.
//! Tracks cash, a signed unit position and the fill history.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{OrderSide, Position};
use crate::ports::{SimulatorError, SimulatorPort};

/// A single paper fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Sequential fill ID
    pub id: u64,
    pub side: OrderSide,
    pub quantity: i64,
    /// Mark price the order filled at
    pub price: f64,
    /// Cash balance after the fill
    pub cash_after: f64,
    /// Signed position after the fill
    pub position_after: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PaperSimulator {
    cash: f64,
    mark_price: Option<f64>,
    quantity: i64,
    traded: bool,
    fills: Vec<Fill>,
}

impl PaperSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cash(cash: f64) -> Self {
        Self {
            cash,
            ..Self::default()
        }
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Last finite mark price
    pub fn mark_price(&self) -> Option<f64> {
        self.mark_price
    }

    /// Cash plus the position marked to market
    pub fn equity(&self) -> f64 {
        match self.mark_price {
            Some(price) => self.cash + self.quantity as f64 * price,
            None => self.cash,
        }
    }
}

impl SimulatorPort for PaperSimulator {
    fn set_cash_balance(&mut self, amount: f64) {
        self.cash = amount;
    }

    fn cash_balance(&self) -> f64 {
        self.cash
    }

    fn set_current_price(&mut self, price: f64) {
        if price.is_finite() {
            self.mark_price = Some(price);
        } else {
            debug!(price, "Ignoring non-finite mark price");
        }
    }

    fn position(&self) -> Option<Position> {
        self.traded.then(|| Position::from_signed(self.quantity))
    }

    fn send_order(&mut self, side: OrderSide, quantity: i64) -> Result<(), SimulatorError> {
        if quantity <= 0 {
            return Err(SimulatorError::InvalidQuantity(quantity));
        }
        let price = self.mark_price.ok_or(SimulatorError::NoMarkPrice)?;

        let notional = quantity as f64 * price;
        match side {
            OrderSide::Buy => self.cash -= notional,
            OrderSide::Sell => self.cash += notional,
        }
        self.quantity += side.sign() * quantity;
        self.traded = true;

        let fill = Fill {
            id: self.fills.len() as u64 + 1,
            side,
            quantity,
            price,
            cash_after: self.cash,
            position_after: self.quantity,
        };
        info!(
            id = fill.id,
            %side,
            quantity,
            price,
            cash = self.cash,
            position = self.quantity,
            "Paper fill"
        );
        self.fills.push(fill);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PositionDirection;
    use approx::assert_relative_eq;

    #[test]
    fn test_no_position_before_first_trade() {
        let sim = PaperSimulator::with_cash(100.0);
        assert_eq!(sim.position(), None);
        assert_eq!(sim.cash_balance(), 100.0);
    }

    #[test]
    fn test_buy_then_sell_round_trip() {
        let mut sim = PaperSimulator::with_cash(100.0);
        sim.set_current_price(0.8);
        sim.send_order(OrderSide::Buy, 100).unwrap();

        assert_relative_eq!(sim.cash_balance(), 20.0, epsilon = 1e-9);
        assert_eq!(sim.position().unwrap().direction, PositionDirection::Long);

        sim.set_current_price(1.2);
        assert_relative_eq!(sim.equity(), 140.0, epsilon = 1e-9);

        sim.send_order(OrderSide::Sell, 100).unwrap();
        assert_relative_eq!(sim.cash_balance(), 140.0, epsilon = 1e-9);
        assert!(sim.position().unwrap().is_flat());
        assert_eq!(sim.fills().len(), 2);
        assert_eq!(sim.fills()[1].position_after, 0);
    }

    #[test]
    fn test_short_sale_credits_cash() {
        let mut sim = PaperSimulator::with_cash(50.0);
        sim.set_current_price(2.0);
        sim.send_order(OrderSide::Sell, 50).unwrap();

        assert_relative_eq!(sim.cash_balance(), 150.0, epsilon = 1e-9);
        let position = sim.position().unwrap();
        assert_eq!(position.direction, PositionDirection::Short);
        assert_eq!(position.quantity, -50);
    }

    #[test]
    fn test_non_finite_mark_keeps_last_price() {
        let mut sim = PaperSimulator::new();
        sim.set_current_price(1.5);
        sim.set_current_price(f64::NAN);
        sim.set_current_price(f64::INFINITY);
        assert_eq!(sim.mark_price(), Some(1.5));
    }

    #[test]
    fn test_rejects_without_mark_price() {
        let mut sim = PaperSimulator::with_cash(10.0);
        assert_eq!(
            sim.send_order(OrderSide::Buy, 1),
            Err(SimulatorError::NoMarkPrice)
        );
        assert!(sim.fills().is_empty());
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let mut sim = PaperSimulator::with_cash(10.0);
        sim.set_current_price(1.0);
        assert_eq!(
            sim.send_order(OrderSide::Sell, 0),
            Err(SimulatorError::InvalidQuantity(0))
        );
    }
}
