//! Position, order and direction types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Direction of the position held at the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionDirection {
    Flat,
    Long,
    Short,
}

impl Default for PositionDirection {
    fn default() -> Self {
        PositionDirection::Flat
    }
}

impl PositionDirection {
    /// Order side that opens a position in this direction
    pub fn opening_side(&self) -> Option<OrderSide> {
        match self {
            PositionDirection::Long => Some(OrderSide::Buy),
            PositionDirection::Short => Some(OrderSide::Sell),
            PositionDirection::Flat => None,
        }
    }

    /// Order side that closes a position in this direction
    pub fn closing_side(&self) -> Option<OrderSide> {
        match self {
            PositionDirection::Long => Some(OrderSide::Sell),
            PositionDirection::Short => Some(OrderSide::Buy),
            PositionDirection::Flat => None,
        }
    }
}

impl fmt::Display for PositionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionDirection::Flat => write!(f, "Flat"),
            PositionDirection::Long => write!(f, "Long"),
            PositionDirection::Short => write!(f, "Short"),
        }
    }
}

/// Position snapshot as reported by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub direction: PositionDirection,
    /// Signed size in whole units, negative when short
    pub quantity: i64,
}

impl Position {
    /// Derive the direction from the sign of a signed quantity
    pub fn from_signed(quantity: i64) -> Self {
        let direction = match quantity.signum() {
            1 => PositionDirection::Long,
            -1 => PositionDirection::Short,
            _ => PositionDirection::Flat,
        };
        Self { direction, quantity }
    }

    pub fn flat() -> Self {
        Self::from_signed(0)
    }

    /// Unsigned size, used as the closing order quantity
    pub fn size(&self) -> i64 {
        self.quantity.abs()
    }

    pub fn is_flat(&self) -> bool {
        self.direction == PositionDirection::Flat
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Sign applied to the position quantity when this side fills
    pub fn sign(&self) -> i64 {
        match self {
            OrderSide::Buy => 1,
            OrderSide::Sell => -1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A market order for a whole number of units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub side: OrderSide,
    pub quantity: i64,
}

#[derive(Debug, Error, PartialEq)]
pub enum PositionError {
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
    #[error("Cannot size an order in direction {0}")]
    NoDirection(PositionDirection),
}

impl Order {
    pub fn new(side: OrderSide, quantity: i64) -> Result<Self, PositionError> {
        if quantity <= 0 {
            return Err(PositionError::InvalidQuantity(quantity));
        }
        Ok(Self { side, quantity })
    }

    /// Order that opens `quantity` units in `direction`
    pub fn opening(direction: PositionDirection, quantity: i64) -> Result<Self, PositionError> {
        let side = direction
            .opening_side()
            .ok_or(PositionError::NoDirection(direction))?;
        Self::new(side, quantity)
    }

    /// Order that flattens `position`
    pub fn closing(position: &Position) -> Result<Self, PositionError> {
        let side = position
            .direction
            .closing_side()
            .ok_or(PositionError::NoDirection(position.direction))?;
        Self::new(side, position.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_sign() {
        assert_eq!(Position::from_signed(10).direction, PositionDirection::Long);
        assert_eq!(Position::from_signed(-3).direction, PositionDirection::Short);
        assert_eq!(Position::from_signed(0).direction, PositionDirection::Flat);
        assert!(Position::flat().is_flat());
    }

    #[test]
    fn test_size_is_absolute() {
        assert_eq!(Position::from_signed(-42).size(), 42);
        assert_eq!(Position::from_signed(42).size(), 42);
    }

    #[test]
    fn test_opening_orders() {
        let order = Order::opening(PositionDirection::Long, 5).unwrap();
        assert_eq!(order, Order { side: OrderSide::Buy, quantity: 5 });

        let order = Order::opening(PositionDirection::Short, 5).unwrap();
        assert_eq!(order.side, OrderSide::Sell);
    }

    #[test]
    fn test_closing_orders() {
        let order = Order::closing(&Position::from_signed(-7)).unwrap();
        assert_eq!(order, Order { side: OrderSide::Buy, quantity: 7 });

        let order = Order::closing(&Position::from_signed(7)).unwrap();
        assert_eq!(order, Order { side: OrderSide::Sell, quantity: 7 });
    }

    #[test]
    fn test_invalid_orders() {
        assert_eq!(
            Order::new(OrderSide::Buy, 0),
            Err(PositionError::InvalidQuantity(0))
        );
        assert_eq!(
            Order::opening(PositionDirection::Flat, 1),
            Err(PositionError::NoDirection(PositionDirection::Flat))
        );
        assert_eq!(
            Order::closing(&Position::flat()),
            Err(PositionError::NoDirection(PositionDirection::Flat))
        );
    }
}
