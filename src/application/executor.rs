//! Position Executor
//!
//! Turns state machine steps into orders against the simulator. Holds no
//! state of its own; the live position is always read back from the
//! simulator before sizing an order.

use tracing::{debug, info};

use crate::domain::{Order, Position, PositionDirection};
use crate::ports::{SimulatorError, SimulatorPort};
use crate::strategy::Transition;

pub struct PositionExecutor<S> {
    simulator: S,
}

impl<S: SimulatorPort> PositionExecutor<S> {
    pub fn new(simulator: S) -> Self {
        Self { simulator }
    }

    /// Live position, flat if the simulator reports none
    pub fn position(&self) -> Position {
        self.simulator.position().unwrap_or_else(Position::flat)
    }

    pub fn direction(&self) -> PositionDirection {
        self.position().direction
    }

    /// Open `direction` with every whole unit the cash balance covers
    ///
    /// Skipped (returns `None`) when already holding a position or when the
    /// balance rounds down to zero units.
    pub fn open(&mut self, direction: PositionDirection) -> Result<Option<Order>, SimulatorError> {
        if !self.position().is_flat() {
            debug!(%direction, "Open skipped: position not flat");
            return Ok(None);
        }

        let cash = self.simulator.cash_balance();
        let quantity = if cash.is_finite() { cash.floor() as i64 } else { 0 };

        let Ok(order) = Order::opening(direction, quantity) else {
            debug!(%direction, cash, "Open skipped: nothing to size");
            return Ok(None);
        };

        self.submit(order)?;
        Ok(Some(order))
    }

    /// Close the position if it is held in `direction`
    pub fn close(&mut self, direction: PositionDirection) -> Result<Option<Order>, SimulatorError> {
        let position = self.position();
        if position.direction != direction {
            return Ok(None);
        }

        let Ok(order) = Order::closing(&position) else {
            return Ok(None);
        };

        self.submit(order)?;
        Ok(Some(order))
    }

    /// Close whichever side is open
    pub fn leave_market(&mut self) -> Result<Option<Order>, SimulatorError> {
        match self.direction() {
            PositionDirection::Flat => Ok(None),
            held => self.close(held),
        }
    }

    /// Run a transition: close first, then open only if flat afterwards
    pub fn apply(&mut self, transition: Transition) -> Result<Vec<Order>, SimulatorError> {
        let mut orders = Vec::with_capacity(2);

        if let Some(held) = transition.close {
            orders.extend(self.close(held)?);
        }
        if let Some(target) = transition.open {
            orders.extend(self.open(target)?);
        }

        Ok(orders)
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut S {
        &mut self.simulator
    }

    pub fn into_inner(self) -> S {
        self.simulator
    }

    fn submit(&mut self, order: Order) -> Result<(), SimulatorError> {
        self.simulator.send_order(order.side, order.quantity)?;
        info!(side = %order.side, quantity = order.quantity, "Order sent");
        Ok(())
    }
}
