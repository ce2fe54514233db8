//! Position State Machine
//!
//! Turns a position signal plus the current position direction into the
//! close/open steps to perform. The open step only applies if the position
//! is flat after the close step ran, which lets one breakout flip a short
//! straight into a long (or the reverse) within a single tick.
//!
//! | Signal     | Step                                             |
//! |------------|--------------------------------------------------|
//! | OpenLong   | close short if short, then open long if flat     |
//! | OpenShort  | close long if long, then open short if flat      |
//! | CloseShort | close short if short                             |
//! | CloseLong  | close long if long                               |
//! | None       | nothing                                          |
//! | Invalid    | leave market (close whichever side is open)      |

use serde::{Deserialize, Serialize};

use crate::domain::{PositionDirection, PositionSignal};

/// Steps to run for one signal, in order: close first, then open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transition {
    /// Side to close, if currently held
    pub close: Option<PositionDirection>,
    /// Side to open, only if flat once the close has run
    pub open: Option<PositionDirection>,
}

impl Transition {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.close.is_none() && self.open.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PositionStateMachine;

impl PositionStateMachine {
    pub fn new() -> Self {
        Self
    }

    pub fn transition(&self, signal: PositionSignal, direction: PositionDirection) -> Transition {
        match signal {
            PositionSignal::OpenLong => Transition {
                close: close_if(direction, PositionDirection::Short),
                open: Some(PositionDirection::Long),
            },
            PositionSignal::OpenShort => Transition {
                close: close_if(direction, PositionDirection::Long),
                open: Some(PositionDirection::Short),
            },
            PositionSignal::CloseShort => Transition {
                close: close_if(direction, PositionDirection::Short),
                open: None,
            },
            PositionSignal::CloseLong => Transition {
                close: close_if(direction, PositionDirection::Long),
                open: None,
            },
            PositionSignal::None => Transition::none(),
            PositionSignal::Invalid => self.leave_market(direction),
        }
    }

    /// Close whatever is open
    pub fn leave_market(&self, direction: PositionDirection) -> Transition {
        match direction {
            PositionDirection::Flat => Transition::none(),
            held => Transition {
                close: Some(held),
                open: None,
            },
        }
    }
}

fn close_if(current: PositionDirection, held: PositionDirection) -> Option<PositionDirection> {
    (current == held).then_some(held)
}
