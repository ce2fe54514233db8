//! Ports Layer - Trait definitions for external collaborators
//!
//! Following hexagonal architecture, these traits abstract:
//! - The account/order simulator the strategy trades against
//! - The price source feeding the pipeline

pub mod price_feed;
pub mod simulator;

pub use price_feed::{
    price_channel, ChannelPriceFeed, FeedError, IterPriceFeed, PriceEvent, PriceFeed,
    PriceSender, DEFAULT_CHANNEL_CAPACITY,
};
pub use simulator::{SimulatorError, SimulatorPort};

#[cfg(test)]
pub use simulator::MockSimulatorPort;
