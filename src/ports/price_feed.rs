//! Price Feed Port
//!
//! Pull-based source of prices consumed exactly once per run. Asynchronous
//! producers push into a bounded channel; the pipeline is its only consumer,
//! so prices are handed over strictly one at a time in arrival order.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Default capacity of the price channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeedError {
    #[error("No price received within {0:?}")]
    Timeout(Duration),
    #[error("Failed to parse price at record {record}: {message}")]
    Parse { record: u64, message: String },
    #[error("Failed to read price source: {0}")]
    Io(String),
    #[error("Upstream failure: {0}")]
    Upstream(String),
}

/// An item produced by a price source
pub type PriceEvent = Result<f64, FeedError>;

/// Sending half handed to price producers
pub type PriceSender = mpsc::Sender<PriceEvent>;

#[async_trait]
pub trait PriceFeed: Send {
    /// Next price; `None` once the source is exhausted
    async fn next_price(&mut self) -> Option<PriceEvent>;
}

/// Single-consumer feed backed by a tokio channel
pub struct ChannelPriceFeed {
    rx: mpsc::Receiver<PriceEvent>,
    read_timeout: Option<Duration>,
}

impl ChannelPriceFeed {
    pub fn new(rx: mpsc::Receiver<PriceEvent>) -> Self {
        Self {
            rx,
            read_timeout: None,
        }
    }

    /// Fail with `FeedError::Timeout` if no price arrives within `timeout`
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }
}

/// Create a bounded price channel
pub fn price_channel(capacity: usize) -> (PriceSender, ChannelPriceFeed) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (tx, ChannelPriceFeed::new(rx))
}

#[async_trait]
impl PriceFeed for ChannelPriceFeed {
    async fn next_price(&mut self) -> Option<PriceEvent> {
        match self.read_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.rx.recv()).await {
                Ok(event) => event,
                Err(_) => Some(Err(FeedError::Timeout(limit))),
            },
            None => self.rx.recv().await,
        }
    }
}

/// Feed over an in-memory sequence of price events
pub struct IterPriceFeed<I> {
    inner: I,
}

impl<I> IterPriceFeed<I>
where
    I: Iterator<Item = PriceEvent> + Send,
{
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl IterPriceFeed<std::vec::IntoIter<PriceEvent>> {
    /// Feed that yields every price in order, then ends
    pub fn from_prices(prices: &[f64]) -> Self {
        let events: Vec<PriceEvent> = prices.iter().copied().map(Ok).collect();
        Self::new(events.into_iter())
    }
}

#[async_trait]
impl<I> PriceFeed for IterPriceFeed<I>
where
    I: Iterator<Item = PriceEvent> + Send,
{
    async fn next_price(&mut self) -> Option<PriceEvent> {
        self.inner.next()
    }
}
