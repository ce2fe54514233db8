//! Signal Pipeline
//!
//! Per price: mark update -> (optional one-tick delay) -> statistics ->
//! classify -> drop repeats -> state machine -> orders. Each price runs the
//! whole sequence before the next one is admitted. When the stream ends,
//! normally or with an error, the market is left exactly once and the
//! pipeline goes inert.

use std::convert::Infallible;
use std::mem;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::executor::PositionExecutor;
use crate::domain::{BandOrientation, Order, PositionDirection, PositionSignal};
use crate::ports::{FeedError, PriceFeed, SimulatorError, SimulatorPort};
use crate::strategy::{
    BreakoutStrategy, DistinctUntilChanged, PositionStateMachine, StrategyConfig,
    StrategyConfigError,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Simulator error: {0}")]
    Simulator(#[from] SimulatorError),
    #[error("Price feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("Strategy configuration error: {0}")]
    Config(#[from] StrategyConfigError),
}

impl From<Infallible> for PipelineError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// What a single price did to the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TickOutcome {
    /// Statistics not valid yet
    Warmup,
    /// Same orientation as the last emitted one
    Suppressed(BandOrientation),
    /// New orientation, state machine ran
    Dispatched {
        orientation: BandOrientation,
        signal: PositionSignal,
        orders: Vec<Order>,
    },
    /// Pipeline already finished
    Inert,
}

/// Totals for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub warmup: u64,
    pub suppressed: u64,
    pub dispatched: u64,
    pub orders: u64,
    pub final_direction: PositionDirection,
    pub final_cash: f64,
}

/// State owned by a single run
#[derive(Debug, Clone)]
pub struct StrategyRunContext {
    strategy: BreakoutStrategy,
    last_emitted: DistinctUntilChanged<BandOrientation>,
    /// Previous raw price, only present in lookahead mode
    delayed: Option<f64>,
    finished: bool,
}

impl StrategyRunContext {
    pub fn new(config: StrategyConfig) -> Result<Self, StrategyConfigError> {
        let delayed = config.lookahead.then_some(f64::NAN);
        let strategy = BreakoutStrategy::new(config)?;
        let last_emitted = DistinctUntilChanged::with_initial(strategy.initial_orientation());

        Ok(Self {
            strategy,
            last_emitted,
            delayed,
            finished: false,
        })
    }

    /// Price to feed this tick; swaps the delay slot in lookahead mode
    fn admit(&mut self, price: f64) -> f64 {
        match self.delayed.as_mut() {
            Some(slot) => mem::replace(slot, price),
            None => price,
        }
    }

    pub fn strategy(&self) -> &BreakoutStrategy {
        &self.strategy
    }

    pub fn last_orientation(&self) -> BandOrientation {
        *self.last_emitted.last()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    ticks: u64,
    warmup: u64,
    suppressed: u64,
    dispatched: u64,
    orders: u64,
}

pub struct SignalPipeline<S> {
    config: StrategyConfig,
    context: StrategyRunContext,
    machine: PositionStateMachine,
    executor: PositionExecutor<S>,
    counters: Counters,
}

impl<S: SimulatorPort> SignalPipeline<S> {
    pub fn new(config: StrategyConfig, simulator: S) -> Result<Self, PipelineError> {
        let context = StrategyRunContext::new(config.clone())?;

        Ok(Self {
            config,
            context,
            machine: PositionStateMachine::new(),
            executor: PositionExecutor::new(simulator),
            counters: Counters::default(),
        })
    }

    /// Start a fresh run with `initial_cash`
    pub fn begin(&mut self, initial_cash: f64) -> Result<(), PipelineError> {
        self.context = StrategyRunContext::new(self.config.clone())?;
        self.counters = Counters::default();
        self.executor.simulator_mut().set_cash_balance(initial_cash);

        info!(
            initial_cash,
            window_size = self.config.window_size,
            stddev_factor = self.config.stddev_factor,
            lookahead = self.config.lookahead,
            "Run started"
        );
        Ok(())
    }

    /// Process one price through the full pipeline
    ///
    /// A simulator failure leaves the market before the error is returned.
    pub fn on_price(&mut self, price: f64) -> Result<TickOutcome, PipelineError> {
        if self.context.finished {
            return Ok(TickOutcome::Inert);
        }

        match self.tick(price) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(error = %e, price, "Tick failed, leaving market");
                self.cleanup_after_error();
                Err(e)
            }
        }
    }

    fn tick(&mut self, price: f64) -> Result<TickOutcome, PipelineError> {
        self.counters.ticks += 1;
        self.executor.simulator_mut().set_current_price(price);

        let fed = self.context.admit(price);

        let Some(orientation) = self.context.strategy.update(fed) else {
            self.counters.warmup += 1;
            debug!(price, fed, "Warming up");
            return Ok(TickOutcome::Warmup);
        };

        if !self.context.last_emitted.observe(orientation) {
            self.counters.suppressed += 1;
            debug!(price, fed, %orientation, "Orientation unchanged");
            return Ok(TickOutcome::Suppressed(orientation));
        }

        let signal = PositionSignal::from(orientation);
        let direction = self.executor.direction();
        let transition = self.machine.transition(signal, direction);

        info!(price, fed, %orientation, %signal, %direction, "Signal");

        let orders = self.executor.apply(transition)?;

        self.counters.dispatched += 1;
        self.counters.orders += orders.len() as u64;

        Ok(TickOutcome::Dispatched {
            orientation,
            signal,
            orders,
        })
    }

    /// Leave the market once; later calls and ticks do nothing
    pub fn finish(&mut self) -> Result<Option<Order>, PipelineError> {
        if self.context.finished {
            return Ok(None);
        }
        self.context.finished = true;

        let order = self.executor.leave_market()?;
        if order.is_some() {
            self.counters.orders += 1;
        }

        info!(
            ticks = self.counters.ticks,
            orders = self.counters.orders,
            direction = %self.executor.direction(),
            cash = self.executor.simulator().cash_balance(),
            "Run finished"
        );
        Ok(order)
    }

    fn cleanup_after_error(&mut self) {
        if let Err(e) = self.finish() {
            warn!(error = %e, "Leaving market failed during cleanup");
        }
    }

    /// Drive a whole run from a synchronous price source
    ///
    /// The market is always left before returning; an upstream error is
    /// surfaced only after that cleanup.
    pub fn run<I, E>(&mut self, initial_cash: f64, prices: I) -> Result<RunSummary, PipelineError>
    where
        I: IntoIterator<Item = Result<f64, E>>,
        E: Into<PipelineError>,
    {
        self.begin(initial_cash)?;

        for item in prices {
            let price = match item {
                Ok(price) => price,
                Err(e) => {
                    let e = e.into();
                    warn!(error = %e, "Price source failed");
                    self.cleanup_after_error();
                    return Err(e);
                }
            };
            self.on_price(price)?;
        }

        self.finish()?;
        Ok(self.summary())
    }

    /// `run` over plain prices
    pub fn run_prices<I>(&mut self, initial_cash: f64, prices: I) -> Result<RunSummary, PipelineError>
    where
        I: IntoIterator<Item = f64>,
    {
        self.run(initial_cash, prices.into_iter().map(Ok::<f64, Infallible>))
    }

    /// Drive a whole run from an async feed, one price at a time
    pub async fn run_feed<F>(
        &mut self,
        initial_cash: f64,
        feed: &mut F,
    ) -> Result<RunSummary, PipelineError>
    where
        F: PriceFeed + ?Sized,
    {
        self.begin(initial_cash)?;

        while let Some(event) = feed.next_price().await {
            match event {
                Ok(price) => {
                    self.on_price(price)?;
                }
                Err(e) => {
                    warn!(error = %e, "Price feed failed");
                    self.cleanup_after_error();
                    return Err(e.into());
                }
            }
        }

        self.finish()?;
        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.counters.ticks,
            warmup: self.counters.warmup,
            suppressed: self.counters.suppressed,
            dispatched: self.counters.dispatched,
            orders: self.counters.orders,
            final_direction: self.executor.direction(),
            final_cash: self.executor.simulator().cash_balance(),
        }
    }

    pub fn direction(&self) -> PositionDirection {
        self.executor.direction()
    }

    pub fn context(&self) -> &StrategyRunContext {
        &self.context
    }

    pub fn is_finished(&self) -> bool {
        self.context.finished
    }

    pub fn simulator(&self) -> &S {
        self.executor.simulator()
    }

    pub fn into_simulator(self) -> S {
        self.executor.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::PaperSimulator;
    use crate::domain::OrderSide;
    use crate::ports::{IterPriceFeed, MockSimulatorPort};

    fn pipeline(window: usize) -> SignalPipeline<PaperSimulator> {
        let config = StrategyConfig::default().with_window(window);
        SignalPipeline::new(config, PaperSimulator::new()).unwrap()
    }

    const CALM: [f64; 9] = [1.00, 1.01, 0.99, 1.00, 1.01, 0.99, 1.00, 1.01, 0.99];

    #[test]
    fn test_huge_window_from_config_builds() {
        let toml = "[strategy]\nwindow_size = 9223372036854775807\n";
        let config = crate::config::parse_config(toml).unwrap();
        let mut p = SignalPipeline::new(config.strategy, PaperSimulator::new()).unwrap();
        p.begin(100.0).unwrap();
        assert_eq!(p.on_price(1.0).unwrap(), TickOutcome::Warmup);
        p.finish().unwrap();
        assert_eq!(p.direction(), PositionDirection::Flat);
    }

    #[test]
    fn test_warmup_until_window_full() {
        let mut p = pipeline(3);
        p.begin(100.0).unwrap();
        assert_eq!(p.on_price(1.0).unwrap(), TickOutcome::Warmup);
        assert_eq!(p.on_price(1.0).unwrap(), TickOutcome::Warmup);
        assert!(matches!(p.on_price(1.0).unwrap(), TickOutcome::Dispatched { .. }));
    }

    #[test]
    fn test_repeat_orientation_suppressed() {
        let mut p = pipeline(0);
        p.begin(100.0).unwrap();
        assert!(matches!(
            p.on_price(1.0).unwrap(),
            TickOutcome::Dispatched { orientation: BandOrientation::OnMiddle, .. }
        ));
        assert_eq!(
            p.on_price(1.0).unwrap(),
            TickOutcome::Suppressed(BandOrientation::OnMiddle)
        );
    }

    #[test]
    fn test_breakout_opens_long_and_finish_flattens() {
        let mut p = pipeline(10);
        p.begin(100.0).unwrap();
        for price in CALM {
            p.on_price(price).unwrap();
        }

        let outcome = p.on_price(0.5).unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Dispatched {
                orientation: BandOrientation::BelowLower,
                signal: PositionSignal::OpenLong,
                orders: vec![Order { side: OrderSide::Buy, quantity: 100 }],
            }
        );
        assert_eq!(p.direction(), PositionDirection::Long);

        let close = p.finish().unwrap();
        assert_eq!(close, Some(Order { side: OrderSide::Sell, quantity: 100 }));
        assert_eq!(p.direction(), PositionDirection::Flat);
    }

    #[test]
    fn test_finish_is_idempotent_and_inert() {
        let mut p = pipeline(3);
        p.begin(100.0).unwrap();
        p.finish().unwrap();
        assert_eq!(p.finish().unwrap(), None);
        assert_eq!(p.on_price(1.0).unwrap(), TickOutcome::Inert);
        assert!(p.is_finished());
    }

    #[test]
    fn test_lookahead_first_tick_feeds_nothing() {
        let config = StrategyConfig::default().with_window(0).with_lookahead(true);
        let mut p = SignalPipeline::new(config, PaperSimulator::new()).unwrap();
        p.begin(100.0).unwrap();

        assert_eq!(p.on_price(1.0).unwrap(), TickOutcome::Warmup);
        assert_eq!(p.context().strategy().statistics().count(), 0);
        assert!(matches!(
            p.on_price(2.0).unwrap(),
            TickOutcome::Dispatched { orientation: BandOrientation::OnMiddle, .. }
        ));
        assert_eq!(p.context().strategy().statistics().last(), 1.0);
    }

    #[test]
    fn test_begin_resets_run_state() {
        let mut p = pipeline(0);
        let first = p.run_prices(100.0, [1.0, 1.1, 0.9]).unwrap();
        assert_eq!(first.ticks, 3);

        let second = p.run_prices(100.0, [1.0]).unwrap();
        assert_eq!(second.ticks, 1);
        assert_eq!(second.dispatched, 1);
    }

    #[test]
    fn test_upstream_error_flattens_then_surfaces() {
        let mut p = pipeline(10);
        let mut prices: Vec<Result<f64, FeedError>> = CALM.iter().copied().map(Ok).collect();
        prices.push(Ok(0.5));
        prices.push(Err(FeedError::Upstream("socket closed".to_string())));
        prices.push(Ok(1.0));

        let result = p.run(100.0, prices);
        assert!(matches!(result, Err(PipelineError::Feed(FeedError::Upstream(_)))));
        assert_eq!(p.direction(), PositionDirection::Flat);
        assert!(p.is_finished());
        assert_eq!(p.summary().ticks, 10);
    }

    #[test]
    fn test_simulator_failure_runs_cleanup() {
        let mut sim = MockSimulatorPort::new();
        sim.expect_set_cash_balance().return_const(());
        sim.expect_set_current_price().return_const(());
        sim.expect_cash_balance().return_const(10.0);
        sim.expect_position().returning(|| None);
        sim.expect_send_order()
            .times(1)
            .returning(|_, _| Err(SimulatorError::OrderRejected("halted".to_string())));

        let config = StrategyConfig::default().with_window(10);
        let mut p = SignalPipeline::new(config, sim).unwrap();
        p.begin(10.0).unwrap();
        for price in CALM {
            p.on_price(price).unwrap();
        }

        let result = p.on_price(0.5);
        assert!(matches!(result, Err(PipelineError::Simulator(_))));
        assert!(p.is_finished());
        assert_eq!(p.on_price(1.0).unwrap(), TickOutcome::Inert);
    }

    #[tokio::test]
    async fn test_run_feed_matches_run() {
        let prices: Vec<f64> = CALM.iter().copied().chain([0.5, 1.0, 1.5]).collect();

        let mut sync = pipeline(10);
        let expected = sync.run_prices(100.0, prices.clone()).unwrap();

        let mut feed = IterPriceFeed::from_prices(&prices);
        let mut async_pipeline = pipeline(10);
        let summary = async_pipeline.run_feed(100.0, &mut feed).await.unwrap();

        assert_eq!(summary, expected);
        assert_eq!(summary.final_direction, PositionDirection::Flat);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = StrategyConfig::default().with_stddev_factor(f64::NAN);
        assert!(matches!(
            SignalPipeline::new(config, PaperSimulator::new()),
            Err(PipelineError::Config(_))
        ));
    }
}
