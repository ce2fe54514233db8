//! Application Layer
//!
//! Drives the strategy against a simulator: the pipeline sequences each
//! price, the executor turns state machine steps into orders.

pub mod executor;
pub mod pipeline;

pub use executor::PositionExecutor;
pub use pipeline::{PipelineError, RunSummary, SignalPipeline, StrategyRunContext, TickOutcome};
