//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the breakout simulator.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::adapters::candles::read_close_prices;
use crate::adapters::paper::{Fill, PaperSimulator};
use crate::adapters::synthetic::RandomWalk;
use crate::application::{RunSummary, SignalPipeline};
use crate::config::{load_config, Config, LoggingSection};
use crate::ports::price_channel;
use crate::strategy::{PriceBasis, StrategyConfig};

/// Breakout - Bollinger Band breakout strategy simulator
#[derive(Parser, Debug)]
#[command(
    name = "breakout",
    version = env!("CARGO_PKG_VERSION"),
    about = "Bollinger Band breakout strategy simulator",
    long_about = "Breakout replays close prices through a Bollinger Band breakout \
                  strategy and trades the resulting signals against a paper account."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay close prices from a CSV file
    Run(RunCmd),

    /// Run against a synthetic random-walk price series
    Simulate(SimulateCmd),

    /// Validate a configuration file
    CheckConfig(CheckConfigCmd),
}

/// Output format for run reports
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Price classified against the band
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisArg {
    Tick,
    LastAccepted,
}

impl From<BasisArg> for PriceBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Tick => PriceBasis::Tick,
            BasisArg::LastAccepted => PriceBasis::LastAccepted,
        }
    }
}

/// Strategy and account overrides shared by run and simulate
#[derive(Args, Debug, Clone, Default)]
pub struct StrategyArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override rolling window size (0 = continuous statistics)
    #[arg(short, long, value_name = "N")]
    pub window: Option<usize>,

    /// Override band width in standard deviations
    #[arg(short, long, value_name = "K")]
    pub factor: Option<f64>,

    /// Classify the previous tick's price instead of the current one
    #[arg(long)]
    pub lookahead: bool,

    /// Override which price is classified against the band
    #[arg(long, value_enum, value_name = "BASIS")]
    pub price_basis: Option<BasisArg>,

    /// Override starting cash balance
    #[arg(long, value_name = "AMOUNT")]
    pub cash: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl StrategyArgs {
    /// Config file (or defaults) with command-line overrides applied
    pub fn resolve(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let path = expand_path(path);
                load_config(&path)
                    .with_context(|| format!("Failed to load configuration {}", path.display()))?
            }
            None => Config::default(),
        };

        if let Some(window) = self.window {
            config.strategy.window_size = window;
        }
        if let Some(factor) = self.factor {
            config.strategy.stddev_factor = factor;
        }
        if self.lookahead {
            config.strategy.lookahead = true;
        }
        if let Some(basis) = self.price_basis {
            config.strategy.price_basis = basis.into();
        }
        if let Some(cash) = self.cash {
            config.account.initial_cash = cash;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Replay a candle file
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Candle file (dateTime,open,low,high,close)
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    #[command(flatten)]
    pub strategy: StrategyArgs,

    /// Push prices through the async channel feed
    #[arg(long)]
    pub stream: bool,

    /// Fail if no price arrives within this many milliseconds (with --stream)
    #[arg(long, value_name = "MS")]
    pub read_timeout_ms: Option<u64>,
}

/// Run on synthetic prices
#[derive(Parser, Debug)]
pub struct SimulateCmd {
    #[command(flatten)]
    pub strategy: StrategyArgs,

    /// Number of prices to generate
    #[arg(long, value_name = "N", default_value = "500")]
    pub ticks: usize,

    /// Random seed
    #[arg(long, value_name = "SEED", default_value = "42")]
    pub seed: u64,

    /// Starting price of the walk
    #[arg(long, value_name = "PRICE", default_value = "1.0")]
    pub start_price: f64,
}

/// Validate configuration
#[derive(Parser, Debug)]
pub struct CheckConfigCmd {
    /// Path to configuration file
    #[arg(value_name = "FILE")]
    pub config: PathBuf,
}

/// Everything a finished run reports
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub source: String,
    pub strategy: StrategyConfig,
    pub initial_cash: f64,
    pub summary: RunSummary,
    pub fills: Vec<Fill>,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    match app.command {
        Command::Run(cmd) => {
            let config = cmd.strategy.resolve()?;
            init_logging(app.verbose, app.debug, &config.logging)?;
            run_command(cmd, config).await
        }
        Command::Simulate(cmd) => {
            let config = cmd.strategy.resolve()?;
            init_logging(app.verbose, app.debug, &config.logging)?;
            simulate_command(cmd, config)
        }
        Command::CheckConfig(cmd) => {
            init_logging(app.verbose, app.debug, &LoggingSection::default())?;
            check_config_command(cmd)
        }
    }
}

/// Initialize logging system
///
/// BREAKOUT_LOG wins over the flags, the flags win over the config file.
fn init_logging(verbose: bool, debug: bool, logging: &LoggingSection) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if let Ok(level) = std::env::var(crate::config::LOG_LEVEL_ENV) {
        level
    } else if debug {
        "debug".to_string()
    } else if verbose {
        "info".to_string()
    } else {
        logging.level.clone()
    };

    let filter = EnvFilter::try_new(&level)
        .with_context(|| format!("Invalid log filter {:?}", level))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

/// Handle run command
async fn run_command(cmd: RunCmd, mut config: Config) -> Result<()> {
    let path = expand_path(&cmd.csv);
    tracing::info!(path = %path.display(), stream = cmd.stream, "Replaying candle file");

    if cmd.read_timeout_ms.is_some() {
        config.feed.read_timeout_ms = cmd.read_timeout_ms;
        config.validate().context("Invalid configuration")?;
    }

    let prices = read_close_prices(&path)
        .with_context(|| format!("Failed to open price file {}", path.display()))?;

    let mut pipeline = SignalPipeline::new(config.strategy.clone(), PaperSimulator::new())
        .context("Failed to build signal pipeline")?;
    let initial_cash = config.account.initial_cash;

    let result = if cmd.stream {
        let (tx, mut feed) = price_channel(config.feed.channel_capacity);
        if let Some(timeout) = config.feed.read_timeout() {
            feed = feed.with_read_timeout(timeout);
        }

        let producer = tokio::task::spawn_blocking(move || {
            for event in prices {
                if tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        let result = pipeline.run_feed(initial_cash, &mut feed).await;
        drop(feed);
        producer.await.context("Price producer task failed")?;
        result
    } else {
        pipeline.run(initial_cash, prices)
    };
    let summary = result.with_context(|| format!("Run over {} failed", path.display()))?;

    let report = RunReport {
        source: path.display().to_string(),
        strategy: config.strategy,
        initial_cash,
        summary,
        fills: pipeline.simulator().fills().to_vec(),
    };
    print_report(&report, cmd.strategy.format)
}

/// Handle simulate command
fn simulate_command(cmd: SimulateCmd, config: Config) -> Result<()> {
    tracing::info!(ticks = cmd.ticks, seed = cmd.seed, "Simulating random walk");

    let prices = RandomWalk::new(cmd.seed, cmd.start_price).take_prices(cmd.ticks);

    let mut pipeline = SignalPipeline::new(config.strategy.clone(), PaperSimulator::new())
        .context("Failed to build signal pipeline")?;
    let initial_cash = config.account.initial_cash;
    let summary = pipeline
        .run_prices(initial_cash, prices)
        .context("Simulation failed")?;

    let report = RunReport {
        source: format!("random walk (seed {}, {} ticks)", cmd.seed, cmd.ticks),
        strategy: config.strategy,
        initial_cash,
        summary,
        fills: pipeline.simulator().fills().to_vec(),
    };
    print_report(&report, cmd.strategy.format)
}

/// Handle check-config command
fn check_config_command(cmd: CheckConfigCmd) -> Result<()> {
    let path = expand_path(&cmd.config);
    let config = load_config(&path)
        .with_context(|| format!("Failed to load configuration {}", path.display()))?;

    println!("✓ {} is valid", path.display());
    println!(
        "{}",
        toml::to_string_pretty(&config).context("Failed to render configuration")?
    );
    Ok(())
}

fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("Failed to encode report")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            let strategy = &report.strategy;
            let summary = &report.summary;
            let window = match strategy.window_size {
                0 => "continuous".to_string(),
                n => n.to_string(),
            };

            println!("Bollinger breakout: {}", report.source);
            println!(
                "  Window: {}  Factor: {}  Lookahead: {}",
                window, strategy.stddev_factor, strategy.lookahead
            );
            println!(
                "  Ticks: {} (warmup {}, suppressed {}, dispatched {})",
                summary.ticks, summary.warmup, summary.suppressed, summary.dispatched
            );
            println!("  Orders: {}", summary.orders);
            for fill in &report.fills {
                println!(
                    "    #{:<4} {:<4} {:>12} @ {:.5}  cash {:.2}",
                    fill.id,
                    fill.side.to_string(),
                    fill.quantity, fill.price, fill.cash_after
                );
            }
            println!("  Final position: {}", summary.final_direction);
            println!(
                "  Cash: {:.2} -> {:.2} ({:+.2})",
                report.initial_cash,
                summary.final_cash,
                summary.final_cash - report.initial_cash
            );
        }
    }
    Ok(())
}
