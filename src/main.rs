//! Breakout - Bollinger Band breakout strategy simulator

use anyhow::Result;

use bollinger_breakout::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (BREAKOUT_LOG may live there)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
