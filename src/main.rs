use anyhow::Result;
use clap::Parser;

use annex_bridge::config::init_tracing;
use annex_bridge::load_config::load_config;
use annex_bridge::{run, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config_path = match &cli.command {
        Commands::Run { config } => config.clone(),
    };

    // Tracing comes up only after the config is loaded, so the subscriber
    // honours the configured level and file destination.
    let config = load_config(&config_path)?;
    init_tracing(&config.log)?;
    tracing::info!("Application startup: tracing initialised, environment loaded");
    config.trace_loaded();

    let result = run(&config).await;
    match &result {
        Ok(_) => tracing::info!("Run completed successfully"),
        Err(e) => tracing::error!(error = %e, "Run exited with error"),
    }
    result
}
