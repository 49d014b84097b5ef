pub mod archive;
pub mod config;
pub mod gfa;
pub mod load_config;
pub mod lookup;
pub mod parse;
pub mod pipeline;
pub mod transform;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::RunConfig;
use lookup::{DeliveryLookup, HttpDeliveryLookup};
use pipeline::run_once;
use transform::SentinelClassifier;

#[derive(Parser)]
#[clap(
    name = "annex-bridge",
    version,
    about = "Forward Alma annex pick-request exports to the GFA inventory system"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process at most one waiting export file using the given config file
    Run {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main().
/// Expects configuration already loaded and tracing already initialised.
pub async fn run(config: &RunConfig) -> Result<()> {
    println!("Annex check starting...");
    let classifier = SentinelClassifier;
    let lookup = build_lookup(config)?;
    match run_once(config, &classifier, lookup.as_deref()).await {
        Ok(Some(report)) => {
            println!("Annex check complete.\nReport:");
            println!("{:#?}", report);
            Ok(())
        }
        Ok(None) => {
            println!("Annex check complete. No new export file found.");
            Ok(())
        }
        Err(e) => {
            eprintln!("[ERROR] Processing failed: {}", e);
            Err(e)
        }
    }
}

fn build_lookup(config: &RunConfig) -> Result<Option<Box<dyn DeliveryLookup>>> {
    match &config.lookup {
        Some(lookup_config) => {
            let client = HttpDeliveryLookup::new(
                &lookup_config.base_url,
                Duration::from_secs(lookup_config.timeout_seconds),
            )?;
            Ok(Some(Box::new(client)))
        }
        None => Ok(None),
    }
}
