//! CLI entry point: `docsortd serve` runs the ingest API, `docsortd
//! worker` runs a classification worker (SPEC_FULL.md §A).

mod serve;
mod worker;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "docsortd")]
#[command(about = "Distributed document classification pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ingest API and the scaling controller.
    Serve {
        /// Override the configured bind address (host:port).
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run a single classification worker loop.
    Worker {
        /// Override the configured worker id (also settable via WORKER_ID).
        #[arg(long)]
        id: Option<String>,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::from_env();

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.bind_addr = bind;
            }
            info!(bind_addr = %settings.bind_addr, "starting docsortd serve");
            serve::run(Arc::new(settings)).await
        }
        Commands::Worker { id } => {
            if let Some(id) = id {
                settings.worker_id = id;
            }
            info!(worker_id = %settings.worker_id, "starting docsortd worker");
            worker::run(Arc::new(settings)).await
        }
    }
}
