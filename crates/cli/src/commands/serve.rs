// Path: crates/cli/src/commands/serve.rs

use crate::util::load_config;
use anyhow::{Context, Result};
use clap::Parser;
use ecopoints_engine::RewardLedger;
use ecopoints_telemetry::http::set_ready;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Path to the ledger configuration.
    #[clap(long)]
    pub config: PathBuf,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    ecopoints_telemetry::prometheus::install().context("Failed to install metrics")?;
    if let Some(raw) = &config.telemetry.metrics_address {
        let addr: SocketAddr = raw
            .parse()
            .with_context(|| format!("Invalid telemetry.metrics_address {}", raw))?;
        tokio::spawn(ecopoints_telemetry::http::run_server(addr));
    }

    let ledger = Arc::new(
        RewardLedger::connect(&config)
            .await
            .context("Failed to set up the reward ledger")?,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(target: "gateway", error = %e, "Failed to install CTRL+C handler");
        }
        shutdown_tx.send(true).ok();
    });

    set_ready(true);
    let served = ecopoints_gateway::run_server(config.gateway.clone(), ledger, shutdown_rx).await;
    set_ready(false);
    served
}
