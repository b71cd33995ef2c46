// Path: crates/cli/src/commands/points.rs

use crate::util::load_config;
use anyhow::{Context, Result};
use clap::Parser;
use ecopoints_engine::RewardLedger;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct PointsArgs {
    /// Path to the ledger configuration.
    #[clap(long)]
    pub config: PathBuf,
    /// The account to query.
    pub address: String,
}

pub async fn run(args: PointsArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let ledger = RewardLedger::connect(&config)
        .await
        .context("Failed to set up the reward ledger")?;
    let balance = ledger
        .get_points(&args.address)
        .await
        .with_context(|| format!("Failed to read points of {}", args.address))?;
    println!("{} {}", balance.account, balance.points);
    Ok(())
}
