// Path: crates/cli/src/commands/award.rs

use crate::util::load_config;
use anyhow::{ensure, Context, Result};
use clap::Parser;
use ecopoints_engine::{AwardOptions, RewardLedger};
use ecopoints_types::app::GasOverrides;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
pub struct AwardArgs {
    /// Path to the ledger configuration.
    #[clap(long)]
    pub config: PathBuf,
    /// The account receiving the points.
    pub address: String,
    /// The number of points to award.
    pub amount: u64,
    /// Gas limit for this award only.
    #[clap(long)]
    pub gas_limit: Option<u64>,
    /// Gas price in wei for this award only.
    #[clap(long)]
    pub gas_price_wei: Option<u128>,
    /// Give up waiting after this many seconds.
    #[clap(long)]
    pub timeout_secs: Option<u64>,
}

impl AwardArgs {
    fn options(&self) -> Result<AwardOptions> {
        ensure!(self.gas_limit != Some(0), "--gas-limit must be positive");
        ensure!(self.gas_price_wei != Some(0), "--gas-price-wei must be positive");
        ensure!(self.timeout_secs != Some(0), "--timeout-secs must be positive");
        let mut options = match self.timeout_secs {
            Some(secs) => AwardOptions::with_timeout(Duration::from_secs(secs)),
            None => AwardOptions::default(),
        };
        options.gas = GasOverrides {
            gas_limit: self.gas_limit,
            gas_price: self.gas_price_wei,
        };
        Ok(options)
    }
}

pub async fn run(args: AwardArgs) -> Result<()> {
    let options = args.options()?;
    let config = load_config(&args.config)?;
    let ledger = RewardLedger::connect(&config)
        .await
        .context("Failed to set up the reward ledger")?;
    let result = ledger
        .award_points_with(&args.address, args.amount, options)
        .await
        .with_context(|| format!("Failed to award {} points to {}", args.amount, args.address))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
