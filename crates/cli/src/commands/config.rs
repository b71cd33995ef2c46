// Path: crates/cli/src/commands/config.rs

use crate::util::load_config;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use ecopoints_crypto::Secp256k1KeyPair;
use ecopoints_engine::setup;
use ecopoints_types::config::{KeySource, LedgerConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct ConfigCmdArgs {
    #[clap(subcommand)]
    pub command: ConfigSubCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubCommands {
    /// Parse and validate a ledger configuration.
    Check {
        #[clap(long)]
        config: PathBuf,
        /// Also load the sender key and confirm it controls `sender.address`.
        #[clap(long)]
        keys: bool,
    },
}

pub fn run(args: ConfigCmdArgs) -> Result<()> {
    match args.command {
        ConfigSubCommands::Check { config, keys } => {
            let cfg = load_config(&config)?;
            if keys {
                check_key(&cfg)?;
            }
            for line in summary(&cfg) {
                println!("{}", line);
            }
            println!("Config OK: {}", config.display());
        }
    }
    Ok(())
}

fn check_key(config: &LedgerConfig) -> Result<()> {
    let provider = setup::key_provider(&config.sender.key).context("Failed to load sender key")?;
    let key = provider.acquire()?;
    let actual = Secp256k1KeyPair::from_scoped_key(&key)?.address()?;
    if actual != config.sender.address {
        return Err(anyhow!(
            "sender key controls {}, but sender.address is {}",
            actual,
            config.sender.address
        ));
    }
    Ok(())
}

fn summary(config: &LedgerConfig) -> Vec<String> {
    let key = match &config.sender.key {
        KeySource::Env { var } => format!("env:{}", var),
        KeySource::EncryptedFile { path, .. } => format!("file:{}", path.display()),
    };
    let chain = config
        .sender
        .chain_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "from node".to_string());
    vec![
        format!("node:      {}", config.node.url),
        format!("contract:  {}", config.contract.address),
        format!("sender:    {}", config.sender.address),
        format!("key:       {}", key),
        format!("chain id:  {}", chain),
        format!(
            "oracle:    {}",
            config
                .oracle
                .as_ref()
                .map(|o| o.url.as_str())
                .unwrap_or("disabled")
        ),
        format!("gateway:   {}", config.gateway.listen_address),
    ]
}
