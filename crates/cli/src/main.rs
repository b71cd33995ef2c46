// Path: crates/cli/src/main.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # EcoPoints CLI
//!
//! Awards points, reads balances, manages the sender key, and runs the HTTP
//! gateway.

use anyhow::Result;
use clap::{Parser, Subcommand};

// Import command modules
mod commands;
mod util;

use commands::*;

#[derive(Parser, Debug)]
#[clap(
    name = "ecopoints",
    version,
    about = "Award and query EcoPoints on the points contract.",
    long_about = "Signs awardPoints transactions with the configured sender key, waits for confirmation, and serves the same operations over HTTP."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    // --- Ledger ---
    /// Award points to an address and wait for confirmation.
    Award(award::AwardArgs),

    /// Read the points balance of an address.
    Points(points::PointsArgs),

    // --- Tools ---
    /// Print the checksummed form of an address.
    Address(address::AddressArgs),

    /// Manage the encrypted sender key.
    Keys(keys::KeysArgs),

    /// Validate a ledger configuration.
    Config(config::ConfigCmdArgs),

    // --- Service ---
    /// Run the HTTP gateway and the metrics server.
    Serve(serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // One-shot commands print results on stdout; keep the log stream quiet.
    let filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Serve(_), false) => ecopoints_telemetry::init::DEFAULT_FILTER,
        _ => "warn",
    };
    ecopoints_telemetry::init::init_tracing_with(filter)?;

    match cli.command {
        // --- Ledger ---
        Commands::Award(args) => award::run(args).await,
        Commands::Points(args) => points::run(args).await,

        // --- Tools ---
        Commands::Address(args) => address::run(args),
        Commands::Keys(args) => keys::run(args),
        Commands::Config(args) => config::run(args),

        // --- Service ---
        Commands::Serve(args) => serve::run(args).await,
    }
}
