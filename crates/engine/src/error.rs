// Path: crates/engine/src/error.rs
//! Errors raised while assembling a [`crate::RewardLedger`].

use ecopoints_tx::AbiError;
use ecopoints_types::error::{
    ConfigError, CryptoError, ErrorCode, NodeError, OracleError, SigningError,
};
use thiserror::Error;

/// A failure to start the ledger. Award-time failures are
/// [`ecopoints_types::error::RewardError`]s instead.
#[derive(Error, Debug)]
pub enum SetupError {
    /// The configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The signing key could not be loaded.
    #[error("Failed to load signing key: {0}")]
    Key(#[from] CryptoError),
    /// The key does not control the configured sender.
    #[error("Signer setup failed: {0}")]
    Signing(#[from] SigningError),
    /// The ABI descriptor is missing or does not match the contract interface.
    #[error("Failed to load contract ABI: {0}")]
    Abi(#[from] AbiError),
    /// The node could not be reached (e.g. to fetch the chain id).
    #[error("Failed to reach ledger node: {0}")]
    Node(#[from] NodeError),
    /// The verification oracle client could not be built.
    #[error("Failed to set up verification oracle: {0}")]
    Oracle(#[from] OracleError),
}

impl ErrorCode for SetupError {
    fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "SETUP_CONFIG",
            Self::Key(_) => "SETUP_KEY",
            Self::Signing(_) => "SETUP_SIGNING",
            Self::Abi(_) => "SETUP_ABI",
            Self::Node(_) => "SETUP_NODE",
            Self::Oracle(_) => "SETUP_ORACLE",
        }
    }
}
