// Path: crates/engine/src/setup.rs
//! Resolves config references into live components.

use crate::error::SetupError;
use crate::retry::RetryPolicy;
use ecopoints_api::crypto::KeyProvider;
use ecopoints_api::ledger::LedgerNode;
use ecopoints_crypto::{EncryptedFileKeyProvider, EnvKeyProvider};
use ecopoints_tx::ContractAbi;
use ecopoints_types::config::{ContractConfig, KeySource};
use ecopoints_types::error::CryptoError;
use std::sync::Arc;

/// Opens the key provider a [`KeySource`] points at. The key is read and,
/// for key files, decrypted here, once.
pub fn key_provider(source: &KeySource) -> Result<Arc<dyn KeyProvider>, CryptoError> {
    let provider: Arc<dyn KeyProvider> = match source {
        KeySource::Env { var } => Arc::new(EnvKeyProvider::from_env(var)?),
        KeySource::EncryptedFile {
            path,
            passphrase_env,
        } => Arc::new(EncryptedFileKeyProvider::open(path, passphrase_env)?),
    };
    tracing::info!(target: "ledger", source = %provider.describe(), "Signing key loaded");
    Ok(provider)
}

/// Loads the configured ABI descriptor, or the built-in one.
pub fn contract_abi(config: &ContractConfig) -> Result<ContractAbi, SetupError> {
    match &config.abi_path {
        Some(path) => {
            let abi = ContractAbi::from_file(path)?;
            tracing::info!(target: "ledger", path = %path.display(), "Loaded contract ABI");
            Ok(abi)
        }
        None => Ok(ContractAbi::builtin()),
    }
}

/// Uses the configured chain id, or asks the node for it.
pub async fn chain_id(
    configured: Option<u64>,
    node: &dyn LedgerNode,
    retry: &RetryPolicy,
) -> Result<u64, SetupError> {
    if let Some(id) = configured {
        return Ok(id);
    }
    let id = retry.run("eth_chainId", || node.chain_id()).await?;
    tracing::info!(target: "ledger", chain_id = id, "Fetched chain id from node");
    Ok(id)
}
