// Path: crates/test_utils/src/fixtures/mod.rs
//! Deterministic keys, addresses and configs for reproducible tests

use ecopoints_crypto::StaticKeyProvider;
use ecopoints_types::app::{validate, Account};
use ecopoints_types::config::LedgerConfig;
use ecopoints_types::error::{AddressError, ConfigError, CryptoError};
use std::sync::Arc;

/// The first well-known development key (Hardhat/Anvil account #0).
pub const TEST_KEY_HEX: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// The address [`TEST_KEY_HEX`] controls.
pub const TEST_SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
/// The points contract address used by tests.
pub const TEST_CONTRACT: &str = "0x398028380f1EDD55A4E60904451Fa235027c8E24";
/// A rewarded user.
pub const TEST_USER: &str = "0x35fFF0c795c70F97D04624B2404B9c23BCa76357";
/// A second rewarded user.
pub const TEST_OTHER_USER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
/// The chain id of the local development network.
pub const TEST_CHAIN_ID: u64 = 1337;

/// Parses one of the address constants above.
pub fn account(raw: &str) -> Result<Account, AddressError> {
    validate(raw)
}

/// A key provider holding [`TEST_KEY_HEX`].
pub fn test_key_provider() -> Result<Arc<StaticKeyProvider>, CryptoError> {
    StaticKeyProvider::from_hex(TEST_KEY_HEX).map(Arc::new)
}

/// A config for the test contract and sender with fast polling and retries.
///
/// `node_url` is only used by code that builds its own HTTP client.
pub fn test_config_toml(node_url: &str) -> String {
    format!(
        r#"
[node]
url = "{node_url}"
request_timeout_secs = 2

[contract]
address = "{TEST_CONTRACT}"

[sender]
address = "{TEST_SENDER}"
chain_id = {TEST_CHAIN_ID}
key = {{ kind = "env", var = "ECOPOINTS_TEST_SIGNER_KEY" }}

[confirmation]
poll_interval_ms = 5
timeout_secs = 2

[retry]
max_attempts = 3
initial_backoff_ms = 1
max_backoff_ms = 4
"#
    )
}

/// Parses and validates [`test_config_toml`].
pub fn test_config() -> Result<LedgerConfig, ConfigError> {
    let config = LedgerConfig::from_toml_str(&test_config_toml("http://127.0.0.1:7545"))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecopoints_api::crypto::KeyProvider;
    use ecopoints_crypto::Secp256k1KeyPair;

    #[test]
    fn test_fixtures_are_consistent() {
        let config = test_config().unwrap();
        assert_eq!(config.sender.address, account(TEST_SENDER).unwrap());
        assert_eq!(config.contract.address, account(TEST_CONTRACT).unwrap());
        assert_eq!(config.sender.chain_id, Some(TEST_CHAIN_ID));

        let key = test_key_provider().unwrap().acquire().unwrap();
        let derived = Secp256k1KeyPair::from_scoped_key(&key)
            .unwrap()
            .address()
            .unwrap();
        assert_eq!(derived.to_string(), TEST_SENDER);
    }
}
