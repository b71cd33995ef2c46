// Path: crates/types/src/config/mod.rs

//! Configuration structures for the reward ledger engine (`ledger.toml`).
use crate::app::{validate, Account};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `node.url`.
pub const ENV_NODE_URL: &str = "ECOPOINTS_NODE_URL";
/// Environment variable overriding `contract.address`.
pub const ENV_CONTRACT_ADDRESS: &str = "ECOPOINTS_CONTRACT_ADDRESS";
/// Environment variable overriding `sender.address`.
pub const ENV_SENDER_ADDRESS: &str = "ECOPOINTS_SENDER_ADDRESS";

/// The complete engine configuration.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    /// The ledger node endpoint.
    pub node: NodeConfig,
    /// The deployed points contract.
    pub contract: ContractConfig,
    /// The single sending (admin) account that pays for every award.
    pub sender: SenderConfig,
    /// Default gas parameters.
    #[serde(default)]
    pub gas: GasConfig,
    /// Confirmation polling parameters.
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
    /// Retry policy for transient node errors.
    #[serde(default)]
    pub retry: RetryConfig,
    /// The external proof classifier, if proof-gated awards are used.
    #[serde(default)]
    pub oracle: Option<OracleConfig>,
    /// The HTTP gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Metrics and logging endpoints.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Connection settings for the JSON-RPC ledger node.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NodeConfig {
    /// HTTP(S) URL of the node, e.g. `http://127.0.0.1:7545`.
    pub url: String,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// The deployed points contract.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContractConfig {
    /// The contract address.
    pub address: Account,
    /// Optional path to the contract's JSON ABI descriptor.
    #[serde(default)]
    pub abi_path: Option<PathBuf>,
}

/// The sending account and where its key comes from.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SenderConfig {
    /// The sender address. The key provider's key must derive to it.
    pub address: Account,
    /// The key reference. Key material is never written inline.
    pub key: KeySource,
    /// The chain id. Fetched from the node with `eth_chainId` when absent.
    #[serde(default)]
    pub chain_id: Option<u64>,
}

/// A reference to the signing key.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeySource {
    /// A hex-encoded secp256k1 key held in an environment variable.
    Env {
        /// The variable name.
        #[serde(default = "default_key_env")]
        var: String,
    },
    /// A key file in the encrypted V1 envelope.
    EncryptedFile {
        /// The key file path.
        path: PathBuf,
        /// The environment variable holding the file's passphrase.
        #[serde(default = "default_passphrase_env")]
        passphrase_env: String,
    },
}

/// Default gas parameters, overridable per call.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GasConfig {
    /// Gas limit for `awardPoints` calls.
    #[serde(default = "default_gas_limit")]
    pub limit: u64,
    /// Gas price in wei.
    #[serde(default = "default_gas_price_wei")]
    pub price_wei: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            limit: default_gas_limit(),
            price_wei: default_gas_price_wei(),
        }
    }
}

/// How the confirmation manager waits for inclusion.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConfirmationConfig {
    /// Delay between receipt polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Maximum wait for inclusion, in seconds.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub timeout_secs: u64,
}

impl ConfirmationConfig {
    /// The poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The confirmation timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: default_confirmation_timeout_secs(),
        }
    }
}

/// Bounded exponential backoff for transient node errors.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryConfig {
    /// Total attempts per node call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after the first failure, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// The HTTP proof classifier.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OracleConfig {
    /// Endpoint accepting the raw proof bytes via POST.
    pub url: String,
    /// Scores strictly above this value are accepted.
    #[serde(default = "default_oracle_threshold")]
    pub threshold: f64,
    /// Request timeout in seconds.
    #[serde(default = "default_oracle_timeout_secs")]
    pub timeout_secs: u64,
}

/// The HTTP gateway exposing the facade.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Listen address, e.g. `127.0.0.1:8000`.
    #[serde(default = "default_gateway_listen_address")]
    pub listen_address: String,
    /// Maximum request body size in bytes (proofs travel base64-encoded).
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Maximum number of requests served concurrently.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_address: default_gateway_listen_address(),
            max_body_bytes: default_max_body_bytes(),
            concurrency_limit: default_concurrency_limit(),
        }
    }
}

/// Observability endpoints.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TelemetryConfig {
    /// Listen address for `/metrics`, `/healthz` and `/readyz`. Disabled when absent.
    #[serde(default = "default_metrics_address")]
    pub metrics_address: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_address: default_metrics_address(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}
fn default_key_env() -> String {
    "ECOPOINTS_SIGNER_KEY".to_string()
}
fn default_passphrase_env() -> String {
    "ECOPOINTS_KEY_PASS".to_string()
}
fn default_gas_limit() -> u64 {
    2_000_000
}
fn default_gas_price_wei() -> u64 {
    20_000_000_000 // 20 gwei
}
fn default_poll_interval_ms() -> u64 {
    1_000
}
fn default_confirmation_timeout_secs() -> u64 {
    120
}
fn default_max_attempts() -> u32 {
    5
}
fn default_initial_backoff_ms() -> u64 {
    250
}
fn default_max_backoff_ms() -> u64 {
    8_000
}
fn default_oracle_threshold() -> f64 {
    0.5
}
fn default_oracle_timeout_secs() -> u64 {
    30
}
fn default_gateway_listen_address() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_max_body_bytes() -> usize {
    8 * 1024 * 1024
}
fn default_concurrency_limit() -> usize {
    64
}
fn default_metrics_address() -> Option<String> {
    Some("127.0.0.1:9615".to_string())
}

impl LedgerConfig {
    /// Reads, parses, applies environment overrides to, and validates a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without validating it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies the `ECOPOINTS_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var(ENV_NODE_URL) {
            self.node.url = url;
        }
        if let Ok(raw) = std::env::var(ENV_CONTRACT_ADDRESS) {
            self.contract.address = validate(&raw).map_err(|e| ConfigError::Invalid {
                field: "contract.address",
                reason: e.to_string(),
            })?;
        }
        if let Ok(raw) = std::env::var(ENV_SENDER_ADDRESS) {
            self.sender.address = validate(&raw).map_err(|e| ConfigError::Invalid {
                field: "sender.address",
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Rejects values the engine cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            }
        }

        if !(self.node.url.starts_with("http://") || self.node.url.starts_with("https://")) {
            return Err(invalid("node.url", "must be an http:// or https:// URL"));
        }
        if self.node.request_timeout_secs == 0 {
            return Err(invalid("node.request_timeout_secs", "must be positive"));
        }
        if self.contract.address == self.sender.address {
            return Err(invalid(
                "contract.address",
                "must differ from the sender address",
            ));
        }
        if self.sender.chain_id == Some(0) {
            return Err(invalid("sender.chain_id", "must be positive"));
        }
        match &self.sender.key {
            KeySource::Env { var } if var.is_empty() => {
                return Err(invalid("sender.key.var", "must name an environment variable"))
            }
            KeySource::EncryptedFile { passphrase_env, .. } if passphrase_env.is_empty() => {
                return Err(invalid(
                    "sender.key.passphrase_env",
                    "must name an environment variable",
                ))
            }
            _ => {}
        }
        if self.gas.limit == 0 {
            return Err(invalid("gas.limit", "must be positive"));
        }
        if self.gas.price_wei == 0 {
            return Err(invalid("gas.price_wei", "must be positive"));
        }
        if self.confirmation.poll_interval_ms == 0 {
            return Err(invalid("confirmation.poll_interval_ms", "must be positive"));
        }
        if self.confirmation.timeout_secs == 0 {
            return Err(invalid("confirmation.timeout_secs", "must be positive"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(invalid(
                "retry.initial_backoff_ms",
                "must not exceed retry.max_backoff_ms",
            ));
        }
        if let Some(oracle) = &self.oracle {
            if !(0.0..=1.0).contains(&oracle.threshold) {
                return Err(invalid("oracle.threshold", "must be within [0, 1]"));
            }
            if oracle.timeout_secs == 0 {
                return Err(invalid("oracle.timeout_secs", "must be positive"));
            }
        }
        if self.gateway.concurrency_limit == 0 {
            return Err(invalid("gateway.concurrency_limit", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [node]
        url = "http://127.0.0.1:7545"

        [contract]
        address = "0x398028380f1EDD55A4E60904451Fa235027c8E24"

        [sender]
        address = "0x35fff0c795c70f97d04624b2404b9c23bca76357"
        key = { kind = "env", var = "ECO_TEST_KEY" }
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = LedgerConfig::from_toml_str(MINIMAL).unwrap();
        config.validate().unwrap();
        assert_eq!(config.gas.limit, 2_000_000);
        assert_eq!(config.gas.price_wei, 20_000_000_000);
        assert_eq!(config.confirmation.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.confirmation.timeout(), Duration::from_secs(120));
        assert_eq!(config.retry.max_attempts, 5);
        assert!(config.oracle.is_none());
        assert_eq!(config.sender.chain_id, None);
        assert_eq!(
            config.sender.address.to_string(),
            "0x35fFF0c795c70F97D04624B2404B9c23BCa76357"
        );
        assert_eq!(
            config.sender.key,
            KeySource::Env {
                var: "ECO_TEST_KEY".into()
            }
        );
    }

    #[test]
    fn test_encrypted_key_source_defaults_passphrase_env() {
        let text = MINIMAL.replace(
            r#"key = { kind = "env", var = "ECO_TEST_KEY" }"#,
            r#"key = { kind = "encrypted_file", path = "keys/admin.key" }"#,
        );
        let config = LedgerConfig::from_toml_str(&text).unwrap();
        match config.sender.key {
            KeySource::EncryptedFile {
                path,
                passphrase_env,
            } => {
                assert_eq!(path, PathBuf::from("keys/admin.key"));
                assert_eq!(passphrase_env, "ECOPOINTS_KEY_PASS");
            }
            other => panic!("unexpected key source {:?}", other),
        }
    }

    #[test]
    fn test_rejects_invalid_addresses_at_parse_time() {
        let text = MINIMAL.replace(
            "0x398028380f1EDD55A4E60904451Fa235027c8E24",
            "0x398028380f1EDD55A4E60904451Fa235027c8E2",
        );
        assert!(matches!(
            LedgerConfig::from_toml_str(&text),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_attempts_and_bad_url() {
        let mut config = LedgerConfig::from_toml_str(MINIMAL).unwrap();
        config.retry.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "retry.max_attempts",
                ..
            })
        ));

        let mut config = LedgerConfig::from_toml_str(MINIMAL).unwrap();
        config.node.url = "127.0.0.1:7545".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "node.url",
                ..
            })
        ));
    }

    #[test]
    fn test_from_file_reads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        let config = LedgerConfig::from_file(&path).unwrap();
        assert_eq!(config.gateway.listen_address, "127.0.0.1:8000");

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            LedgerConfig::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
