// Path: crates/cli/src/util.rs

use anyhow::{anyhow, Context, Result};
use ecopoints_types::config::LedgerConfig;
use std::path::Path;
use zeroize::Zeroizing;

/// Loads, overrides from the environment, and validates a ledger config.
pub fn load_config(path: &Path) -> Result<LedgerConfig> {
    LedgerConfig::from_file(path)
        .with_context(|| format!("Failed to load config {}", path.display()))
}

/// Reads a passphrase from `env_var` if given, otherwise prompts on the terminal.
///
/// With `confirm`, an interactive passphrase must be typed twice.
pub fn read_passphrase(env_var: Option<&str>, confirm: bool) -> Result<Zeroizing<String>> {
    if let Some(var) = env_var {
        let value = std::env::var(var)
            .map_err(|_| anyhow!("passphrase variable {} is not set", var))?;
        return non_empty(Zeroizing::new(value));
    }
    let first = Zeroizing::new(rpassword::prompt_password("Passphrase: ")?);
    if confirm {
        let second = Zeroizing::new(rpassword::prompt_password("Repeat passphrase: ")?);
        if *first != *second {
            return Err(anyhow!("passphrases do not match"));
        }
    }
    non_empty(first)
}

fn non_empty(passphrase: Zeroizing<String>) -> Result<Zeroizing<String>> {
    if passphrase.is_empty() {
        return Err(anyhow!("passphrase cannot be empty"));
    }
    Ok(passphrase)
}
