// Path: crates/cli/src/commands/keys.rs

use crate::util::read_passphrase;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use ecopoints_api::crypto::KeyProvider;
use ecopoints_crypto::key_store::{save_encrypted_file, KdfParams};
use ecopoints_crypto::provider::parse_hex_key;
use ecopoints_crypto::{EncryptedFileKeyProvider, Secp256k1KeyPair};
use ecopoints_types::app::Account;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
pub struct KeysArgs {
    #[clap(subcommand)]
    pub command: KeysCommands,
}

#[derive(Subcommand, Debug)]
pub enum KeysCommands {
    /// Generate a new sender key and store it encrypted.
    Generate {
        /// Where to write the encrypted key file.
        #[clap(long)]
        out: PathBuf,
        /// Read the passphrase from this variable instead of prompting.
        #[clap(long)]
        passphrase_env: Option<String>,
        /// Replace an existing file.
        #[clap(long)]
        force: bool,
    },
    /// Encrypt an existing hex key, read from the terminal.
    Encrypt {
        /// Where to write the encrypted key file.
        #[clap(long)]
        out: PathBuf,
        /// Read the passphrase from this variable instead of prompting.
        #[clap(long)]
        passphrase_env: Option<String>,
        /// Replace an existing file.
        #[clap(long)]
        force: bool,
    },
    /// Print the account controlled by an encrypted key file.
    Address {
        /// The encrypted key file.
        #[clap(long)]
        file: PathBuf,
        /// Read the passphrase from this variable instead of prompting.
        #[clap(long)]
        passphrase_env: Option<String>,
    },
}

pub fn run(args: KeysArgs) -> Result<()> {
    match args.command {
        KeysCommands::Generate {
            out,
            passphrase_env,
            force,
        } => {
            refuse_overwrite(&out, force)?;
            let passphrase = read_passphrase(passphrase_env.as_deref(), true)?;
            let account = generate(&out, &passphrase, KdfParams::default())?;
            println!("Key encrypted and saved to {}", out.display());
            println!("Address: {}", account);
        }
        KeysCommands::Encrypt {
            out,
            passphrase_env,
            force,
        } => {
            refuse_overwrite(&out, force)?;
            let key_hex = Zeroizing::new(rpassword::prompt_password("Secret key (hex): ")?);
            let passphrase = read_passphrase(passphrase_env.as_deref(), true)?;
            let account = encrypt(&out, &key_hex, &passphrase, KdfParams::default())?;
            println!("Key encrypted and saved to {}", out.display());
            println!("Address: {}", account);
        }
        KeysCommands::Address {
            file,
            passphrase_env,
        } => {
            let passphrase = read_passphrase(passphrase_env.as_deref(), false)?;
            println!("{}", address_of(&file, &passphrase)?);
        }
    }
    Ok(())
}

fn refuse_overwrite(out: &Path, force: bool) -> Result<()> {
    if out.exists() && !force {
        return Err(anyhow!(
            "{} already exists; pass --force to replace it",
            out.display()
        ));
    }
    Ok(())
}

/// Generates a key, writes it encrypted to `out`, and returns its account.
pub fn generate(out: &Path, passphrase: &str, params: KdfParams) -> Result<Account> {
    let pair = Secp256k1KeyPair::generate();
    store(out, &pair, passphrase, params)
}

/// Encrypts the hex key `key_hex` to `out` and returns its account.
pub fn encrypt(out: &Path, key_hex: &str, passphrase: &str, params: KdfParams) -> Result<Account> {
    let key = parse_hex_key(key_hex)?;
    let pair = Secp256k1KeyPair::from_scoped_key(&key)?;
    store(out, &pair, passphrase, params)
}

fn store(
    out: &Path,
    pair: &Secp256k1KeyPair,
    passphrase: &str,
    params: KdfParams,
) -> Result<Account> {
    let account = pair.address()?;
    let key = pair.to_scoped_key();
    save_encrypted_file(out, key.expose(), passphrase, params)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(account)
}

/// Decrypts `file` and returns the account its key controls.
pub fn address_of(file: &Path, passphrase: &str) -> Result<Account> {
    let provider = EncryptedFileKeyProvider::open_with_passphrase(file, passphrase)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let key = provider.acquire()?;
    Ok(Secp256k1KeyPair::from_scoped_key(&key)?.address()?)
}
