// Path: crates/types/src/app/account.rs
//! Ledger account identifiers and the address validator.
//!
//! Raw user input is untrusted. The only way to obtain an [`Account`] from text
//! is [`validate`], which normalizes casing so that every spelling of the same
//! account compares equal downstream.

use crate::error::AddressError;
use alloy_primitives::{keccak256, Address};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of hex digits in a 20-byte address.
pub const ADDRESS_HEX_LEN: usize = 40;

/// A validated, non-zero 20-byte ledger address.
///
/// Equality, ordering and hashing are over the raw bytes. `Display` renders the
/// EIP-55 checksum spelling, which is the canonical form used in logs, API
/// responses and configuration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Account(Address);

impl Account {
    /// Wraps an already-decoded address, rejecting the all-zero address.
    pub fn from_address(address: Address) -> Result<Self, AddressError> {
        if address == Address::ZERO {
            return Err(AddressError::Zero);
        }
        Ok(Self(address))
    }

    /// Returns the underlying address.
    pub fn address(&self) -> Address {
        self.0
    }

    /// Returns the raw 20 address bytes.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Renders the account in EIP-55 mixed-case checksum form, `0x`-prefixed.
    pub fn to_checksum(&self) -> String {
        checksum_encode(self.0.as_slice())
    }
}

/// Computes the EIP-55 spelling of a 20-byte address.
///
/// A hex letter is uppercased when the matching nibble of
/// `keccak256(lowercase_hex)` is 8 or greater.
fn checksum_encode(bytes: &[u8]) -> String {
    let lower = hex::encode(bytes);
    let hash = keccak256(lower.as_bytes());
    let mut out = String::with_capacity(2 + ADDRESS_HEX_LEN);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash.as_slice().get(i / 2).copied().unwrap_or_default();
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Validates and normalizes a raw address string.
///
/// Accepts an optional `0x`/`0X` prefix and surrounding whitespace. Rejects
/// empty input, non-hex characters, anything other than 40 hex digits, the
/// all-zero address, and mixed-case input whose casing disagrees with its
/// checksum. All-lowercase and all-uppercase input carries no checksum and is
/// accepted as-is.
pub fn validate(raw: &str) -> Result<Account, AddressError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AddressError::Empty);
    }
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(AddressError::NonHex(bad));
    }
    if digits.len() != ADDRESS_HEX_LEN {
        return Err(AddressError::InvalidLength {
            expected: ADDRESS_HEX_LEN,
            got: digits.len(),
        });
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes)
        .map_err(|e| AddressError::Decode(e.to_string()))?;
    let account = Account::from_address(Address::from(bytes))?;

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        let canonical = account.to_checksum();
        if canonical.get(2..) != Some(digits) {
            return Err(AddressError::ChecksumMismatch {
                expected: canonical,
            });
        }
    }
    Ok(account)
}

impl FromStr for Account {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

impl TryFrom<Address> for Account {
    type Error = AddressError;

    fn try_from(address: Address) -> Result<Self, Self::Error> {
        Self::from_address(address)
    }
}

impl From<Account> for Address {
    fn from(account: Account) -> Self {
        account.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self.to_checksum())
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        validate(&raw).map_err(serde::de::Error::custom)
    }
}
