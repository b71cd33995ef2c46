// Path: crates/tx/src/error.rs
//! Error types local to the `ecopoints-tx` crate.

use ecopoints_types::error::ErrorCode;
use thiserror::Error;

/// Problems loading or applying the contract ABI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// The ABI file could not be read.
    #[error("Failed to read ABI file {path}: {reason}")]
    Read {
        /// The path that was read.
        path: String,
        /// The underlying I/O error, rendered.
        reason: String,
    },
    /// The descriptor is not a JSON ABI.
    #[error("Failed to parse ABI descriptor: {0}")]
    Parse(String),
    /// The descriptor lacks a function the engine relies on.
    #[error("ABI descriptor does not declare `{0}`")]
    MissingFunction(&'static str),
    /// The descriptor declares the function with an unexpected shape.
    #[error("ABI function `{function}` has unexpected shape: {reason}")]
    Mismatch {
        /// The canonical signature that was checked.
        function: &'static str,
        /// What differed.
        reason: String,
    },
    /// Call or return data could not be decoded.
    #[error("Failed to decode ABI data: {0}")]
    Decode(String),
}

impl ErrorCode for AbiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "ABI_READ",
            Self::Parse(_) => "ABI_PARSE",
            Self::MissingFunction(_) => "ABI_MISSING_FUNCTION",
            Self::Mismatch { .. } => "ABI_MISMATCH",
            Self::Decode(_) => "ABI_DECODE",
        }
    }
}

/// Problems decoding a raw transaction envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The bytes are not valid RLP for a legacy transaction.
    #[error("Invalid RLP: {0}")]
    Rlp(String),
    /// The envelope holds bytes after the transaction list.
    #[error("Trailing bytes after transaction")]
    TrailingBytes,
    /// The signature does not recover to a sender.
    #[error("Invalid signature: {0}")]
    Signature(String),
}

impl From<alloy_rlp::Error> for CodecError {
    fn from(e: alloy_rlp::Error) -> Self {
        Self::Rlp(e.to_string())
    }
}

impl ErrorCode for CodecError {
    fn code(&self) -> &'static str {
        match self {
            Self::Rlp(_) => "CODEC_RLP",
            Self::TrailingBytes => "CODEC_TRAILING_BYTES",
            Self::Signature(_) => "CODEC_SIGNATURE",
        }
    }
}
