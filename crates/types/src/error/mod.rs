// Path: crates/types/src/error/mod.rs
//! Core error types for the EcoPoints reward ledger.

use crate::app::{Account, TransactionResult, TxStatus};
use alloy_primitives::B256;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Reasons a raw address string is rejected by the validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The input was empty or whitespace.
    #[error("Address is empty")]
    Empty,
    /// The input contained a character outside `[0-9a-fA-F]`.
    #[error("Address contains non-hex character {0:?}")]
    NonHex(char),
    /// The input did not contain exactly 40 hex digits.
    #[error("Address must be {expected} hex digits, got {got}")]
    InvalidLength {
        /// The required number of hex digits.
        expected: usize,
        /// The number supplied.
        got: usize,
    },
    /// Hex decoding failed.
    #[error("Address is not valid hex: {0}")]
    Decode(String),
    /// The all-zero address is never a valid reward target or sender.
    #[error("The zero address is not a valid account")]
    Zero,
    /// Mixed-case input whose casing disagrees with its EIP-55 checksum.
    #[error("Address checksum mismatch; expected {expected}")]
    ChecksumMismatch {
        /// The correctly checksummed spelling.
        expected: String,
    },
}

impl ErrorCode for AddressError {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "ADDRESS_EMPTY",
            Self::NonHex(_) => "ADDRESS_NON_HEX",
            Self::InvalidLength { .. } => "ADDRESS_INVALID_LENGTH",
            Self::Decode(_) => "ADDRESS_DECODE",
            Self::Zero => "ADDRESS_ZERO",
            Self::ChecksumMismatch { .. } => "ADDRESS_CHECKSUM_MISMATCH",
        }
    }
}

/// Input that is rejected before any transaction is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The target address is malformed.
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),
    /// The proof carried no bytes.
    #[error("Proof artifact is empty")]
    EmptyProof,
    /// The same proof already backs an in-flight or confirmed award.
    #[error("Proof {0} has already been used for an award")]
    DuplicateProof(B256),
    /// Any other malformed request field.
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl ErrorCode for ValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::Address(_) => "VALIDATION_ADDRESS",
            Self::EmptyProof => "VALIDATION_EMPTY_PROOF",
            Self::DuplicateProof(_) => "VALIDATION_DUPLICATE_PROOF",
            Self::Invalid(_) => "VALIDATION_INVALID",
        }
    }
}

/// Failures of the verification step itself, as opposed to a rejection verdict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The oracle could not be reached.
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
    /// The oracle answered with an unexpected HTTP status.
    #[error("Oracle returned HTTP {status}: {body}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// A snippet of the response body.
        body: String,
    },
    /// The oracle's answer could not be interpreted.
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
    /// Proof verification was requested but no oracle is configured.
    #[error("No verification oracle is configured")]
    NotConfigured,
}

impl ErrorCode for OracleError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "ORACLE_UNAVAILABLE",
            Self::Http { .. } => "ORACLE_HTTP",
            Self::MalformedResponse(_) => "ORACLE_MALFORMED_RESPONSE",
            Self::NotConfigured => "ORACLE_NOT_CONFIGURED",
        }
    }
}

/// Well-known ways a node refuses a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRejection {
    /// The node already holds this exact transaction.
    AlreadyKnown,
    /// The nonce has already been used by a mined or pooled transaction.
    NonceTooLow,
    /// The nonce leaves a gap after the node's pending count.
    NonceTooHigh,
    /// The gas price is below the node's floor or too low to replace a pooled transaction.
    Underpriced,
    /// The sender cannot pay for gas.
    InsufficientFunds,
}

/// Failures talking to the ledger node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// The request never produced an HTTP response (refused, reset, timed out).
    #[error("Node transport error: {0}")]
    Transport(String),
    /// The node answered with a non-success HTTP status.
    #[error("Node returned HTTP {status}: {body}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// A snippet of the response body.
        body: String,
    },
    /// The node answered with a JSON-RPC error object.
    #[error("Node RPC error {code}: {message}")]
    Rpc {
        /// The JSON-RPC error code.
        code: i64,
        /// The error message.
        message: String,
    },
    /// The node's answer could not be decoded.
    #[error("Malformed node response: {0}")]
    Malformed(String),
}

impl NodeError {
    /// Returns `true` if the failure reflects a transient network or node
    /// condition, so repeating the identical request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Malformed(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            // -32603 internal error, -32005 limit exceeded.
            Self::Rpc { code, .. } => {
                self.rejection().is_none() && matches!(*code, -32603 | -32005)
            }
        }
    }

    /// Classifies an RPC error message into a known rejection, if it is one.
    pub fn rejection(&self) -> Option<NodeRejection> {
        let Self::Rpc { message, .. } = self else {
            return None;
        };
        let message = message.to_ascii_lowercase();
        if message.contains("already known") || message.contains("known transaction") {
            Some(NodeRejection::AlreadyKnown)
        } else if message.contains("nonce too low") {
            Some(NodeRejection::NonceTooLow)
        } else if message.contains("nonce too high") || message.contains("nonce gap") {
            Some(NodeRejection::NonceTooHigh)
        } else if message.contains("underpriced") {
            Some(NodeRejection::Underpriced)
        } else if message.contains("insufficient funds") {
            Some(NodeRejection::InsufficientFunds)
        } else {
            None
        }
    }
}

impl ErrorCode for NodeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "NODE_TRANSPORT",
            Self::Http { .. } => "NODE_HTTP",
            Self::Rpc { .. } => match self.rejection() {
                Some(NodeRejection::AlreadyKnown) => "NODE_ALREADY_KNOWN",
                Some(NodeRejection::NonceTooLow) => "NODE_NONCE_TOO_LOW",
                Some(NodeRejection::NonceTooHigh) => "NODE_NONCE_TOO_HIGH",
                Some(NodeRejection::Underpriced) => "NODE_UNDERPRICED",
                Some(NodeRejection::InsufficientFunds) => "NODE_INSUFFICIENT_FUNDS",
                None => "NODE_RPC",
            },
            Self::Malformed(_) => "NODE_MALFORMED",
        }
    }
}

/// Errors from key handling and cryptographic primitives.
///
/// Messages describe what failed, never the key material involved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The input was malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The key bytes do not form a valid key.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// A primitive operation failed.
    #[error("Operation failed: {0}")]
    OperationFailed(String),
    /// The format or algorithm is not supported.
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// The key could not be obtained from its source.
    #[error("Key unavailable: {0}")]
    KeyUnavailable(String),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "CRYPTO_INVALID_INPUT",
            Self::InvalidKey(_) => "CRYPTO_INVALID_KEY",
            Self::OperationFailed(_) => "CRYPTO_OPERATION_FAILED",
            Self::Unsupported(_) => "CRYPTO_UNSUPPORTED",
            Self::KeyUnavailable(_) => "CRYPTO_KEY_UNAVAILABLE",
        }
    }
}

/// Fatal signing failures. Signing fails closed: none of these ever yields a
/// transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// The unsigned transaction has undefined semantics.
    #[error("Refusing to sign malformed transaction: {0}")]
    MalformedTransaction(String),
    /// The key does not belong to the transaction's sender.
    #[error("Signing key belongs to {actual}, transaction is from {expected}")]
    KeyMismatch {
        /// The transaction's `from`.
        expected: Account,
        /// The address derived from the key.
        actual: Account,
    },
    /// The key could not be acquired or used.
    #[error("Signing key error: {0}")]
    Key(#[from] CryptoError),
}

impl ErrorCode for SigningError {
    fn code(&self) -> &'static str {
        match self {
            Self::MalformedTransaction(_) => "SIGNING_MALFORMED_TRANSACTION",
            Self::KeyMismatch { .. } => "SIGNING_KEY_MISMATCH",
            Self::Key(_) => "SIGNING_KEY_ERROR",
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// The path that was read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML for `LedgerConfig`.
    #[error("Failed to parse config: {0}")]
    Parse(String),
    /// A field holds an unusable value.
    #[error("Invalid config field `{field}`: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why it is unusable.
        reason: String,
    },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "CONFIG_READ",
            Self::Parse(_) => "CONFIG_PARSE",
            Self::Invalid { .. } => "CONFIG_INVALID",
        }
    }
}

/// The error surfaced to callers of the reward ledger facade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewardError {
    /// Bad address, amount or proof. Never retried.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// The oracle judged the proof invalid. No transaction was attempted.
    #[error("Proof rejected by oracle: {reason}")]
    OracleRejected {
        /// The oracle's reason.
        reason: String,
    },
    /// The verification step itself failed. Retryable at the caller's discretion.
    #[error("Oracle failure: {0}")]
    Oracle(#[from] OracleError),
    /// The node failed after local retries were exhausted, or refused the transaction.
    #[error("Node error: {0}")]
    Node(#[from] NodeError),
    /// The transaction was mined but its contract call reverted; no points were awarded.
    #[error("Transaction {} reverted in block {:?}", .0.hash(), .0.block_number())]
    Reverted(TransactionResult),
    /// Inclusion was not observed in time. The outcome is unknown: query the
    /// balance before deciding to retry with a fresh nonce.
    #[error("Timed out waiting for transaction {hash:?}; outcome unknown, check balance before retrying")]
    TimedOut {
        /// The hash, if the payload may have reached the node.
        hash: Option<B256>,
    },
    /// Key or transaction malformation. Never retried.
    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),
    /// A transaction result was settled twice.
    #[error("Invalid result transition: {0}")]
    State(#[from] TransitionError),
}

impl RewardError {
    /// Returns `true` only for the kinds a caller may reasonably retry as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Oracle(_) | Self::Node(_))
    }

    /// The transaction hash associated with the failure, if one exists.
    pub fn transaction_hash(&self) -> Option<B256> {
        match self {
            Self::Reverted(result) => Some(result.hash()),
            Self::TimedOut { hash } => *hash,
            Self::State(e) => Some(e.hash),
            _ => None,
        }
    }

    /// The short error kind label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::OracleRejected { .. } => "oracle_rejected",
            Self::Oracle(_) => "oracle",
            Self::Node(_) => "node",
            Self::Reverted(_) => "reverted",
            Self::TimedOut { .. } => "timed_out",
            Self::Signing(_) => "signing",
            Self::State(_) => "state",
        }
    }
}

/// A status change refused because the transaction result is already terminal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Transaction {hash} is already {from:?} and cannot become {to:?}")]
pub struct TransitionError {
    /// The transaction whose result was being settled.
    pub hash: B256,
    /// The terminal status it already holds.
    pub from: TxStatus,
    /// The status that was refused.
    pub to: TxStatus,
}

impl ErrorCode for TransitionError {
    fn code(&self) -> &'static str {
        "STATE_TERMINAL"
    }
}

impl From<AddressError> for RewardError {
    fn from(e: AddressError) -> Self {
        Self::Validation(ValidationError::Address(e))
    }
}

impl ErrorCode for RewardError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "REWARD_VALIDATION",
            Self::OracleRejected { .. } => "REWARD_ORACLE_REJECTED",
            Self::Oracle(_) => "REWARD_ORACLE_ERROR",
            Self::Node(_) => "REWARD_NODE_ERROR",
            Self::Reverted(_) => "REWARD_REVERTED",
            Self::TimedOut { .. } => "REWARD_TIMED_OUT",
            Self::Signing(_) => "REWARD_SIGNING",
            Self::State(_) => "REWARD_STATE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpc(message: &str) -> NodeError {
        NodeError::Rpc {
            code: -32000,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(NodeError::Transport("connection refused".into()).is_transient());
        assert!(NodeError::Malformed("eof".into()).is_transient());
        assert!(NodeError::Http { status: 503, body: String::new() }.is_transient());
        assert!(NodeError::Http { status: 429, body: String::new() }.is_transient());
        assert!(!NodeError::Http { status: 400, body: String::new() }.is_transient());
        assert!(!rpc("transaction underpriced").is_transient());
        assert!(NodeError::Rpc { code: -32603, message: "internal".into() }.is_transient());
    }

    #[test]
    fn test_rejection_classification() {
        assert_eq!(rpc("already known").rejection(), Some(NodeRejection::AlreadyKnown));
        assert_eq!(
            rpc("the tx doesn't have the correct nonce. Nonce too low").rejection(),
            Some(NodeRejection::NonceTooLow)
        );
        assert_eq!(
            rpc("nonce too high: next nonce 0, tx nonce 1").rejection(),
            Some(NodeRejection::NonceTooHigh)
        );
        assert_eq!(
            rpc("replacement transaction underpriced").rejection(),
            Some(NodeRejection::Underpriced)
        );
        assert_eq!(
            rpc("insufficient funds for gas * price + value").rejection(),
            Some(NodeRejection::InsufficientFunds)
        );
        assert_eq!(rpc("execution reverted").rejection(), None);
        assert_eq!(rpc("nonce too low").code(), "NODE_NONCE_TOO_LOW");
    }

    #[test]
    fn test_reward_error_codes_and_hashes() {
        let hash = B256::repeat_byte(7);
        let mut reverted = TransactionResult::pending(hash);
        reverted.revert(12).unwrap();
        let err = RewardError::Reverted(reverted);
        assert_eq!(err.code(), "REWARD_REVERTED");
        assert_eq!(err.transaction_hash(), Some(hash));
        assert!(!err.is_retryable());

        let timed_out = RewardError::TimedOut { hash: Some(hash) };
        assert!(!timed_out.is_retryable());
        assert!(timed_out.to_string().contains("check balance"));

        let from_addr: RewardError = AddressError::Zero.into();
        assert_eq!(from_addr.code(), "REWARD_VALIDATION");
        assert!(RewardError::Oracle(OracleError::NotConfigured).is_retryable());
    }

    #[test]
    fn test_second_settlement_is_a_state_error() {
        let hash = B256::repeat_byte(9);
        let mut result = TransactionResult::pending(hash);
        result.confirm(3).unwrap();
        let err: RewardError = result.fail().unwrap_err().into();
        assert_eq!(err.code(), "REWARD_STATE");
        assert_eq!(err.kind(), "state");
        assert_eq!(err.transaction_hash(), Some(hash));
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("Confirmed"));
    }
}
