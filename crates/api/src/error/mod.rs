// Path: crates/api/src/error/mod.rs
// Re-export all core error types from the central types crate.
pub use ecopoints_types::error::{
    AddressError, ConfigError, CryptoError, ErrorCode, NodeError, NodeRejection, OracleError,
    RewardError, SigningError, ValidationError,
};
pub use ecopoints_types::Result;
