// Path: crates/tx/src/system/mod.rs

//! Core, non-optional transaction logic that is not tied to one encoding.

pub mod nonce;
