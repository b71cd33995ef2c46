// Path: crates/crypto/src/sign/mod.rs

pub mod secp256k1;
