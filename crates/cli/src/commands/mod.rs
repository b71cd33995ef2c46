// Path: crates/cli/src/commands/mod.rs

pub mod address;
pub mod award;
pub mod config;
pub mod keys;
pub mod points;
pub mod serve;
