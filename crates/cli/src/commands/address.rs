// Path: crates/cli/src/commands/address.rs

use anyhow::Result;
use clap::Parser;
use ecopoints_types::app::validate;

#[derive(Parser, Debug)]
pub struct AddressArgs {
    /// A hex address in any case, with or without `0x`.
    pub raw: String,
}

pub fn run(args: AddressArgs) -> Result<()> {
    println!("{}", validate(&args.raw)?);
    Ok(())
}
