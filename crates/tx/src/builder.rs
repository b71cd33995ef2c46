// Path: crates/tx/src/builder.rs
//! Assembles unsigned `awardPoints` transactions from reward intents.

use crate::abi::ContractAbi;
use ecopoints_types::app::{Account, GasOverrides, RewardIntent, UnsignedTransaction};

/// Builds unsigned contract calls against the points contract.
///
/// The builder holds no mutable state: the same intent, sender, nonce and
/// overrides always produce an identical transaction.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    abi: ContractAbi,
    contract: Account,
    chain_id: u64,
    gas_limit: u64,
    gas_price: u128,
}

impl TransactionBuilder {
    /// Creates a builder with the configured gas defaults.
    pub fn new(
        abi: ContractAbi,
        contract: Account,
        chain_id: u64,
        gas_limit: u64,
        gas_price: u128,
    ) -> Self {
        Self {
            abi,
            contract,
            chain_id,
            gas_limit,
            gas_price,
        }
    }

    /// The contract ABI.
    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    /// The points contract address.
    pub fn contract(&self) -> Account {
        self.contract
    }

    /// The chain id every transaction is bound to.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Builds `awardPoints(intent.target, intent.amount)` from `from` at `nonce`.
    pub fn build(
        &self,
        intent: &RewardIntent,
        from: Account,
        nonce: u64,
        overrides: &GasOverrides,
    ) -> UnsignedTransaction {
        UnsignedTransaction {
            from,
            to: self.contract,
            data: self.abi.encode_award_points(intent.target, intent.amount),
            gas_limit: overrides.gas_limit.unwrap_or(self.gas_limit),
            gas_price: overrides.gas_price.unwrap_or(self.gas_price),
            nonce,
            value: 0,
            chain_id: self.chain_id,
        }
    }
}
