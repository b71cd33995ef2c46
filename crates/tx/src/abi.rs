// Path: crates/tx/src/abi.rs
//! The points contract ABI: call encoding and return decoding.

use crate::error::AbiError;
use alloy_json_abi::{ContractObject, Function, JsonAbi, StateMutability};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall, SolValue};
use ecopoints_types::app::Account;
use std::path::Path;

sol! {
    /// Credits `points` to `user`. Only the admin account may call it.
    function awardPoints(address user, uint256 points) external;

    /// The points balance of `user`.
    function getPoints(address user) external view returns (uint256);
}

/// Canonical signature of the award function.
pub const AWARD_POINTS_SIGNATURE: &str = <awardPointsCall as SolCall>::SIGNATURE;
/// Canonical signature of the balance getter.
pub const GET_POINTS_SIGNATURE: &str = <getPointsCall as SolCall>::SIGNATURE;

/// The points contract interface.
///
/// Built in, or checked against a JSON ABI descriptor at startup so a
/// misconfigured contract is caught before the first award.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractAbi {
    _checked: (),
}

fn decode_error(e: alloy_sol_types::Error) -> AbiError {
    AbiError::Decode(e.to_string())
}

impl ContractAbi {
    /// The built-in interface.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Loads and checks a JSON ABI file.
    pub fn from_file(path: &Path) -> Result<Self, AbiError> {
        let text = std::fs::read_to_string(path).map_err(|e| AbiError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    /// Parses a JSON ABI, either a bare entry array or a build artifact with
    /// an `abi` field, and checks that both contract functions are declared
    /// with the expected shape.
    pub fn from_json(text: &str) -> Result<Self, AbiError> {
        let abi = match serde_json::from_str::<JsonAbi>(text) {
            Ok(abi) => abi,
            Err(_) => serde_json::from_str::<ContractObject>(text)
                .map_err(|e| AbiError::Parse(e.to_string()))?
                .abi
                .ok_or_else(|| AbiError::Parse("artifact has no abi".into()))?,
        };

        let award = find_function(&abi, "awardPoints", AWARD_POINTS_SIGNATURE)?;
        if award.state_mutability != StateMutability::NonPayable {
            return Err(AbiError::Mismatch {
                function: AWARD_POINTS_SIGNATURE,
                reason: format!("expected nonpayable, found {:?}", award.state_mutability),
            });
        }

        let get = find_function(&abi, "getPoints", GET_POINTS_SIGNATURE)?;
        let outputs: Vec<&str> = get.outputs.iter().map(|p| p.ty.as_str()).collect();
        if outputs != ["uint256"] {
            return Err(AbiError::Mismatch {
                function: GET_POINTS_SIGNATURE,
                reason: format!("expected (uint256) output, found ({})", outputs.join(",")),
            });
        }

        Ok(Self::builtin())
    }

    /// Encodes `awardPoints(target, amount)`.
    pub fn encode_award_points(&self, target: Account, amount: u64) -> Bytes {
        awardPointsCall {
            user: target.address(),
            points: U256::from(amount),
        }
        .abi_encode()
        .into()
    }

    /// Decodes `awardPoints` call data into `(target, amount)`.
    pub fn decode_award_points(&self, data: &[u8]) -> Result<(Address, U256), AbiError> {
        let call = awardPointsCall::abi_decode(data, true).map_err(decode_error)?;
        Ok((call.user, call.points))
    }

    /// Encodes `getPoints(account)`.
    pub fn encode_get_points(&self, account: Account) -> Bytes {
        getPointsCall {
            user: account.address(),
        }
        .abi_encode()
        .into()
    }

    /// Decodes `getPoints` call data into the queried address.
    pub fn decode_get_points(&self, data: &[u8]) -> Result<Address, AbiError> {
        Ok(getPointsCall::abi_decode(data, true)
            .map_err(decode_error)?
            .user)
    }

    /// Encodes a `getPoints` return value.
    pub fn encode_points(&self, points: U256) -> Bytes {
        points.abi_encode().into()
    }

    /// Decodes a `getPoints` return value.
    pub fn decode_points(&self, data: &[u8]) -> Result<U256, AbiError> {
        Ok(getPointsCall::abi_decode_returns(data, true)
            .map_err(decode_error)?
            ._0)
    }
}

fn find_function<'a>(
    abi: &'a JsonAbi,
    name: &str,
    signature: &'static str,
) -> Result<&'a Function, AbiError> {
    abi.function(name)
        .into_iter()
        .flatten()
        .find(|f| f.signature() == signature)
        .ok_or(AbiError::MissingFunction(signature))
}
