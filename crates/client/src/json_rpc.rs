// Path: crates/client/src/json_rpc.rs
//! JSON-RPC 2.0 framing and the typed parameters and results of the `eth_*`
//! methods the ledger uses.

use alloy_eips::BlockNumberOrTag;
use alloy_json_rpc::{ErrorPayload, Id, Request, Response, ResponsePayload, RpcParam};
use alloy_primitives::{Address, Bytes, B256, U64};
use ecopoints_types::app::{BlockTag, CallRequest, TransactionReceipt};
use ecopoints_types::error::NodeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Parameters of a method that takes none.
pub(crate) const NO_PARAMS: [u8; 0] = [];

/// Frames a method call.
pub(crate) fn request<P: RpcParam>(method: &'static str, id: u64, params: P) -> Request<P> {
    Request::new(method, Id::Number(id), params)
}

fn rpc_error<E>(error: &ErrorPayload<E>) -> NodeError {
    NodeError::Rpc {
        code: error.code,
        message: error.message.to_string(),
    }
}

/// Splits a response body into its typed result or a [`NodeError`].
pub fn decode_response<T: DeserializeOwned>(body: &[u8]) -> Result<T, NodeError> {
    let response: Response = serde_json::from_slice(body)
        .map_err(|e| NodeError::Malformed(format!("invalid JSON-RPC response: {}", e)))?;
    match response.payload {
        ResponsePayload::Success(result) => serde_json::from_str(result.get())
            .map_err(|e| NodeError::Malformed(format!("unexpected result {}: {}", result, e))),
        ResponsePayload::Failure(error) => Err(rpc_error(&error)),
    }
}

/// Extracts the error object from a body, if it holds one.
pub(crate) fn error_object(body: &[u8]) -> Option<NodeError> {
    match serde_json::from_slice::<Response>(body).ok()?.payload {
        ResponsePayload::Failure(error) => Some(rpc_error(&error)),
        ResponsePayload::Success(_) => None,
    }
}

/// The block parameter of state-reading methods.
pub(crate) fn block_param(tag: BlockTag) -> BlockNumberOrTag {
    match tag {
        BlockTag::Latest => BlockNumberOrTag::Latest,
        BlockTag::Pending => BlockNumberOrTag::Pending,
        BlockTag::Number(n) => BlockNumberOrTag::Number(n),
    }
}

/// The call object of `eth_call`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CallParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<Address>,
    to: Address,
    data: Bytes,
}

impl From<&CallRequest> for CallParams {
    fn from(request: &CallRequest) -> Self {
        Self {
            from: request.from.map(|a| a.address()),
            to: request.to.address(),
            data: request.data.clone(),
        }
    }
}

/// The receipt fields the engine reads; everything else is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcReceipt {
    transaction_hash: B256,
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    gas_used: Option<U64>,
}

impl From<RpcReceipt> for TransactionReceipt {
    fn from(raw: RpcReceipt) -> Self {
        Self {
            transaction_hash: raw.transaction_hash,
            block_number: raw.block_number.map(|n| n.to::<u64>()),
            status: raw.status.map(|n| n.to::<u64>()),
            gas_used: raw.gas_used.map(|n| n.to::<u64>()),
        }
    }
}
