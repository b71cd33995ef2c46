// Path: crates/client/src/ledger_client/mod.rs

use crate::json_rpc::{
    block_param, decode_response, error_object, request as frame, CallParams, RpcReceipt,
    NO_PARAMS,
};
use alloy_json_rpc::RpcParam;
use alloy_primitives::U64;
use async_trait::async_trait;
use ecopoints_api::ledger::LedgerNode;
use ecopoints_telemetry::{ledger_metrics, time::Timer};
use ecopoints_types::app::{Account, BlockTag, CallRequest, TransactionReceipt};
use ecopoints_types::error::NodeError;
use ecopoints_types::{Bytes, B256};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// Upper bound on how much of an error body is kept in `NodeError::Http`.
const ERROR_BODY_SNIPPET: usize = 256;

fn map_transport_error(e: reqwest::Error) -> NodeError {
    if e.is_timeout() {
        NodeError::Transport(format!("request timed out: {}", e))
    } else if e.is_connect() {
        NodeError::Transport(format!("connection failed: {}", e))
    } else {
        NodeError::Transport(e.to_string())
    }
}

fn snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.chars().take(ERROR_BODY_SNIPPET).collect()
}

/// A [`LedgerNode`] speaking JSON-RPC 2.0 over HTTP(S).
pub struct HttpLedgerClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl std::fmt::Debug for HttpLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLedgerClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HttpLedgerClient {
    /// Creates a client for the node at `url`. Every request is bounded by
    /// `request_timeout`. No connection is made until the first call.
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self, NodeError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| NodeError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    /// The node URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request<P, R>(&self, method: &'static str, params: P) -> Result<R, NodeError>
    where
        P: RpcParam,
        R: DeserializeOwned + Send,
    {
        let _timer = Timer::new(ledger_metrics(), method);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = frame(method, id, params);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let err = map_transport_error(e);
                tracing::debug!(target: "rpc", method, id, error = %err, "Request failed");
                err
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;

        if !status.is_success() {
            // Some nodes pair a JSON-RPC error object with a non-2xx status.
            if let Some(error) = error_object(&bytes) {
                return Err(error);
            }
            tracing::debug!(target: "rpc", method, id, status = status.as_u16(), "HTTP error");
            return Err(NodeError::Http {
                status: status.as_u16(),
                body: snippet(&bytes),
            });
        }

        let result = decode_response(&bytes);
        if let Err(e) = &result {
            tracing::debug!(target: "rpc", method, id, error = %e, "RPC error");
        }
        result
    }
}

#[async_trait]
impl LedgerNode for HttpLedgerClient {
    async fn chain_id(&self) -> Result<u64, NodeError> {
        let id: U64 = self.request("eth_chainId", NO_PARAMS).await?;
        Ok(id.to::<u64>())
    }

    async fn transaction_count(
        &self,
        account: Account,
        block: BlockTag,
    ) -> Result<u64, NodeError> {
        let count: U64 = self
            .request(
                "eth_getTransactionCount",
                (account.address(), block_param(block)),
            )
            .await?;
        Ok(count.to::<u64>())
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, NodeError> {
        self.request("eth_sendRawTransaction", (Bytes::copy_from_slice(raw),))
            .await
    }

    async fn transaction_receipt(
        &self,
        hash: &B256,
    ) -> Result<Option<TransactionReceipt>, NodeError> {
        let receipt: Option<RpcReceipt> =
            self.request("eth_getTransactionReceipt", (*hash,)).await?;
        Ok(receipt.map(TransactionReceipt::from))
    }

    async fn call(&self, request: &CallRequest, block: BlockTag) -> Result<Bytes, NodeError> {
        self.request("eth_call", (CallParams::from(request), block_param(block)))
            .await
    }
}

#[cfg(test)]
mod tests;
