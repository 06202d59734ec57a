use crate::{
    config::REQUEST_TIMEOUT,
    node::{NodeClient, NodeError},
};
use anyhow::Error;
use async_trait::async_trait;
use log::trace;
use pecunia_common::{
    api::daemon::{
        GetBlockHashAtHeightParams, GetConfirmationsParams, GetInfoResult, HasTransactionParams,
        IncomingTransactionResult, ListIncomingParams, SendToAddressParams,
    },
    crypto::Hash,
};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: usize,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

// JSON-RPC client for the daemon a wallet trusts
pub struct DaemonAPI {
    client: Client,
    target: String,
    request_id: AtomicUsize,
}

impl DaemonAPI {
    pub fn new(daemon_address: &str) -> Result<Self, NodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .build()
            .map_err(|e| NodeError::Transport(Error::new(e)))?;

        Ok(Self {
            client,
            target: format!("{}/json_rpc", daemon_address.trim_end_matches('/')),
            request_id: AtomicUsize::new(0),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, NodeError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        trace!("rpc call {} #{}", method, id);

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let response = self
            .client
            .post(&self.target)
            .json(&request)
            .send()
            .await
            .map_err(|e| NodeError::Transport(Error::new(e)))?;
        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| NodeError::Transport(Error::new(e)))?;

        if let Some(error) = response.error {
            return Err(NodeError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| NodeError::InvalidResponse(format!("{} returned no result", method)))?;
        serde_json::from_value(result)
            .map_err(|e| NodeError::InvalidResponse(format!("{}: {}", method, e)))
    }
}

#[async_trait]
impl NodeClient for DaemonAPI {
    async fn get_info(&self) -> Result<GetInfoResult, NodeError> {
        self.call("get_info", json!({})).await
    }

    async fn get_block_hash_at_height(&self, height: u64) -> Result<Hash, NodeError> {
        let params = GetBlockHashAtHeightParams { height };
        self.call("get_block_hash_at_height", json!(params)).await
    }

    async fn list_incoming(
        &self,
        min_height: Option<u64>,
    ) -> Result<Vec<IncomingTransactionResult>, NodeError> {
        let params = ListIncomingParams { min_height };
        self.call("list_incoming", json!(params)).await
    }

    async fn get_confirmations(&self, hash: &Hash) -> Result<u32, NodeError> {
        let params = GetConfirmationsParams { hash: hash.clone() };
        self.call("get_confirmations", json!(params)).await
    }

    async fn has_transaction(&self, hash: &Hash) -> Result<bool, NodeError> {
        let params = HasTransactionParams { hash: hash.clone() };
        self.call("has_transaction", json!(params)).await
    }

    async fn send_to_address(&self, address: String, amount: u64) -> Result<Hash, NodeError> {
        let params = SendToAddressParams { address, amount };
        self.call("send_to_address", json!(params)).await
    }
}
