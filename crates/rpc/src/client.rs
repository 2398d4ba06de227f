use alloy::primitives::B256;
use async_trait::async_trait;
use atlas_types::{RawBlock, RawReceipt, RawUncle};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tracing::{instrument, warn};

use crate::{Rpc, RpcError};

/// Endpoint and timeout of the crawled node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// HTTP URL of the node.
    pub url: String,
    /// Per-request timeout.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
}

const fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { url: "http://127.0.0.1:8545".into(), timeout: default_timeout() }
    }
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Response<T> {
    result: Option<T>,
    error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// A typed JSON-RPC client over HTTP.
#[derive(Debug)]
pub struct RpcClient {
    url: reqwest::Url,
    client: reqwest::Client,
    id: AtomicU64,
}

impl RpcClient {
    /// Builds a client for the configured endpoint.
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let url = config.url.parse()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RpcError::Transport)?;
        Ok(Self { url, client, id: AtomicU64::new(1) })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let request = Request {
            jsonrpc: "2.0",
            id: self.id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response: Response<T> = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .inspect_err(|e| warn!(%e, method, "rpc request failed"))?
            .json()
            .await
            .inspect_err(|e| warn!(%e, method, "failed to decode rpc response"))?;

        if let Some(err) = response.error {
            return Err(RpcError::Node { code: err.code, message: err.message });
        }
        response.result.ok_or(RpcError::NullResult)
    }
}

#[async_trait]
impl Rpc for RpcClient {
    #[instrument(skip_all)]
    async fn latest_block_number(&self) -> Result<u64, RpcError> {
        let number: String = self.request("eth_blockNumber", json!([])).await?;
        atlas_types::quantity::parse_hex_u64(&number).map_err(|e| RpcError::Decode(e.to_string()))
    }

    #[instrument(skip_all, fields(height))]
    async fn block_by_height(&self, height: u64) -> Result<RawBlock, RpcError> {
        self.request("eth_getBlockByNumber", json!([format!("{height:#x}"), true])).await
    }

    #[instrument(skip_all)]
    async fn block_by_hash(&self, hash: B256) -> Result<RawBlock, RpcError> {
        self.request("eth_getBlockByHash", json!([hash, true])).await
    }

    #[instrument(skip_all, fields(height, index))]
    async fn uncle_by_block_number_and_index(
        &self,
        height: u64,
        index: usize,
    ) -> Result<RawUncle, RpcError> {
        self.request(
            "eth_getUncleByBlockNumberAndIndex",
            json!([format!("{height:#x}"), format!("{index:#x}")]),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn tx_receipt(&self, hash: B256) -> Result<RawReceipt, RpcError> {
        self.request("eth_getTransactionReceipt", json!([hash])).await
    }

    async fn ping(&self) -> Result<(), RpcError> {
        let _: String = self.request("net_version", json!([])).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_humantime_timeout() {
        let config: RpcConfig =
            serde_json::from_str(r#"{"url": "http://127.0.0.1:8588", "timeout": "60s"}"#).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(60));

        let config: RpcConfig =
            serde_json::from_str(r#"{"url": "http://127.0.0.1:8588"}"#).unwrap();
        assert_eq!(config.timeout, default_timeout());
    }

    #[test]
    fn request_envelope_shape() {
        let request = Request {
            jsonrpc: "2.0",
            id: 7,
            method: "eth_getBlockByNumber",
            params: json!(["0x2a", true]),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "eth_getBlockByNumber");
        assert_eq!(value["params"][0], "0x2a");
        assert_eq!(value["params"][1], true);
    }

    #[test]
    fn response_variants_decode() {
        let ok: Response<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#).unwrap();
        assert_eq!(ok.result.as_deref(), Some("0x10"));

        let null: Response<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert!(null.result.is_none());

        let err: Response<String> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"header not found"}}"#,
        )
        .unwrap();
        let err = err.error.unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "header not found");
    }

    #[test]
    fn rejects_malformed_endpoint() {
        let config = RpcConfig { url: "not a url".into(), ..Default::default() };
        assert!(matches!(RpcClient::new(&config), Err(RpcError::Url(_))));
    }
}
