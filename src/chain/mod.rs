//! JSON-RPC access to a Hetu EVM node.
//!
//! [`RpcClient`] wraps a [`Transport`] so the HTTP layer can be swapped for an
//! in-memory node in tests.

pub mod pipeline;
pub mod signer;

use async_trait::async_trait;
use ethers_core::types::{Address, Bytes, H256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub use pipeline::{ConfirmPolicy, ContractCall, SignedTransaction, TxOutcome, TxPipeline};
pub use signer::TxSigner;

/// Error types for chain operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
    #[error("Signing error: {0}")]
    Signing(String),
}

/// A JSON-RPC request sink.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `method` with `params` and return the `result` member.
    async fn request(&self, method: &str, params: Value) -> Result<Value, Error>;
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 over HTTP POST.
#[derive(Debug)]
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, Error> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        tracing::debug!(method, url = %self.url, "JSON-RPC request");

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            tracing::debug!(method, code = error.code, message = %error.message, "JSON-RPC error");
            return Err(Error::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}

/// Receipt returned by `eth_getTransactionReceipt`, kept as raw JSON for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TxReceipt {
    raw: Value,
}

impl TxReceipt {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// `Some(1)` for success, `Some(0)` for a reverted transaction.
    pub fn status(&self) -> Option<u64> {
        self.raw
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| parse_hex_u64(s).ok())
    }

    pub fn block_number(&self) -> Option<u64> {
        self.raw
            .get("blockNumber")
            .and_then(Value::as_str)
            .and_then(|s| parse_hex_u64(s).ok())
    }

    pub fn gas_used(&self) -> Option<U256> {
        self.raw
            .get("gasUsed")
            .and_then(Value::as_str)
            .and_then(|s| parse_hex_u256(s).ok())
    }

    pub fn is_success(&self) -> bool {
        self.status() == Some(1)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl fmt::Display for TxReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(&self.raw) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{}", self.raw),
        }
    }
}

/// Hetu JSON-RPC client
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn Transport>,
}

impl RpcClient {
    /// Client over HTTP to `url`.
    pub fn http(url: impl Into<String>) -> Self {
        Self::new(Arc::new(HttpTransport::new(url)))
    }

    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Raw request passthrough.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, Error> {
        self.transport.request(method, params).await
    }

    async fn request_str(&self, method: &str, params: Value) -> Result<String, Error> {
        match self.request(method, params).await? {
            Value::String(s) => Ok(s),
            other => Err(Error::InvalidResponse(format!(
                "{} returned {}, expected a hex string",
                method, other
            ))),
        }
    }

    pub async fn chain_id(&self) -> Result<u64, Error> {
        parse_hex_u64(&self.request_str("eth_chainId", json!([])).await?)
    }

    pub async fn block_number(&self) -> Result<u64, Error> {
        parse_hex_u64(&self.request_str("eth_blockNumber", json!([])).await?)
    }

    /// Native balance in wei at the latest block.
    pub async fn get_balance(&self, address: Address) -> Result<U256, Error> {
        let hex = self
            .request_str("eth_getBalance", json!([address, "latest"]))
            .await?;
        parse_hex_u256(&hex)
    }

    /// Next nonce, counting transactions still in the pool.
    pub async fn get_transaction_count(&self, address: Address) -> Result<U256, Error> {
        let hex = self
            .request_str("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        parse_hex_u256(&hex)
    }

    pub async fn gas_price(&self) -> Result<U256, Error> {
        parse_hex_u256(&self.request_str("eth_gasPrice", json!([])).await?)
    }

    /// Read-only contract call at the latest block.
    pub async fn call(&self, to: Address, data: &Bytes) -> Result<Bytes, Error> {
        let hex = self
            .request_str("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await?;
        parse_hex_bytes(&hex)
    }

    pub async fn send_raw_transaction(&self, raw: &Bytes) -> Result<H256, Error> {
        let hex = self
            .request_str("eth_sendRawTransaction", json!([raw]))
            .await?;
        parse_hex_h256(&hex)
    }

    /// `None` while the transaction is still pending.
    pub async fn get_transaction_receipt(&self, hash: H256) -> Result<Option<TxReceipt>, Error> {
        match self
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?
        {
            Value::Null => Ok(None),
            raw @ Value::Object(_) => Ok(Some(TxReceipt::new(raw))),
            other => Err(Error::InvalidResponse(format!(
                "unexpected receipt payload: {}",
                other
            ))),
        }
    }
}

/// Parse a `0x` quantity into u64.
pub fn parse_hex_u64(hex: &str) -> Result<u64, Error> {
    let digits = hex.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| Error::InvalidResponse(format!("invalid hex quantity '{}': {}", hex, e)))
}

/// Parse a `0x` quantity into U256.
pub fn parse_hex_u256(hex: &str) -> Result<U256, Error> {
    let digits = hex.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| Error::InvalidResponse(format!("invalid hex quantity '{}': {:?}", hex, e)))
}

fn parse_hex_bytes(hex: &str) -> Result<Bytes, Error> {
    hex::decode(hex.trim_start_matches("0x"))
        .map(Bytes::from)
        .map_err(|e| Error::InvalidResponse(format!("invalid hex data: {}", e)))
}

fn parse_hex_h256(hex: &str) -> Result<H256, Error> {
    let bytes = hex::decode(hex.trim_start_matches("0x"))
        .map_err(|e| Error::InvalidResponse(format!("invalid hash '{}': {}", hex, e)))?;
    if bytes.len() != 32 {
        return Err(Error::InvalidResponse(format!("invalid hash '{}'", hex)));
    }
    Ok(H256::from_slice(&bytes))
}
