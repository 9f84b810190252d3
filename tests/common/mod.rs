//! In-memory JSON-RPC node shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ethers_core::abi::{encode, Token};
use ethers_core::utils::id;
use hetu_cli::chain::{Error, Transport};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
pub const TEST_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";
pub const TX_HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

#[derive(Clone)]
pub enum Reply {
    Ok(Value),
    Err(i64, String),
}

/// Scripted node. Queued replies are consumed in order and the last one repeats.
#[derive(Default)]
pub struct MockNode {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    call_replies: Mutex<HashMap<String, Reply>>,
    log: Mutex<Vec<(String, Value)>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node answering the usual transaction prelude.
    pub fn with_tx_defaults() -> Self {
        let node = Self::new();
        node.reply("eth_chainId", json!("0x88b80"));
        node.reply("eth_gasPrice", json!("0x3b9aca00"));
        node.reply("eth_getTransactionCount", json!("0x7"));
        node.reply("eth_sendRawTransaction", json!(TX_HASH));
        node
    }

    pub fn reply(&self, method: &str, value: Value) {
        self.push(method, Reply::Ok(value));
    }

    pub fn fail(&self, method: &str, code: i64, message: &str) {
        self.push(method, Reply::Err(code, message.to_string()));
    }

    fn push(&self, method: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Answer `eth_call` for the function with `signature` with ABI-encoded `tokens`.
    pub fn reply_call(&self, signature: &str, tokens: &[Token]) {
        let data = format!("0x{}", hex::encode(encode(tokens)));
        self.call_replies
            .lock()
            .unwrap()
            .insert(hex::encode(id(signature)), Reply::Ok(json!(data)));
    }

    pub fn fail_call(&self, signature: &str, message: &str) {
        self.call_replies
            .lock()
            .unwrap()
            .insert(hex::encode(id(signature)), Reply::Err(3, message.to_string()));
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Raw transactions passed to `eth_sendRawTransaction`.
    pub fn raw_transactions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == "eth_sendRawTransaction")
            .filter_map(|(_, params)| params[0].as_str().map(str::to_string))
            .collect()
    }

    fn eth_call_reply(&self, params: &Value) -> Option<Reply> {
        let data = params[0]["data"].as_str()?;
        let selector = data.trim_start_matches("0x").get(..8)?;
        self.call_replies.lock().unwrap().get(selector).cloned()
    }
}

#[async_trait]
impl Transport for MockNode {
    async fn request(&self, method: &str, params: Value) -> Result<Value, Error> {
        self.log
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        let reply = if method == "eth_call" {
            self.eth_call_reply(&params)
        } else {
            let mut replies = self.replies.lock().unwrap();
            replies.get_mut(method).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
        };

        match reply {
            Some(Reply::Ok(value)) => Ok(value),
            Some(Reply::Err(code, message)) => Err(Error::Rpc { code, message }),
            None => Err(Error::Rpc {
                code: -32601,
                message: format!("no scripted reply for {}", method),
            }),
        }
    }
}

pub fn receipt(status: &str, block: &str) -> Value {
    json!({
        "transactionHash": TX_HASH,
        "status": status,
        "blockNumber": block,
        "gasUsed": "0x5208",
    })
}
