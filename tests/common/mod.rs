//! Shared utilities for integration testing.

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{hex, keccak256, Address, U256};
use cex_swap_pipeline::config::TransactionConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request as received by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the raw query string.
    pub path: String,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

pub type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

/// Start a programmable mock backend on a free local port.
///
/// Every request is recorded before `f` produces the `(status, body)` reply.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, RequestLog)
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let requests = log.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        requests.lock().unwrap().push(request.clone());

                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (header_end + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

/// Chain state served by [`start_wallet_node`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct NodeState {
    pub chain_id: u64,
    /// Advanced by one on every broadcast.
    pub nonce: u64,
    pub gas_estimate: u64,
    pub gas_price: u128,
    /// Base fee of the next block in the fee history.
    pub base_fee: u128,
    /// First-percentile reward of each sampled block.
    pub rewards: Vec<u128>,
    pub native_balance: U256,
    pub token_balance: U256,
    pub token_decimals: u8,
    pub allowance: U256,
    /// Receipt status per lookup, `None` while not mined; the last entry repeats.
    pub receipts: Vec<Option<bool>>,
}

#[allow(dead_code)]
impl Default for NodeState {
    fn default() -> Self {
        Self {
            chain_id: 42161,
            nonce: 0,
            gas_estimate: 21_000,
            gas_price: 100_000_000,
            base_fee: 100_000_000,
            rewards: vec![0, 1_000_000_000, 0, 1_000_000_000, 0],
            native_balance: U256::ZERO,
            token_balance: U256::ZERO,
            token_decimals: 6,
            allowance: U256::ZERO,
            receipts: vec![Some(true)],
        }
    }
}

#[allow(dead_code)]
impl NodeState {
    fn answer(&mut self, method: &str, params: &Value) -> Value {
        match method {
            "eth_chainId" => json!(format!("{:#x}", self.chain_id)),
            "eth_getBalance" => json!(format!("0x{:x}", self.native_balance)),
            "eth_getTransactionCount" => json!(format!("{:#x}", self.nonce)),
            "eth_estimateGas" => json!(format!("{:#x}", self.gas_estimate)),
            "eth_gasPrice" => json!(format!("{:#x}", self.gas_price)),
            "eth_feeHistory" => json!({
                "oldestBlock": "0x100",
                "baseFeePerGas": vec![format!("{:#x}", self.base_fee); self.rewards.len() + 1],
                "gasUsedRatio": vec![0.5; self.rewards.len()],
                "reward": self
                    .rewards
                    .iter()
                    .map(|fee| vec![format!("{:#x}", fee)])
                    .collect::<Vec<_>>(),
            }),
            "eth_call" => self.call(&params[0]),
            "eth_sendRawTransaction" => {
                self.nonce += 1;
                let raw = hex::decode(params[0].as_str().unwrap_or_default()).unwrap_or_default();
                json!(keccak256(&raw).to_string())
            }
            "eth_getTransactionReceipt" => {
                let status = if self.receipts.len() > 1 {
                    self.receipts.remove(0)
                } else {
                    self.receipts.first().copied().flatten()
                };
                match status {
                    Some(success) => receipt(params[0].as_str().unwrap_or_default(), success),
                    None => Value::Null,
                }
            }
            _ => Value::Null,
        }
    }

    /// ERC-20 view calls, dispatched on the selector.
    fn call(&self, tx: &Value) -> Value {
        let input = tx["input"].as_str().or(tx["data"].as_str()).unwrap_or_default();
        let word = match input.get(..10) {
            Some("0x70a08231") => self.token_balance,
            Some("0x313ce567") => U256::from(self.token_decimals),
            Some("0xdd62ed3e") => self.allowance,
            _ => U256::ZERO,
        };
        json!(hex::encode_prefixed(word.to_be_bytes::<32>()))
    }
}

#[allow(dead_code)]
fn receipt(tx_hash: &str, success: bool) -> Value {
    let status = if success { "0x1" } else { "0x0" };
    json!({
        "transactionHash": tx_hash,
        "transactionIndex": "0x1",
        "blockHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": "0x101",
        "from": Address::ZERO.to_string(),
        "to": Address::ZERO.to_string(),
        "cumulativeGasUsed": "0x5208",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x5f5e100",
        "contractAddress": null,
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "type": "0x2",
        "status": status,
    })
}

/// JSON-RPC node answering from a mutable [`NodeState`].
#[allow(dead_code)]
pub async fn start_wallet_node(state: NodeState) -> (SocketAddr, RequestLog) {
    let state = Arc::new(Mutex::new(state));
    start_programmable_backend(move |request| {
        let state = state.clone();
        async move {
            let call: Value = serde_json::from_str(&request.body).unwrap_or_default();
            let method = call["method"].as_str().unwrap_or_default();
            let result = state.lock().unwrap().answer(method, &call["params"]);
            let reply = json!({
                "jsonrpc": "2.0",
                "id": call["id"].clone(),
                "result": result,
            });
            (200, reply.to_string())
        }
    })
    .await
}

/// Node with Arbitrum's chain id and every balance at zero.
#[allow(dead_code)]
pub async fn start_empty_wallet_node() -> (SocketAddr, RequestLog) {
    start_wallet_node(NodeState::default()).await
}

/// `(method, params)` of every JSON-RPC call, in arrival order.
#[allow(dead_code)]
pub fn rpc_calls(log: &RequestLog) -> Vec<(String, Value)> {
    log.lock()
        .unwrap()
        .iter()
        .map(|request| {
            let call: Value = serde_json::from_str(&request.body).unwrap_or_default();
            (
                call["method"].as_str().unwrap_or_default().to_string(),
                call["params"].clone(),
            )
        })
        .collect()
}

#[allow(dead_code)]
pub fn count_calls(log: &RequestLog, method: &str) -> usize {
    rpc_calls(log).iter().filter(|(m, _)| m == method).count()
}

/// Signed transactions received by `eth_sendRawTransaction`, in order.
#[allow(dead_code)]
pub fn broadcasts(log: &RequestLog) -> Vec<TxEnvelope> {
    rpc_calls(log)
        .into_iter()
        .filter(|(method, _)| method == "eth_sendRawTransaction")
        .map(|(_, params)| {
            let raw = hex::decode(params[0].as_str().unwrap()).unwrap();
            TxEnvelope::decode_2718(&mut raw.as_slice()).unwrap()
        })
        .collect()
}

/// Transaction settings that keep confirmation and approval waits short.
#[allow(dead_code)]
pub fn fast_transactions() -> TransactionConfig {
    TransactionConfig {
        poll_interval_secs: 1,
        confirmation_timeout_secs: 30,
        approval_settle_min_secs: 0,
        approval_settle_max_secs: 0,
        ..Default::default()
    }
}
