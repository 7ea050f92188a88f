//! Aggregator request/response records and swap errors.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::{BlockchainError, Confirmation};

/// Errors that can occur during a swap.
#[derive(Debug, Error)]
pub enum SwapError {
    /// Non-success HTTP status from the aggregator.
    #[error("Aggregator error {status}: {body}")]
    Request { status: u16, body: String },

    /// Aggregator response did not match the expected shape.
    #[error("Unexpected aggregator response: {0}")]
    Decode(String),

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The wallet cannot cover the input amount.
    #[error("Insufficient balance of {token} for swap: have {available}, need {required}")]
    InsufficientBalance {
        token: String,
        available: U256,
        required: U256,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

pub type SwapResult<T> = Result<T, SwapError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InputToken {
    pub token_address: Address,
    /// Smallest units, as a decimal string.
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputToken {
    pub token_address: Address,
    pub proportion: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub chain_id: u64,
    pub input_tokens: Vec<InputToken>,
    pub output_tokens: Vec<OutputToken>,
    pub slippage_limit_percent: f64,
    pub user_addr: Address,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub path_id: String,
    #[serde(default)]
    pub out_amounts: Vec<String>,
    #[serde(default)]
    pub gas_estimate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssembleRequest {
    pub path_id: String,
    pub user_addr: Address,
}

/// Ready-to-sign call returned by the assemble endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledTransaction {
    pub to: Address,
    pub data: Bytes,
    /// Native value in wei, as a decimal string.
    pub value: String,
    #[serde(default)]
    pub gas: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub token_address: Address,
    pub amount: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledSwap {
    pub transaction: AssembledTransaction,
    #[serde(default)]
    pub output_tokens: Vec<TokenAmount>,
}

impl AssembledSwap {
    /// Native value attached to the swap call.
    pub fn value(&self) -> SwapResult<U256> {
        parse_amount("transaction.value", &self.transaction.value)
    }

    /// Output amount the aggregator expects, in smallest units.
    pub fn expected_output(&self) -> SwapResult<U256> {
        let first = self
            .output_tokens
            .first()
            .ok_or_else(|| SwapError::Decode("no output tokens in assembled swap".to_string()))?;
        parse_amount("outputTokens[0].amount", &first.amount)
    }
}

/// A confirmed swap.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub confirmation: Confirmation,
    pub input_amount: U256,
    pub expected_output: U256,
}

fn parse_amount(field: &str, raw: &str) -> SwapResult<U256> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(raw, 10),
    };
    parsed.map_err(|e| SwapError::Decode(format!("{} '{}': {}", field, raw, e)))
}
