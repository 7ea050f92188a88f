//! Exchange records and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Business code of a successful response.
pub const SUCCESS_CODE: &str = "00000";

/// Errors that can occur while talking to the exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Missing credentials or request parameters.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The account cannot cover a withdrawal.
    #[error("Insufficient balance: {available} {coin} available, trying to withdraw {requested}")]
    InsufficientBalance {
        coin: String,
        available: String,
        requested: String,
    },

    /// Non-200 HTTP status.
    #[error("Error {status}: {body}")]
    Request { status: u16, body: String },

    /// HTTP 200 with a failing business code.
    #[error("API error {code}: {msg}")]
    Api { code: String, msg: String },

    /// Response did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Transport failure (DNS, TLS, connect, timeout).
    #[error("HTTP error: {0}")]
    Http(String),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub request_time: Option<u64>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Payload of a successful response.
    pub fn into_data(self) -> ExchangeResult<T> {
        if self.code != SUCCESS_CODE {
            return Err(ExchangeError::Api {
                code: self.code,
                msg: self.msg,
            });
        }
        self.data
            .ok_or_else(|| ExchangeError::Decode("missing data field".to_string()))
    }
}

/// Spot balance of one coin.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    pub coin: String,
    pub available: String,
    #[serde(default)]
    pub frozen: Option<String>,
    #[serde(default)]
    pub locked: Option<String>,
    #[serde(default)]
    pub u_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddress {
    pub address: String,
    pub coin: String,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Acknowledgement of a submitted withdrawal.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalAck {
    pub order_id: String,
    #[serde(default)]
    pub client_oid: Option<String>,
}

/// One entry of the withdrawal or deposit history.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub order_id: String,
    pub coin: String,
    pub size: String,
    pub status: String,
    #[serde(default)]
    pub trade_id: Option<String>,
    #[serde(default)]
    pub client_oid: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub to_address: Option<String>,
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub fee: Option<String>,
    #[serde(default)]
    pub c_time: Option<String>,
    #[serde(default)]
    pub u_time: Option<String>,
}

/// Filters for the history endpoints. Times are Unix milliseconds.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub coin: Option<String>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub client_oid: Option<String>,
}
