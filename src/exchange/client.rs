//! Authenticated REST client for the exchange account.
//!
//! # Responsibilities
//! - Sign every request (see [`crate::exchange::signer`])
//! - Withdraw to an on-chain address after a balance pre-flight
//! - Look up deposit addresses, balances and transfer history
//!
//! The body string that is signed is the exact body that is sent, and the
//! query string on the wire is the canonical one that is signed.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Ordering;
use std::time::Duration;

use crate::blockchain::units::compare_amounts;
use crate::config::{ApiCredentials, ExchangeConfig};
use crate::exchange::signer::{canonical_query, timestamp_ms, QueryParams, RequestSigner};
use crate::exchange::types::{
    ApiEnvelope, AssetBalance, DepositAddress, ExchangeError, ExchangeResult, HistoryQuery,
    TransferRecord, WithdrawalAck,
};
use crate::observability::metrics;

const WITHDRAWAL_PATH: &str = "/api/v2/spot/wallet/withdrawal";
const DEPOSIT_ADDRESS_PATH: &str = "/api/v2/spot/wallet/deposit-address";
const ASSETS_PATH: &str = "/api/v2/spot/account/assets";
const WITHDRAW_LIST_PATH: &str = "/api/v2/spot/wallet/withdraw-list";
const DEPOSIT_LIST_PATH: &str = "/api/v2/spot/wallet/deposit-list";

/// Records per page requested from the history endpoints.
pub const HISTORY_PAGE_SIZE: u32 = 20;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawalRequest<'a> {
    coin: &'a str,
    transfer_type: &'static str,
    chain: &'a str,
    size: &'a str,
    address: &'a str,
    client_oid: String,
}

#[derive(Debug, Clone)]
pub struct ExchangeClient {
    http: reqwest::Client,
    base_url: String,
    signer: RequestSigner,
}

impl ExchangeClient {
    /// Create a new exchange client.
    ///
    /// # Arguments
    /// * `config` - Base URL and request timeout
    /// * `credentials` - API key, secret and passphrase
    /// * `proxy` - Optional HTTP proxy URL
    pub fn new(
        config: &ExchangeConfig,
        credentials: ApiCredentials,
        proxy: Option<&str>,
    ) -> ExchangeResult<Self> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ExchangeError::Config(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }
        let http = builder
            .build()
            .map_err(|e| ExchangeError::Config(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            signer: RequestSigner::new(credentials),
        })
    }

    /// Withdraw `amount` of `coin` over `chain` to `address`.
    ///
    /// A fresh client order id is generated when `client_oid` is `None`.
    pub async fn withdraw(
        &self,
        coin: &str,
        chain: &str,
        amount: &str,
        address: &str,
        client_oid: Option<String>,
    ) -> ExchangeResult<WithdrawalAck> {
        if [coin, chain, amount, address].iter().any(|p| p.trim().is_empty()) {
            return Err(ExchangeError::Config(
                "Missing required parameters for withdrawal".to_string(),
            ));
        }
        if !self.signer.has_credentials() {
            return Err(ExchangeError::Config("Missing API credentials".to_string()));
        }

        let available = self
            .account_assets(Some(coin))
            .await?
            .into_iter()
            .find(|asset| asset.coin == coin)
            .map(|asset| asset.available)
            .unwrap_or_else(|| "0".to_string());
        let ordering = compare_amounts(&available, amount)
            .map_err(|e| ExchangeError::Decode(format!("balance comparison: {}", e)))?;
        if ordering == Ordering::Less {
            return Err(ExchangeError::InsufficientBalance {
                coin: coin.to_string(),
                available,
                requested: amount.to_string(),
            });
        }

        let request = WithdrawalRequest {
            coin,
            transfer_type: "on_chain",
            chain,
            size: amount,
            address,
            client_oid: client_oid.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        };
        tracing::info!(
            coin = coin,
            chain = chain,
            amount = amount,
            address = address,
            client_oid = %request.client_oid,
            "Submitting withdrawal"
        );

        let ack: WithdrawalAck = self.post(WITHDRAWAL_PATH, &request).await?;
        tracing::info!(order_id = %ack.order_id, "Withdrawal accepted");
        Ok(ack)
    }

    /// Deposit address of `coin`, optionally on a specific `chain`.
    pub async fn deposit_address(
        &self,
        coin: &str,
        chain: Option<&str>,
    ) -> ExchangeResult<DepositAddress> {
        let mut params = QueryParams::new();
        params.insert("coin", coin.to_string());
        if let Some(chain) = chain {
            params.insert("chain", chain.to_string());
        }
        self.get(DEPOSIT_ADDRESS_PATH, &params).await
    }

    /// Spot balances, optionally filtered to one coin.
    pub async fn account_assets(&self, coin: Option<&str>) -> ExchangeResult<Vec<AssetBalance>> {
        let mut params = QueryParams::new();
        if let Some(coin) = coin {
            params.insert("coin", coin.to_string());
        }
        self.get(ASSETS_PATH, &params).await
    }

    pub async fn withdrawal_history(
        &self,
        query: &HistoryQuery,
    ) -> ExchangeResult<Vec<TransferRecord>> {
        let mut params = history_params(query);
        if let Some(client_oid) = &query.client_oid {
            params.insert("clientOid", client_oid.clone());
        }
        self.get(WITHDRAW_LIST_PATH, &params).await
    }

    /// Deposit history. `client_oid` in the query is ignored.
    pub async fn deposit_history(&self, query: &HistoryQuery) -> ExchangeResult<Vec<TransferRecord>> {
        self.get(DEPOSIT_LIST_PATH, &history_params(query)).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &QueryParams) -> ExchangeResult<T> {
        let request_path = format!("{}{}", path, canonical_query(params));
        self.send(Method::GET, &request_path, String::new()).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ExchangeResult<T> {
        let body = serde_json::to_string(body)
            .map_err(|e| ExchangeError::Decode(format!("request encoding: {}", e)))?;
        self.send(Method::POST, path, body).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        request_path: &str,
        body: String,
    ) -> ExchangeResult<T> {
        let url = format!("{}{}", self.base_url, request_path);
        let timestamp = timestamp_ms();
        tracing::debug!(method = %method, url = %url, "Exchange request");

        let mut request = self.http.request(method.clone(), &url);
        for (name, value) in self
            .signer
            .headers(&timestamp, method.as_str(), request_path, &body)
        {
            request = request.header(name, value);
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExchangeError::Http(e.to_string()))?;
        let status = response.status();
        metrics::record_http("exchange", status.as_u16());
        let text = response
            .text()
            .await
            .map_err(|e| ExchangeError::Http(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(method = %method, url = %url, status = status.as_u16(), body = %text, "Exchange API error");
            return Err(ExchangeError::Request {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&text)
            .map_err(|e| ExchangeError::Decode(format!("{}: {}", e, text)))?;
        envelope.into_data()
    }
}

fn history_params(query: &HistoryQuery) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert("pageSize", HISTORY_PAGE_SIZE.to_string());
    if let Some(coin) = &query.coin {
        params.insert("coin", coin.clone());
    }
    if let Some(start) = query.start_time {
        params.insert("startTime", start.to_string());
    }
    if let Some(end) = query.end_time {
        params.insert("endTime", end.to_string());
    }
    params
}
