//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the pipeline.
//! All types derive Serde traits for deserialization from config files, and
//! every section defaults to the Arbitrum / Bitget / Odos setup so an empty
//! file is a valid configuration.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration for the withdraw → swap → deposit pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// The single network the wallet operates on.
    pub network: NetworkDescriptor,

    /// Token contract addresses on `network`, keyed by symbol.
    pub tokens: TokenTable,

    /// Centralized exchange REST settings.
    pub exchange: ExchangeConfig,

    /// DEX aggregator REST settings.
    pub aggregator: AggregatorConfig,

    /// Transaction building and confirmation settings.
    pub transactions: TransactionConfig,

    /// Amounts and waits for the pipeline run itself.
    pub pipeline: RunConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Immutable description of one EVM network.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkDescriptor {
    /// Human readable network name (also the key used in logs).
    pub name: String,

    /// JSON-RPC endpoint URLs. The first entry is the primary endpoint.
    pub rpcs: Vec<String>,

    /// Chain ID used for EIP-155 replay protection.
    pub chain_id: u64,

    /// Whether the network supports EIP-1559 fee markets.
    pub eip1559_support: bool,

    /// Symbol of the native token (e.g. "ETH").
    pub native_token: String,

    /// Block explorer base URL, without trailing slash.
    pub explorer: String,

    /// Decimal count of the native token.
    pub native_decimals: u8,

    /// Chain alias used by the exchange for deposits and withdrawals.
    pub exchange_chain: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NetworkDescriptor {
    fn default() -> Self {
        Self {
            name: "Arbitrum".to_string(),
            rpcs: vec!["https://arbitrum.llamarpc.com".to_string()],
            chain_id: 42161,
            eip1559_support: true,
            native_token: "ETH".to_string(),
            explorer: "https://arbiscan.io".to_string(),
            native_decimals: 18,
            exchange_chain: "ArbitrumOne".to_string(),
            rpc_timeout_secs: 10,
        }
    }
}

impl NetworkDescriptor {
    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: impl std::fmt::Display) -> String {
        format!("{}/tx/{}", self.explorer.trim_end_matches('/'), tx_hash)
    }
}

/// Symbol → contract address table for the configured network.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TokenTable(pub BTreeMap<String, String>);

impl Default for TokenTable {
    fn default() -> Self {
        let tokens = [
            ("ETH", "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
            ("USDC", "0xaf88d065e77c8cC2239327C5EDb3A432268e5831"),
            ("USDT", "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9"),
            ("DAI", "0xDA10009cBd5D07dd0CeCc6eCea36FFB46FFb9021"),
        ];
        Self(
            tokens
                .into_iter()
                .map(|(symbol, address)| (symbol.to_string(), address.to_string()))
                .collect(),
        )
    }
}

impl TokenTable {
    /// Raw address string for a symbol.
    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.0.get(symbol).map(String::as_str)
    }

    /// Parsed address for a symbol; `None` when missing or malformed.
    pub fn address(&self, symbol: &str) -> Option<Address> {
        self.get(symbol).and_then(|raw| raw.parse().ok())
    }
}

/// Exchange REST configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// REST base URL.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bitget.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// DEX aggregator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Smart order router base URL.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.odos.xyz/sor".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Transaction construction and confirmation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Multiplier applied to legacy gas price and EIP-1559 priority fee.
    pub gas_price_multiplier: f64,

    /// Approve `U256::MAX` instead of the exact amount.
    pub unlimited_approve: bool,

    /// Seconds between receipt lookups.
    pub poll_interval_secs: u64,

    /// Total seconds to wait for a receipt before giving up.
    pub confirmation_timeout_secs: u64,

    /// Consecutive unexpected lookup errors tolerated while polling.
    pub max_consecutive_lookup_errors: u32,

    /// Lower bound of the random delay after an approval, in seconds.
    pub approval_settle_min_secs: u64,

    /// Upper bound of the random delay after an approval, in seconds.
    pub approval_settle_max_secs: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_price_multiplier: 1.0,
            unlimited_approve: false,
            poll_interval_secs: 10,
            confirmation_timeout_secs: 360,
            max_consecutive_lookup_errors: 5,
            approval_settle_min_secs: 4,
            approval_settle_max_secs: 10,
        }
    }
}

/// Parameters of a pipeline run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Stablecoin symbol withdrawn from the exchange.
    pub stable_coin: String,

    /// Human-scale amount to withdraw.
    pub withdraw_amount: String,

    /// Seconds to wait for the withdrawal to land in the wallet.
    pub arrival_wait_secs: u64,

    /// Slippage tolerance in percent for the swap.
    pub slippage_percent: f64,

    /// Native amount kept in the wallet for future gas.
    pub gas_reserve: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            stable_coin: "USDC".to_string(),
            withdraw_amount: "11".to_string(),
            arrival_wait_secs: 60,
            slippage_percent: 0.5,
            gas_reserve: "0.001".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics listener.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
