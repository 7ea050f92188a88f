//! DEX aggregator client.
//!
//! # Data Flow
//! ```text
//! swap(input, output, amount)
//!     → pre-flight balance check
//!     → POST /quote/v2   → pathId
//!     → POST /assemble   → {to, data, value} + expected output
//!     → approval gate (ERC-20 input only, spender = router)
//!     → ChainClient::call_contract (lock, build, sign, broadcast, confirm)
//! ```
//!
//! The chain's native asset is addressed by the zero address on the wire.

use alloy::primitives::{Address, U256};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::blockchain::units::from_smallest_unit;
use crate::blockchain::{BlockchainError, ChainClient};
use crate::config::AggregatorConfig;
use crate::observability::metrics;
use crate::swap::types::{
    AssembleRequest, AssembledSwap, InputToken, OutputToken, QuoteRequest, QuoteResponse,
    SwapError, SwapOutcome, SwapResult,
};

/// Revert text of an ERC-20 transfer the wallet cannot cover.
const TRANSFER_EXCEEDS_BALANCE: &str = "transfer amount exceeds balance";

#[derive(Debug, Clone)]
pub struct SwapClient {
    http: reqwest::Client,
    base_url: String,
    chain: ChainClient,
    /// Address under which the token table lists the native asset.
    native_token: Address,
}

impl SwapClient {
    /// Create a new aggregator client.
    ///
    /// # Arguments
    /// * `config` - Aggregator base URL and timeout
    /// * `chain` - Wallet-bound chain client used for reads and submission
    /// * `native_token` - Token-table address standing for the native asset
    /// * `proxy` - Optional HTTP proxy URL
    pub fn new(
        config: &AggregatorConfig,
        chain: ChainClient,
        native_token: Address,
        proxy: Option<&str>,
    ) -> SwapResult<Self> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| SwapError::Config(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }
        let http = builder
            .build()
            .map_err(|e| SwapError::Config(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chain,
            native_token,
        })
    }

    /// Map the native asset to the aggregator's zero-address sentinel.
    pub fn wire_address(&self, token: Address) -> Address {
        if token == self.native_token {
            Address::ZERO
        } else {
            token
        }
    }

    fn is_native(&self, token: Address) -> bool {
        self.wire_address(token) == Address::ZERO
    }

    /// Request a route and return its path id.
    pub async fn quote(
        &self,
        input: Address,
        output: Address,
        amount: U256,
        slippage_percent: f64,
    ) -> SwapResult<QuoteResponse> {
        let request = QuoteRequest {
            chain_id: self.chain.network().chain_id,
            input_tokens: vec![InputToken {
                token_address: self.wire_address(input),
                amount: amount.to_string(),
            }],
            output_tokens: vec![OutputToken {
                token_address: self.wire_address(output),
                proportion: 1,
            }],
            slippage_limit_percent: slippage_percent,
            user_addr: self.chain.address(),
        };
        let quote: QuoteResponse = self.post("/quote/v2", &request).await?;
        tracing::debug!(path_id = %quote.path_id, "Quote received");
        Ok(quote)
    }

    /// Turn a quoted path into a signable transaction.
    pub async fn assemble(&self, path_id: &str) -> SwapResult<AssembledSwap> {
        let request = AssembleRequest {
            path_id: path_id.to_string(),
            user_addr: self.chain.address(),
        };
        self.post("/assemble", &request).await
    }

    /// Swap `amount` (smallest units) of `input` for `output`.
    pub async fn swap(
        &self,
        input: Address,
        output: Address,
        amount: U256,
        slippage_percent: f64,
    ) -> SwapResult<SwapOutcome> {
        let input_native = self.is_native(input);
        let available = if input_native {
            self.chain.native_balance().await?
        } else {
            self.chain.token_balance(input).await?
        };
        if available < amount {
            return Err(SwapError::InsufficientBalance {
                token: input.to_string(),
                available,
                required: amount,
            });
        }

        let quote = self.quote(input, output, amount, slippage_percent).await?;
        let assembled = self.assemble(&quote.path_id).await?;
        let value = assembled.value()?;
        let expected_output = assembled.expected_output()?;
        let router = assembled.transaction.to;

        let amount_in = from_smallest_unit(amount, self.decimals(input).await?)?;
        let expected_out = from_smallest_unit(expected_output, self.decimals(output).await?)?;
        tracing::info!(
            input = %input,
            output = %output,
            amount_in = %amount_in,
            expected_out = %expected_out,
            router = %router,
            "Starting swap"
        );

        if !input_native {
            self.chain.ensure_allowance(input, router, amount).await?;
        }

        let confirmation = self
            .chain
            .call_contract(router, assembled.transaction.data.clone(), value)
            .await
            .map_err(|e| map_submission_error(e, input, available, amount))?;

        Ok(SwapOutcome {
            confirmation,
            input_amount: amount,
            expected_output,
        })
    }

    async fn decimals(&self, token: Address) -> SwapResult<u8> {
        if self.is_native(token) {
            Ok(self.chain.network().native_decimals)
        } else {
            Ok(self.chain.token_decimals(token).await?)
        }
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> SwapResult<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Aggregator request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| SwapError::Http(e.to_string()))?;
        let status = response.status();
        metrics::record_http("aggregator", status.as_u16());
        let text = response
            .text()
            .await
            .map_err(|e| SwapError::Http(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(url = %url, status = status.as_u16(), body = %text, "Aggregator API error");
            return Err(SwapError::Request {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| SwapError::Decode(format!("{}: {}", e, text)))
    }
}

fn map_submission_error(
    error: BlockchainError,
    input: Address,
    available: U256,
    required: U256,
) -> SwapError {
    if error.to_string().contains(TRANSFER_EXCEEDS_BALANCE) {
        SwapError::InsufficientBalance {
            token: input.to_string(),
            available,
            required,
        }
    } else {
        SwapError::Blockchain(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_exceeds_balance_maps_to_insufficient() {
        let err = map_submission_error(
            BlockchainError::Rpc(
                "All providers failed to estimate gas: execution reverted: ERC20: transfer amount exceeds balance"
                    .to_string(),
            ),
            Address::ZERO,
            U256::from(1u8),
            U256::from(2u8),
        );
        assert!(matches!(err, SwapError::InsufficientBalance { .. }));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = map_submission_error(
            BlockchainError::Reverted {
                url: "https://arbiscan.io/tx/0x01".to_string(),
            },
            Address::ZERO,
            U256::ZERO,
            U256::ZERO,
        );
        assert!(matches!(err, SwapError::Blockchain(BlockchainError::Reverted { .. })));
    }
}
