//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoints of one network
//! - Query chain state (nonce, gas, fee history, balances, receipts)
//! - Fail over across endpoints for reads, with a per-call timeout
//! - Broadcast signed transactions through the primary endpoint only

use alloy::consensus::{Eip658Value, TxReceipt};
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::http::reqwest::{Client, Proxy};
use alloy::transports::http::Http;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::confirmation::ReceiptLookup;
use crate::blockchain::fees::{FeeSnapshot, FEE_HISTORY_BLOCKS, PRIORITY_FEE_PERCENTILE};
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainId, NetworkDescriptor, ReceiptPoll,
};

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary first, then failovers).
    providers: Vec<DynProvider>,
    /// Network the providers point at.
    network: NetworkDescriptor,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// # Arguments
    /// * `network` - Network descriptor with the RPC endpoints
    /// * `proxy` - Optional HTTP proxy URL for all RPC traffic
    pub async fn new(network: NetworkDescriptor, proxy: Option<&str>) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(network.rpc_timeout_secs);
        let mut providers = Vec::new();

        for (i, url_str) in network.rpcs.iter().enumerate() {
            let url: url::Url = url_str.parse().map_err(|e| {
                BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", url_str, e))
            })?;
            providers.push(connect(url, proxy)?);
            tracing::debug!(provider_idx = i, rpc_url = %url_str, "RPC provider configured");
        }

        if providers.is_empty() {
            return Err(BlockchainError::Rpc(format!(
                "No RPC endpoints configured for {}",
                network.name
            )));
        }

        let client = Self {
            providers,
            network,
            timeout_duration,
        };

        // Verify chain ID matches configuration
        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    network = %client.network.name,
                    chain_id = client.network.chain_id,
                    endpoints = client.providers.len(),
                    "Blockchain client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Blockchain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Run a read against each provider in order until one answers.
    pub(crate) async fn read<T, E, F, Fut>(&self, op: &str, f: F) -> BlockchainResult<T>
    where
        F: Fn(&DynProvider) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut last_error = String::new();
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, f(provider)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, op = op, error = %e, "RPC error, trying next provider");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, op = op, "RPC timeout, trying next provider");
                    last_error = format!("timeout after {}s", self.timeout_duration.as_secs());
                }
            }
        }
        Err(BlockchainError::Rpc(format!(
            "All providers failed to {}: {}",
            op, last_error
        )))
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.network.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.network.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.read("get chain id", |p| {
            let p = p.clone();
            async move { p.get_chain_id().await }
        })
        .await
        .map(ChainId)
    }

    /// Get the native balance of an address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.read("get balance", |p| {
            let p = p.clone();
            async move { p.get_balance(address).await }
        })
        .await
    }

    /// Get the transaction count (nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.read("get transaction count", |p| {
            let p = p.clone();
            async move { p.get_transaction_count(address).await }
        })
        .await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.read("get gas price", |p| {
            let p = p.clone();
            async move { p.get_gas_price().await }
        })
        .await
    }

    /// Sample the inputs of the fee calculator.
    ///
    /// Fee history is only requested on EIP-1559 networks.
    pub async fn fee_snapshot(&self) -> BlockchainResult<FeeSnapshot> {
        let gas_price = self
            .get_gas_price()
            .await
            .map_err(|e| BlockchainError::Fees(e.to_string()))?;

        if !self.network.eip1559_support {
            return Ok(FeeSnapshot {
                gas_price,
                ..Default::default()
            });
        }

        let history = self
            .read("get fee history", |p| {
                let p = p.clone();
                async move {
                    p.get_fee_history(
                        FEE_HISTORY_BLOCKS,
                        BlockNumberOrTag::Latest,
                        &[PRIORITY_FEE_PERCENTILE],
                    )
                    .await
                }
            })
            .await
            .map_err(|e| BlockchainError::Fees(e.to_string()))?;

        Ok(FeeSnapshot {
            gas_price,
            base_fee: history.next_block_base_fee().filter(|fee| *fee > 0),
            rewards: history.reward.unwrap_or_default(),
        })
    }

    /// Estimate the gas limit of a transaction request.
    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> BlockchainResult<u64> {
        self.read("estimate gas", |p| {
            let p = p.clone();
            let tx = tx.clone();
            async move { p.estimate_gas(tx).await }
        })
        .await
    }

    /// Broadcast a signed EIP-2718 payload through the primary endpoint.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let provider = &self.providers[0];
        match timeout(self.timeout_duration, provider.send_raw_transaction(raw)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(BlockchainError::Broadcast(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.network.rpc_timeout_secs)),
        }
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.read("get receipt", |p| {
            let p = p.clone();
            async move { p.get_transaction_receipt(tx_hash).await }
        })
        .await
    }

    /// Get the network descriptor.
    pub fn network(&self) -> &NetworkDescriptor {
        &self.network
    }
}

#[async_trait]
impl ReceiptLookup for BlockchainClient {
    async fn lookup_receipt(&self, tx_hash: TxHash) -> BlockchainResult<ReceiptPoll> {
        let receipt = self.get_transaction_receipt(tx_hash).await?;
        Ok(classify_receipt(receipt.as_ref().map(|r| r.inner.status_or_post_state())))
    }
}

/// Map the status field of a receipt (if any) to a poll outcome.
///
/// Pre-Byzantium receipts carry a state root instead of a status and are
/// treated as not yet final.
pub fn classify_receipt(status: Option<Eip658Value>) -> ReceiptPoll {
    match status {
        None => ReceiptPoll::NotFound,
        Some(Eip658Value::Eip658(success)) => ReceiptPoll::Confirmed { success },
        Some(Eip658Value::PostState(_)) => ReceiptPoll::Pending,
    }
}

fn connect(url: url::Url, proxy: Option<&str>) -> BlockchainResult<DynProvider> {
    let Some(proxy) = proxy else {
        return Ok(ProviderBuilder::new().connect_http(url).erased());
    };

    let proxy = Proxy::all(proxy)
        .map_err(|e| BlockchainError::Rpc(format!("Invalid proxy: {}", e)))?;
    let http = Client::builder()
        .proxy(proxy)
        .build()
        .map_err(|e| BlockchainError::Rpc(format!("HTTP client build failed: {}", e)))?;
    let rpc = RpcClient::new(Http::with_client(http, url), false);
    Ok(ProviderBuilder::new().connect_client(rpc).erased())
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("network", &self.network.name)
            .field("rpcs", &self.network.rpcs)
            .field("chain_id", &self.network.chain_id)
            .field("timeout_secs", &self.network.rpc_timeout_secs)
            .finish()
    }
}
