//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Build transactions with nonce, fee fields and estimated gas
//! - Sign and broadcast transactions
//! - Monitor confirmations
//!
//! One call to [`TxBuilder::execute`] holds the wallet's submission lock for
//! the whole lifecycle, so nonces are never shared between transactions.

use alloy::eips::eip2718::Encodable2718;
use alloy::eips::eip2930::AccessList;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::confirmation::ConfirmationPoller;
use crate::blockchain::fees::FeeCalculator;
use crate::blockchain::types::{BlockchainResult, Confirmation, FeeFields, TransactionConfig};
use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;

/// Headroom added to the node's gas estimate (1.2x).
const GAS_LIMIT_BUFFER_BPS: u64 = 12_000;

/// What a transaction should do, before any chain state is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxCall {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl TxCall {
    /// Plain native-token transfer.
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to,
            value,
            data: Bytes::new(),
        }
    }

    /// Contract call carrying native value.
    pub fn contract(to: Address, data: Bytes, value: U256) -> Self {
        Self { to, value, data }
    }
}

/// Transaction builder for the wallet's on-chain operations.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    client: BlockchainClient,
    wallet: Wallet,
    fees: FeeCalculator,
    poller: ConfirmationPoller,
}

impl TxBuilder {
    /// Create a new transaction builder.
    pub fn new(client: BlockchainClient, wallet: Wallet, config: &TransactionConfig) -> Self {
        let fees = FeeCalculator::new(client.network().eip1559_support, config.gas_price_multiplier);
        Self {
            client,
            wallet,
            fees,
            poller: ConfirmationPoller::from_config(config),
        }
    }

    /// Build a transaction request with nonce, fees and gas limit.
    ///
    /// Callers must hold the wallet's submission lock.
    pub async fn build(&self, call: &TxCall) -> BlockchainResult<TransactionRequest> {
        let from = self.wallet.address();
        let nonce = self.client.get_transaction_count(from).await?;

        let base = TransactionRequest::default()
            .with_from(from)
            .with_to(call.to)
            .with_value(call.value)
            .with_input(call.data.clone());

        let estimated = self.client.estimate_gas(&base).await?;
        let gas_limit = estimated.saturating_mul(GAS_LIMIT_BUFFER_BPS) / 10_000;

        let fees = self.fees.compute(&self.client.fee_snapshot().await?);
        tracing::debug!(nonce = nonce, gas_limit = gas_limit, fees = ?fees, "Transaction built");

        Ok(apply_fees(
            base.with_nonce(nonce)
                .with_chain_id(self.wallet.chain_id())
                .with_gas_limit(gas_limit),
            fees,
        ))
    }

    /// Build, sign, submit and wait for a terminal receipt.
    pub async fn execute(&self, call: TxCall) -> BlockchainResult<Confirmation> {
        let _guard = self.wallet.lock_submissions().await;

        let tx = self.build(&call).await?;
        let envelope = self.wallet.sign_transaction(tx).await?;
        let tx_hash = self.client.send_raw_transaction(&envelope.encoded_2718()).await?;
        let url = self.client.network().tx_url(tx_hash);

        metrics::record_transaction("submitted");
        tracing::info!(tx_hash = %tx_hash, to = %call.to, value = %call.value, "Transaction submitted");

        let outcome = self.poller.wait(&self.client, tx_hash, url).await;
        metrics::record_transaction(if outcome.is_ok() { "confirmed" } else { "failed" });
        outcome
    }
}

/// Set fee fields and the matching type tag on a request.
pub fn apply_fees(tx: TransactionRequest, fees: FeeFields) -> TransactionRequest {
    let mut tx = match fees {
        FeeFields::Legacy { gas_price } => tx
            .with_gas_price(gas_price)
            .with_access_list(AccessList::default()),
        FeeFields::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => tx
            .with_max_fee_per_gas(max_fee_per_gas)
            .with_max_priority_fee_per_gas(max_priority_fee_per_gas),
    };
    tx.transaction_type = Some(fees.tx_type());
    tx
}
