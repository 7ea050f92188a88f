//! End-to-end run: withdraw → wait → swap → deposit.
//!
//! # Data Flow
//! ```text
//! ExchangeClient::withdraw(stable coin → wallet)
//!     → sleep(arrival wait)
//!     → ChainClient::token_balance(stable coin)
//!     → SwapClient::swap(full balance → native)
//!     → ChainClient::native_balance
//!     → ExchangeClient::deposit_address(native)
//!     → ChainClient::send_native(balance - gas reserve)
//! ```
//!
//! Any failure aborts the run; nothing is rolled back.

use alloy::primitives::{Address, U256};
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::units::{from_smallest_unit, to_smallest_unit};
use crate::blockchain::{BlockchainError, ChainClient, Confirmation};
use crate::config::{ConfigError, PipelineConfig, RunConfig};
use crate::exchange::{ExchangeClient, ExchangeError, WithdrawalAck};
use crate::swap::{SwapClient, SwapError, SwapOutcome};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Swap error: {0}")]
    Swap(#[from] SwapError),

    #[error("Blockchain error: {0}")]
    Blockchain(#[from] BlockchainError),

    #[error("Token {0} has no valid address in the token table")]
    UnknownToken(String),

    #[error("Invalid deposit address '{0}'")]
    InvalidDepositAddress(String),
}

/// How a completed run ended.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// Native balance was sent back to the exchange.
    Deposited {
        withdrawal: WithdrawalAck,
        swap: SwapOutcome,
        deposit: Confirmation,
        amount: String,
    },
    /// Balance did not exceed the gas reserve; nothing was sent.
    NothingToDeposit {
        withdrawal: WithdrawalAck,
        swap: SwapOutcome,
        native_balance: String,
    },
}

pub struct Pipeline {
    exchange: ExchangeClient,
    chain: ChainClient,
    swap: SwapClient,
    settings: RunConfig,
    exchange_chain: String,
    stable_token: Address,
    native_token: Address,
}

impl Pipeline {
    pub fn new(
        config: &PipelineConfig,
        exchange: ExchangeClient,
        chain: ChainClient,
        swap: SwapClient,
    ) -> Result<Self, PipelineError> {
        let stable_token = resolve_token(config, &config.pipeline.stable_coin)?;
        let native_token = resolve_token(config, &config.network.native_token)?;

        Ok(Self {
            exchange,
            chain,
            swap,
            settings: config.pipeline.clone(),
            exchange_chain: config.network.exchange_chain.to_uppercase(),
            stable_token,
            native_token,
        })
    }

    pub async fn run(&self) -> Result<PipelineOutcome, PipelineError> {
        let wallet = self.chain.address();
        let stable = &self.settings.stable_coin;
        let native = &self.chain.network().native_token;
        let native_decimals = self.chain.network().native_decimals;
        tracing::info!(wallet = %wallet, network = %self.chain.network().name, "Pipeline starting");

        tracing::info!(
            coin = %stable,
            amount = %self.settings.withdraw_amount,
            to = %wallet,
            "Withdrawing from exchange"
        );
        let withdrawal = self
            .exchange
            .withdraw(
                stable,
                &self.exchange_chain,
                &self.settings.withdraw_amount,
                &wallet.to_string(),
                None,
            )
            .await?;

        tracing::info!(wait_secs = self.settings.arrival_wait_secs, "Waiting for funds to arrive in wallet");
        tokio::time::sleep(Duration::from_secs(self.settings.arrival_wait_secs)).await;

        let stable_balance = self.chain.token_balance(self.stable_token).await?;
        let stable_decimals = self.chain.token_decimals(self.stable_token).await?;
        let stable_display = from_smallest_unit(stable_balance, stable_decimals)?;
        tracing::info!(coin = %stable, balance = %stable_display, "Wallet balance after withdrawal");

        let swap = self
            .swap
            .swap(
                self.stable_token,
                self.native_token,
                stable_balance,
                self.settings.slippage_percent,
            )
            .await?;
        tracing::info!(
            tx_hash = %swap.confirmation.tx_hash,
            url = %swap.confirmation.explorer_url,
            "Swap completed"
        );

        let native_balance = self.chain.native_balance().await?;
        let native_display = from_smallest_unit(native_balance, native_decimals)?;
        tracing::info!(coin = %native, balance = %native_display, "Native balance after swap");

        let deposit = self
            .exchange
            .deposit_address(native, Some(&self.exchange_chain))
            .await?;
        let deposit_address: Address = deposit
            .address
            .parse()
            .map_err(|_| PipelineError::InvalidDepositAddress(deposit.address.clone()))?;
        tracing::info!(coin = %native, address = %deposit_address, "Exchange deposit address");

        let reserve = to_smallest_unit(&self.settings.gas_reserve, native_decimals)?;
        let Some(amount) = sendable_amount(native_balance, reserve) else {
            tracing::error!(
                balance = %native_display,
                reserve = %self.settings.gas_reserve,
                "Not enough native balance to transfer back to the exchange"
            );
            return Ok(PipelineOutcome::NothingToDeposit {
                withdrawal,
                swap,
                native_balance: native_display,
            });
        };

        let amount_display = from_smallest_unit(amount, native_decimals)?;
        tracing::info!(coin = %native, amount = %amount_display, "Sending back to exchange");
        let confirmation = self.chain.send_native(deposit_address, amount).await?;

        tracing::info!(url = %confirmation.explorer_url, "Pipeline completed successfully");
        Ok(PipelineOutcome::Deposited {
            withdrawal,
            swap,
            deposit: confirmation,
            amount: amount_display,
        })
    }
}

/// Native amount left after keeping `reserve` for gas; `None` when that is
/// not strictly positive.
pub fn sendable_amount(balance: U256, reserve: U256) -> Option<U256> {
    balance.checked_sub(reserve).filter(|amount| !amount.is_zero())
}

fn resolve_token(config: &PipelineConfig, symbol: &str) -> Result<Address, PipelineError> {
    config
        .tokens
        .address(symbol)
        .ok_or_else(|| PipelineError::UnknownToken(symbol.to_string()))
}
