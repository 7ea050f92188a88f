//! Runs the withdraw → swap → deposit pipeline once.
//!
//! Configuration comes from the TOML file named by `CEX_PIPELINE_CONFIG`
//! (defaults apply when unset) plus secrets from the environment or `.env`.

use std::process::ExitCode;

use cex_swap_pipeline::blockchain::{BlockchainClient, ChainClient, Wallet};
use cex_swap_pipeline::config::{loader, secrets, ApiCredentials};
use cex_swap_pipeline::exchange::ExchangeClient;
use cex_swap_pipeline::observability::{logging, metrics};
use cex_swap_pipeline::swap::SwapClient;
use cex_swap_pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineOutcome};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match loader::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_logging(&config.observability);

    tracing::info!(
        network = %config.network.name,
        chain_id = config.network.chain_id,
        stable_coin = %config.pipeline.stable_coin,
        withdraw_amount = %config.pipeline.withdraw_amount,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    match run(&config).await {
        Ok(PipelineOutcome::Deposited { amount, deposit, .. }) => {
            tracing::info!(amount = %amount, url = %deposit.explorer_url, "Deposit sent");
            ExitCode::SUCCESS
        }
        Ok(PipelineOutcome::NothingToDeposit { native_balance, .. }) => {
            tracing::warn!(balance = %native_balance, "Run finished without a deposit");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Pipeline failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &PipelineConfig) -> Result<PipelineOutcome, PipelineError> {
    let proxy = secrets::proxy_from_env();
    let credentials = ApiCredentials::from_env()?;
    let wallet = Wallet::from_env(config.network.chain_id)?;
    tracing::info!(address = %wallet.address(), proxied = proxy.is_some(), "Using wallet");

    let rpc = BlockchainClient::new(config.network.clone(), proxy.as_deref()).await?;
    let chain = ChainClient::new(rpc, wallet, &config.transactions);
    let exchange = ExchangeClient::new(&config.exchange, credentials, proxy.as_deref())?;

    let native_token = config
        .tokens
        .address(&config.network.native_token)
        .ok_or_else(|| PipelineError::UnknownToken(config.network.native_token.clone()))?;
    let swap = SwapClient::new(&config.aggregator, chain.clone(), native_token, proxy.as_deref())?;

    Pipeline::new(config, exchange, chain, swap)?.run().await
}
