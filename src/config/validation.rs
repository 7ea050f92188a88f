//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (pipeline symbols exist in the token table)
//! - Validate value ranges (intervals > 0, multiplier positive, decimals fit U256)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PipelineConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use thiserror::Error;

use crate::blockchain::units::{to_smallest_unit, MAX_DECIMALS};
use crate::config::schema::PipelineConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("network.rpcs must contain at least one endpoint")]
    NoRpcEndpoints,

    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: String, value: String },

    #[error("network.chain_id must be non-zero")]
    ZeroChainId,

    #[error("network.native_decimals must be at most {MAX_DECIMALS}, got {0}")]
    DecimalsOutOfRange(u8),

    #[error("tokens.{symbol} is not a valid address: {value}")]
    InvalidTokenAddress { symbol: String, value: String },

    #[error("token {0} is referenced but missing from [tokens]")]
    MissingToken(String),

    #[error("{field} must be greater than zero")]
    NotPositive { field: String },

    #[error("transactions.approval_settle_min_secs ({min}) exceeds approval_settle_max_secs ({max})")]
    SettleRange { min: u64, max: u64 },

    #[error("{field} is not a valid decimal amount: {value}")]
    InvalidAmount { field: String, value: String },

    #[error("pipeline.slippage_percent must be in (0, 100], got {0}")]
    SlippageOutOfRange(String),
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let network = &config.network;

    if network.rpcs.is_empty() {
        errors.push(ValidationError::NoRpcEndpoints);
    }
    for rpc in &network.rpcs {
        check_url(&mut errors, "network.rpcs", rpc);
    }
    check_url(&mut errors, "network.explorer", &network.explorer);
    check_url(&mut errors, "exchange.base_url", &config.exchange.base_url);
    check_url(&mut errors, "aggregator.base_url", &config.aggregator.base_url);

    if network.chain_id == 0 {
        errors.push(ValidationError::ZeroChainId);
    }
    if network.native_decimals > MAX_DECIMALS {
        errors.push(ValidationError::DecimalsOutOfRange(network.native_decimals));
    }
    if network.rpc_timeout_secs == 0 {
        errors.push(not_positive("network.rpc_timeout_secs"));
    }

    for (symbol, value) in &config.tokens.0 {
        if value.parse::<Address>().is_err() {
            errors.push(ValidationError::InvalidTokenAddress {
                symbol: symbol.clone(),
                value: value.clone(),
            });
        }
    }
    for symbol in [&network.native_token, &config.pipeline.stable_coin] {
        if config.tokens.get(symbol).is_none() {
            errors.push(ValidationError::MissingToken(symbol.clone()));
        }
    }

    let tx = &config.transactions;
    if !(tx.gas_price_multiplier.is_finite() && tx.gas_price_multiplier > 0.0) {
        errors.push(not_positive("transactions.gas_price_multiplier"));
    }
    if tx.poll_interval_secs == 0 {
        errors.push(not_positive("transactions.poll_interval_secs"));
    }
    if tx.confirmation_timeout_secs == 0 {
        errors.push(not_positive("transactions.confirmation_timeout_secs"));
    }
    if tx.approval_settle_min_secs > tx.approval_settle_max_secs {
        errors.push(ValidationError::SettleRange {
            min: tx.approval_settle_min_secs,
            max: tx.approval_settle_max_secs,
        });
    }

    let run = &config.pipeline;
    if to_smallest_unit(&run.withdraw_amount, network.native_decimals.min(MAX_DECIMALS)).is_err() {
        errors.push(ValidationError::InvalidAmount {
            field: "pipeline.withdraw_amount".to_string(),
            value: run.withdraw_amount.clone(),
        });
    }
    if to_smallest_unit(&run.gas_reserve, network.native_decimals.min(MAX_DECIMALS)).is_err() {
        errors.push(ValidationError::InvalidAmount {
            field: "pipeline.gas_reserve".to_string(),
            value: run.gas_reserve.clone(),
        });
    }
    if !(run.slippage_percent > 0.0 && run.slippage_percent <= 100.0) {
        errors.push(ValidationError::SlippageOutOfRange(run.slippage_percent.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if url::Url::parse(value).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

fn not_positive(field: &str) -> ValidationError {
    ValidationError::NotPositive {
        field: field.to_string(),
    }
}
