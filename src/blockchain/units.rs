//! Conversion between smallest-unit integers and human-scale decimal strings.
//!
//! Scaling is exact base-10 arithmetic on `U256`. Inputs with more fractional
//! digits than the token supports are rejected rather than truncated.

use alloy::primitives::U256;
use std::cmp::Ordering;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Largest decimal count whose scale factor (10^d) fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

fn scale(decimals: u8) -> BlockchainResult<U256> {
    if decimals > MAX_DECIMALS {
        return Err(BlockchainError::Units(format!(
            "{} decimals exceeds the supported maximum of {}",
            decimals, MAX_DECIMALS
        )));
    }
    Ok(U256::from(10u8).pow(U256::from(decimals)))
}

/// Parse a human amount such as `"11"` or `"0.001"` into smallest units.
pub fn to_smallest_unit(amount: &str, decimals: u8) -> BlockchainResult<U256> {
    let factor = scale(decimals)?;
    let amount = amount.trim();
    let invalid = || BlockchainError::Units(format!("invalid amount '{}'", amount));

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > decimals as usize {
        return Err(BlockchainError::Units(format!(
            "amount '{}' has more than {} fractional digits",
            amount, decimals
        )));
    }

    let whole = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).map_err(|_| invalid())?
    };
    let padded = format!("{:0<width$}", fraction, width = decimals as usize);
    let fraction = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded, 10).map_err(|_| invalid())?
    };

    whole
        .checked_mul(factor)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(|| BlockchainError::Units(format!("amount '{}' overflows U256", amount)))
}

/// Render smallest units as a decimal string with exactly `decimals` digits
/// after the point (no point at all for zero decimals).
pub fn from_smallest_unit(value: U256, decimals: u8) -> BlockchainResult<String> {
    let factor = scale(decimals)?;
    if decimals == 0 {
        return Ok(value.to_string());
    }
    let whole = value / factor;
    let fraction = value % factor;
    Ok(format!(
        "{}.{:0>width$}",
        whole,
        fraction.to_string(),
        width = decimals as usize
    ))
}

/// Compare two decimal strings exactly, whatever their precision.
pub fn compare_amounts(a: &str, b: &str) -> BlockchainResult<Ordering> {
    let digits = |s: &str| s.trim().split_once('.').map_or(0, |(_, f)| f.len());
    let decimals = digits(a).max(digits(b)).min(MAX_DECIMALS as usize) as u8;
    Ok(to_smallest_unit(a, decimals)?.cmp(&to_smallest_unit(b, decimals)?))
}
