//! Gas pricing for outgoing transactions.
//!
//! Pure computation lives here; the RPC reads it needs (gas price, fee
//! history) are done by [`crate::blockchain::client::BlockchainClient`].

use crate::blockchain::types::FeeFields;

/// Blocks sampled from fee history.
pub const FEE_HISTORY_BLOCKS: u64 = 5;
/// Reward percentile sampled from each block.
pub const PRIORITY_FEE_PERCENTILE: f64 = 20.0;

const BPS: u128 = 10_000;
/// 1.05x applied to the averaged priority fee.
const PRIORITY_BUMP_BPS: u128 = 10_500;
/// 1.2x applied to the legacy gas price.
const LEGACY_BUMP_BPS: u128 = 12_000;
/// Clamp target for the priority fee, as a share of the max fee.
const PRIORITY_CLAMP_BPS: u128 = 9_500;

/// Network conditions sampled for one transaction.
#[derive(Debug, Clone, Default)]
pub struct FeeSnapshot {
    /// Current `eth_gasPrice`.
    pub gas_price: u128,
    /// Base fee of the next block, if the node reported one.
    pub base_fee: Option<u128>,
    /// Per-block reward samples at [`PRIORITY_FEE_PERCENTILE`].
    pub rewards: Vec<Vec<u128>>,
}

/// Computes fee fields from a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct FeeCalculator {
    eip1559: bool,
    multiplier_bps: u128,
}

impl FeeCalculator {
    pub fn new(eip1559: bool, gas_price_multiplier: f64) -> Self {
        Self {
            eip1559,
            multiplier_bps: to_bps(gas_price_multiplier),
        }
    }

    pub fn compute(&self, snapshot: &FeeSnapshot) -> FeeFields {
        if !self.eip1559 {
            let gas_price = scale(scale(snapshot.gas_price, LEGACY_BUMP_BPS), self.multiplier_bps);
            return FeeFields::Legacy { gas_price };
        }

        let base_fee = snapshot.base_fee.unwrap_or(snapshot.gas_price);
        let average = average_priority_fee(&snapshot.rewards);
        let mut max_priority_fee_per_gas =
            scale(scale(average, PRIORITY_BUMP_BPS), self.multiplier_bps);
        let max_fee_per_gas = base_fee.saturating_add(max_priority_fee_per_gas);

        // Only reachable when the addition saturates.
        if max_priority_fee_per_gas > max_fee_per_gas {
            max_priority_fee_per_gas = scale(max_fee_per_gas, PRIORITY_CLAMP_BPS);
        }

        FeeFields::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        }
    }
}

/// Rounded mean of the non-zero first-percentile samples; zero when every
/// sample is zero or the history is empty.
pub fn average_priority_fee(rewards: &[Vec<u128>]) -> u128 {
    let samples: Vec<u128> = rewards
        .iter()
        .filter_map(|block| block.first().copied())
        .filter(|fee| *fee != 0)
        .collect();

    let divisor = samples.len().max(1) as u128;
    let sum = samples.iter().fold(0u128, |acc, fee| acc.saturating_add(*fee));
    sum.saturating_add(divisor / 2) / divisor
}

fn to_bps(multiplier: f64) -> u128 {
    if multiplier.is_finite() && multiplier > 0.0 {
        (multiplier * BPS as f64).round() as u128
    } else {
        BPS
    }
}

fn scale(value: u128, bps: u128) -> u128 {
    value.saturating_mul(bps) / BPS
}
