//! Allowance check and approval before a token is spent.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use crate::blockchain::types::{BlockchainResult, Confirmation, TransactionConfig};

/// Allowance reads and approval submissions for the wallet.
#[async_trait]
pub trait Erc20Approvals: Send + Sync {
    /// Current allowance granted by the wallet to `spender`.
    async fn allowance(&self, token: Address, spender: Address) -> BlockchainResult<U256>;

    /// Submit `approve(spender, amount)` and wait for a successful receipt.
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> BlockchainResult<Confirmation>;
}

/// Result of [`ApprovalGate::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Existing allowance already covers the amount.
    NotNeeded,
    /// An approval was confirmed on chain.
    Approved(Confirmation),
}

/// Makes sure a spender may move at least the required amount.
#[derive(Debug, Clone)]
pub struct ApprovalGate {
    unlimited: bool,
    settle_min: Duration,
    settle_max: Duration,
}

impl ApprovalGate {
    pub fn new(unlimited: bool, settle_min: Duration, settle_max: Duration) -> Self {
        Self {
            unlimited,
            settle_min,
            settle_max: settle_max.max(settle_min),
        }
    }

    pub fn from_config(config: &TransactionConfig) -> Self {
        Self::new(
            config.unlimited_approve,
            Duration::from_secs(config.approval_settle_min_secs),
            Duration::from_secs(config.approval_settle_max_secs),
        )
    }

    /// Approve `spender` for `required` units of `token` if the current
    /// allowance is short. Issues at most one approval.
    pub async fn ensure<A>(
        &self,
        approvals: &A,
        token: Address,
        spender: Address,
        required: U256,
    ) -> BlockchainResult<ApprovalOutcome>
    where
        A: Erc20Approvals + ?Sized,
    {
        let current = approvals.allowance(token, spender).await?;
        if current >= required {
            tracing::debug!(
                token = %token,
                spender = %spender,
                allowance = %current,
                "Allowance sufficient"
            );
            return Ok(ApprovalOutcome::NotNeeded);
        }

        let amount = if self.unlimited { U256::MAX } else { required };
        tracing::info!(
            token = %token,
            spender = %spender,
            unlimited = self.unlimited,
            "Approving token"
        );
        let confirmation = approvals.approve(token, spender, amount).await?;

        let settle = self.settle_delay();
        tracing::debug!(settle_ms = settle.as_millis() as u64, "Waiting for approval to settle");
        tokio::time::sleep(settle).await;

        Ok(ApprovalOutcome::Approved(confirmation))
    }

    fn settle_delay(&self) -> Duration {
        let min = self.settle_min.as_millis() as u64;
        let max = self.settle_max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
