//! Confirmation polling for submitted transactions.
//!
//! # States
//! ```text
//! Submitted ──NotFound/Pending──▶ sleep(interval) ──▶ Submitted
//!     │                                 (elapsed > timeout → TimedOut)
//!     ├──Confirmed{success: true}──▶ Confirmed-Success
//!     ├──Confirmed{success: false}─▶ Confirmed-Failure
//!     └──lookup error──▶ sleep(interval), at most N in a row → LookupFailed
//! ```

use alloy::primitives::TxHash;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

use crate::blockchain::types::{
    BlockchainError, BlockchainResult, Confirmation, ReceiptPoll, TransactionConfig,
};

/// Source of receipt lookups for the poller.
#[async_trait]
pub trait ReceiptLookup: Send + Sync {
    async fn lookup_receipt(&self, tx_hash: TxHash) -> BlockchainResult<ReceiptPoll>;
}

/// Polls a receipt source at a fixed interval until a terminal state.
#[derive(Debug, Clone)]
pub struct ConfirmationPoller {
    poll_interval: Duration,
    timeout: Duration,
    max_consecutive_errors: u32,
}

impl ConfirmationPoller {
    pub fn new(poll_interval: Duration, timeout: Duration, max_consecutive_errors: u32) -> Self {
        Self {
            poll_interval,
            timeout,
            max_consecutive_errors,
        }
    }

    pub fn from_config(config: &TransactionConfig) -> Self {
        Self::new(
            Duration::from_secs(config.poll_interval_secs),
            Duration::from_secs(config.confirmation_timeout_secs),
            config.max_consecutive_lookup_errors,
        )
    }

    /// Wait for a terminal receipt.
    ///
    /// # Arguments
    /// * `lookup` - Receipt source
    /// * `tx_hash` - Transaction hash to monitor
    /// * `explorer_url` - Link reported in the outcome and in errors
    pub async fn wait<L>(
        &self,
        lookup: &L,
        tx_hash: TxHash,
        explorer_url: String,
    ) -> BlockchainResult<Confirmation>
    where
        L: ReceiptLookup + ?Sized,
    {
        let mut elapsed = Duration::ZERO;
        let mut consecutive_errors = 0u32;

        loop {
            match lookup.lookup_receipt(tx_hash).await {
                Ok(ReceiptPoll::Confirmed { success: true }) => {
                    tracing::info!(tx_hash = %tx_hash, url = %explorer_url, "Transaction successful");
                    return Ok(Confirmation {
                        tx_hash,
                        explorer_url,
                    });
                }
                Ok(ReceiptPoll::Confirmed { success: false }) => {
                    tracing::error!(tx_hash = %tx_hash, url = %explorer_url, "Transaction failed");
                    return Err(BlockchainError::Reverted { url: explorer_url });
                }
                Ok(ReceiptPoll::NotFound) => {
                    consecutive_errors = 0;
                    if elapsed > self.timeout {
                        tracing::error!(
                            tx_hash = %tx_hash,
                            waited_secs = elapsed.as_secs(),
                            "Transaction not confirmed in time"
                        );
                        return Err(BlockchainError::ConfirmationTimeout {
                            url: explorer_url,
                            waited_secs: elapsed.as_secs(),
                        });
                    }
                    tracing::debug!(tx_hash = %tx_hash, elapsed_secs = elapsed.as_secs(), "Transaction pending");
                }
                Ok(ReceiptPoll::Pending) => {
                    consecutive_errors = 0;
                    if elapsed > self.timeout {
                        tracing::error!(
                            tx_hash = %tx_hash,
                            waited_secs = elapsed.as_secs(),
                            "Transaction not confirmed in time"
                        );
                        return Err(BlockchainError::ConfirmationTimeout {
                            url: explorer_url,
                            waited_secs: elapsed.as_secs(),
                        });
                    }
                    tracing::debug!(tx_hash = %tx_hash, "Receipt present without final status");
                }
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::warn!(
                        tx_hash = %tx_hash,
                        attempt = consecutive_errors,
                        error = %e,
                        "Receipt lookup failed"
                    );
                    if consecutive_errors > self.max_consecutive_errors || elapsed > self.timeout {
                        return Err(BlockchainError::LookupFailed {
                            url: explorer_url,
                            attempts: consecutive_errors,
                            last_error: e.to_string(),
                        });
                    }
                }
            }

            elapsed += self.poll_interval;
            sleep(self.poll_interval).await;
        }
    }
}
