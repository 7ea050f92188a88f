//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use thiserror::Error;

// Re-export the network descriptor from config module to avoid duplication
pub use crate::config::schema::{NetworkDescriptor, TransactionConfig};

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Fee computation failed.
    #[error("Fee computation failed: {0}")]
    Fees(String),

    /// Transaction could not be assembled or signed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Raw transaction broadcast failed.
    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    /// No terminal receipt within the confirmation budget.
    #[error("Transaction not confirmed after {waited_secs}s: {url}")]
    ConfirmationTimeout { url: String, waited_secs: u64 },

    /// Receipt lookups kept failing while waiting for confirmation.
    #[error("Receipt lookup failed {attempts} times in a row ({last_error}): {url}")]
    LookupFailed {
        url: String,
        attempts: u32,
        last_error: String,
    },

    /// Transaction was mined with a failure status.
    #[error("Transaction failed: {url}")]
    Reverted { url: String },

    /// Contract call or calldata problem.
    #[error("Contract error: {0}")]
    Contract(String),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Amount conversion error.
    #[error("Unit conversion error: {0}")]
    Units(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Outcome of a single receipt lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptPoll {
    /// The node does not know a receipt for the hash yet.
    NotFound,
    /// A receipt exists but carries no final status.
    Pending,
    /// The transaction was mined.
    Confirmed { success: bool },
}

/// A successfully confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub explorer_url: String,
}

/// Gas pricing for a pending transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeFields {
    Legacy {
        gas_price: u128,
    },
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

impl FeeFields {
    /// EIP-2718 transaction type tag.
    pub fn tx_type(&self) -> u8 {
        match self {
            FeeFields::Legacy { .. } => 1,
            FeeFields::Eip1559 { .. } => 2,
        }
    }
}
