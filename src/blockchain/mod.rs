//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! PRIVATE_KEY (environment)
//!     → wallet.rs (key loading, signing, submission lock)
//! NetworkDescriptor (config)
//!     → client.rs (RPC endpoints with timeouts and read failover)
//!     → erc20.rs (token reads, approve calldata)
//! ChainClient (chain.rs)
//!     → approval.rs (allowance check, at most one approval)
//!     → transaction.rs (nonce, fees.rs, gas, sign, broadcast)
//!     → confirmation.rs (receipt polling until a terminal state)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - One in-flight transaction per wallet

pub mod approval;
pub mod chain;
pub mod client;
pub mod confirmation;
pub mod erc20;
pub mod fees;
pub mod transaction;
pub mod types;
pub mod units;
pub mod wallet;

pub use approval::{ApprovalGate, ApprovalOutcome, Erc20Approvals};
pub use chain::ChainClient;
pub use client::BlockchainClient;
pub use confirmation::{ConfirmationPoller, ReceiptLookup};
pub use transaction::{TxBuilder, TxCall};
pub use types::{BlockchainError, BlockchainResult, ChainId, Confirmation, FeeFields, ReceiptPoll};
pub use units::{from_smallest_unit, to_smallest_unit};
pub use wallet::Wallet;
