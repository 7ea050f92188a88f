//! Centralized exchange integration.
//!
//! # Data Flow
//! ```text
//! ApiCredentials (environment)
//!     → signer.rs (canonical message, HMAC-SHA256, auth headers)
//!     → client.rs (withdraw, deposit address, balances, history)
//!     → types.rs (response envelope, typed records, errors)
//! ```

pub mod client;
pub mod signer;
pub mod types;

pub use client::ExchangeClient;
pub use signer::RequestSigner;
pub use types::{
    AssetBalance, DepositAddress, ExchangeError, ExchangeResult, HistoryQuery, TransferRecord,
    WithdrawalAck,
};
