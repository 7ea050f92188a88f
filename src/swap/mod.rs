//! DEX aggregator integration (quote, assemble, submit).

pub mod client;
pub mod types;

pub use client::SwapClient;
pub use types::{AssembledSwap, QuoteResponse, SwapError, SwapOutcome, SwapResult};
