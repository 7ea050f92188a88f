//! CEX → DEX → CEX pipeline library.
//!
//! Withdraws a stablecoin from a centralized exchange to a self-custodied
//! wallet, swaps it for the chain's native asset through a DEX aggregator and
//! deposits the result back to the exchange.

// Core subsystems
pub mod blockchain;
pub mod config;
pub mod exchange;
pub mod swap;

// Orchestration
pub mod pipeline;

// Cross-cutting concerns
pub mod observability;

pub use config::schema::PipelineConfig;
pub use pipeline::{Pipeline, PipelineError, PipelineOutcome};
