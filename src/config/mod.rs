//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env (optional) + config file (TOML, optional)
//!     → loader.rs (parse, deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → PipelineConfig (validated, immutable)
//!     → passed explicitly to every component constructor
//!
//! secrets.rs reads credentials and the private key from the environment;
//! they are never part of PipelineConfig.
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod secrets;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    AggregatorConfig, ExchangeConfig, NetworkDescriptor, ObservabilityConfig, PipelineConfig,
    RunConfig, TokenTable, TransactionConfig,
};
pub use secrets::ApiCredentials;
