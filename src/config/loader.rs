//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::PipelineConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the optional TOML config path.
pub const CONFIG_PATH_ENV_VAR: &str = "CEX_PIPELINE_CONFIG";
/// Overrides `transactions.unlimited_approve`.
pub const UNLIMITED_APPROVE_ENV_VAR: &str = "UNLIMITED_APPROVE";
/// Overrides `transactions.gas_price_multiplier`.
pub const GAS_PRICE_MULTIPLIER_ENV_VAR: &str = "GAS_PRICE_MULTIPLIER";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    MissingVar(&'static str),
    InvalidVar { name: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::MissingVar(name) => write!(f, "Environment variable {} not set", name),
            ConfigError::InvalidVar { name, value } => {
                write!(f, "Environment variable {} has invalid value '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load the process configuration.
///
/// Reads `.env` if present, then the TOML file named by `CEX_PIPELINE_CONFIG`
/// (built-in defaults when unset), then applies environment overrides and
/// validates the result.
pub fn load_from_env() -> Result<PipelineConfig, ConfigError> {
    let _ = dotenv::dotenv();
    let path = std::env::var(CONFIG_PATH_ENV_VAR).ok();
    load_config(path.as_deref().map(Path::new), |name| std::env::var(name).ok())
}

/// Load configuration from an optional TOML file; `None` means defaults only.
pub fn load_config<F>(path: Option<&Path>, lookup: F) -> Result<PipelineConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let content = match path {
        Some(path) => fs::read_to_string(path).map_err(ConfigError::Io)?,
        None => String::new(),
    };
    parse_config(&content, lookup)
}

/// Parse TOML text, apply environment overrides and validate.
pub fn parse_config<F>(content: &str, lookup: F) -> Result<PipelineConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: PipelineConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the environment overrides supported on top of the file.
pub fn apply_env_overrides<F>(config: &mut PipelineConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(UNLIMITED_APPROVE_ENV_VAR) {
        config.transactions.unlimited_approve = parse_bool(&raw).ok_or(ConfigError::InvalidVar {
            name: UNLIMITED_APPROVE_ENV_VAR,
            value: raw.clone(),
        })?;
    }

    if let Some(raw) = lookup(GAS_PRICE_MULTIPLIER_ENV_VAR) {
        config.transactions.gas_price_multiplier =
            raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: GAS_PRICE_MULTIPLIER_ENV_VAR,
                value: raw.clone(),
            })?;
    }

    Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
