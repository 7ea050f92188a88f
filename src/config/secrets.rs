//! Secrets read from the process environment.
//!
//! Secrets never live in the TOML file and are redacted from `Debug` output.

use crate::config::loader::ConfigError;

pub const API_KEY_ENV_VAR: &str = "BITGET_API_KEY";
pub const API_SECRET_ENV_VAR: &str = "BITGET_API_SECRET";
pub const API_PASSPHRASE_ENV_VAR: &str = "BITGET_API_PASSPHRASE";
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";
pub const PROXY_ENV_VAR: &str = "PROXY";

/// Exchange API credentials.
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub passphrase: String,
}

impl ApiCredentials {
    /// Read all three credentials; a missing or empty one is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: required(&lookup, API_KEY_ENV_VAR)?,
            api_secret: required(&lookup, API_SECRET_ENV_VAR)?,
            passphrase: required(&lookup, API_PASSPHRASE_ENV_VAR)?,
        })
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Wallet private key as read from the environment.
pub fn private_key_from_env() -> Result<String, ConfigError> {
    required(&|name: &str| std::env::var(name).ok(), PRIVATE_KEY_ENV_VAR)
}

/// Optional HTTP proxy (`host:port` or a full URL).
///
/// A bare `host:port` is treated as `http://host:port`.
pub fn proxy_from_env() -> Option<String> {
    std::env::var(PROXY_ENV_VAR)
        .ok()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(|p| normalize_proxy(&p))
}

pub(crate) fn normalize_proxy(proxy: &str) -> String {
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}
