//! Request signing for the exchange REST API.
//!
//! The signed message is `timestamp + METHOD + path [+ "?" + query] + body`,
//! where the query is the parameter set sorted by key and joined as
//! `k=v&k=v` without percent-encoding. The signature is
//! `base64(HMAC-SHA256(secret, message))`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::ApiCredentials;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_KEY: &str = "ACCESS-KEY";
pub const HEADER_SIGN: &str = "ACCESS-SIGN";
pub const HEADER_PASSPHRASE: &str = "ACCESS-PASSPHRASE";
pub const HEADER_TIMESTAMP: &str = "ACCESS-TIMESTAMP";

/// Query parameters; the map keeps them sorted by key.
pub type QueryParams = BTreeMap<&'static str, String>;

/// Signs requests with one set of API credentials.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: ApiCredentials,
}

impl RequestSigner {
    pub fn new(credentials: ApiCredentials) -> Self {
        Self { credentials }
    }

    /// Whether a key and secret are present.
    pub fn has_credentials(&self) -> bool {
        !self.credentials.api_key.is_empty() && !self.credentials.api_secret.is_empty()
    }

    /// Signature over one request.
    ///
    /// `request_path` already carries the canonical query, if any.
    pub fn sign(&self, timestamp: &str, method: &str, request_path: &str, body: &str) -> String {
        let mut mac = match HmacSha256::new_from_slice(self.credentials.api_secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC-SHA256 takes keys of any length"),
        };
        mac.update(timestamp.as_bytes());
        mac.update(method.to_ascii_uppercase().as_bytes());
        mac.update(request_path.as_bytes());
        mac.update(body.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }

    /// Full authentication header set for one request.
    pub fn headers(
        &self,
        timestamp: &str,
        method: &str,
        request_path: &str,
        body: &str,
    ) -> Vec<(&'static str, String)> {
        vec![
            (HEADER_KEY, self.credentials.api_key.clone()),
            (HEADER_SIGN, self.sign(timestamp, method, request_path, body)),
            (HEADER_PASSPHRASE, self.credentials.passphrase.clone()),
            (HEADER_TIMESTAMP, timestamp.to_string()),
            ("Content-Type", "application/json".to_string()),
            ("Accept", "application/json".to_string()),
        ]
    }
}

/// `?k=v&k=v` in key order, or an empty string for no parameters.
pub fn canonical_query(params: &QueryParams) -> String {
    if params.is_empty() {
        return String::new();
    }
    let joined = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{}", joined)
}

/// Milliseconds since the Unix epoch, as sent in `ACCESS-TIMESTAMP`.
pub fn timestamp_ms() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}
