//! Client configuration
//!
//! Engine settings are plain serde data with defaults, so an embedding
//! application can deserialize them from whatever source it likes.
//! `CFAPI_*` environment variables override individual fields.
//! Credentials are deliberately not part of this configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::http::{user_agent, ConnectionMode};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,

    /// Return `{result, result_info}` instead of only `result`
    pub raw: bool,

    /// Connection reuse policy
    pub connection: ConnectionMode,

    /// Request timeout in seconds; none means the transport default
    pub timeout_secs: Option<u64>,

    /// User-Agent override
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            raw: false,
            connection: ConnectionMode::Pooled,
            timeout_secs: None,
            user_agent: None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn with_connection(mut self, connection: ConnectionMode) -> Self {
        self.connection = connection;
        self
    }

    pub fn with_timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout_secs = Some(seconds);
        self
    }

    /// Apply `CFAPI_BASE_URL`, `CFAPI_RAW`, `CFAPI_CONNECTION` and `CFAPI_TIMEOUT_SECS`
    pub fn merge_with_env(&mut self) {
        if let Ok(base_url) = std::env::var("CFAPI_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(raw) = std::env::var("CFAPI_RAW") {
            match parse_flag(&raw) {
                Some(raw) => self.raw = raw,
                None => tracing::warn!("Invalid CFAPI_RAW value: {}, ignoring", raw),
            }
        }

        if let Ok(connection) = std::env::var("CFAPI_CONNECTION") {
            match connection.parse::<ConnectionMode>() {
                Ok(mode) => self.connection = mode,
                Err(_) => tracing::warn!("Invalid connection mode: {}, using {}", connection, self.connection),
            }
        }

        if let Ok(timeout) = std::env::var("CFAPI_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(seconds) => self.timeout_secs = Some(seconds),
                Err(_) => tracing::warn!("Invalid CFAPI_TIMEOUT_SECS value: {}, ignoring", timeout),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| Error::Configuration {
            message: format!("Invalid base URL {}: {}", self.base_url, e),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration(format!(
                "Unsupported base URL scheme: {}",
                url.scheme()
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::configuration("timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Configured User-Agent, or the crate default
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(user_agent)
    }
}
