//! Logging utilities
//!
//! This module provides:
//! - Subscriber setup for embedding applications and tests
//! - Per-call request IDs and spans
//! - Secret redaction for logged headers

use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use tracing::Span;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::http::auth::{Headers, AUTHORIZATION, X_AUTH_KEY, X_AUTH_USER_SERVICE_KEY};
use crate::types::Verb;
use crate::{Error, Result};

const REDACTED: &str = "REDACTED";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter, used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Full,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// 0 = warn, 1 = info, 2 = debug (engine call tracing), 3+ = trace
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {}
            1 => config.level = "info".to_string(),
            2 => {
                config.level = "cfapi_core=debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// `CFAPI_LOG_FORMAT` overrides the output format
    pub fn merge_with_env(&mut self) {
        if let Ok(format) = std::env::var("CFAPI_LOG_FORMAT") {
            match format.to_lowercase().as_str() {
                "compact" => self.format = LogFormat::Compact,
                "full" => self.format = LogFormat::Full,
                "json" => self.format = LogFormat::Json,
                _ => tracing::warn!("Invalid log format: {}, using default", format),
            }
        }
    }
}

/// Install a global `tracing` subscriber
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::configuration(format!("Invalid filter directive: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    // separate branches, the formatters have distinct types
    let installed = match config.format {
        LogFormat::Compact => tracing::subscriber::set_global_default(
            builder.with_ansi(std::io::stderr().is_terminal()).compact().finish(),
        ),
        LogFormat::Full => tracing::subscriber::set_global_default(
            builder.with_ansi(std::io::stderr().is_terminal()).finish(),
        ),
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish())
        }
    };

    installed.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))
}

pub fn generate_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

/// Span wrapping one endpoint call
pub fn call_span(request_id: &str, verb: Verb, endpoint: &str) -> Span {
    tracing::debug_span!(
        "cfapi.call",
        request_id = request_id,
        verb = %verb,
        endpoint = endpoint
    )
}

fn is_secret_header(name: &str) -> bool {
    [X_AUTH_KEY, X_AUTH_USER_SERVICE_KEY, AUTHORIZATION]
        .iter()
        .any(|secret| secret.eq_ignore_ascii_case(name))
}

/// Copy of `headers` safe to log
pub fn redact_headers(headers: &Headers) -> Headers {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if is_secret_header(name) {
                REDACTED.to_string()
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}
