//! Error types for the cfapi core library
//!
//! Every failure of a call surfaces as exactly one of four categories:
//! configuration, connectivity, API, or internal. `thiserror` provides the
//! definitions and `anyhow` carries boxed transport and parse sources.

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Main error type for cfapi operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing credentials or a verb that the endpoint does not offer
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
    },

    /// Transport failure or a 5xx status from the remote service
    #[error("{message}")]
    Connectivity {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// `success=false` envelope returned by the remote service
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Engine invariant violation
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal { message: message.into(), source: None }
    }

    /// The `connection failed.` error every transport fault collapses into
    pub fn connection_failed(source: anyhow::Error) -> Self {
        Error::Connectivity {
            message: "connection failed.".to_string(),
            status_code: None,
            source: Some(source),
        }
    }

    /// Numeric code: service-assigned for API errors, 0 for everything raised client-side
    pub fn code(&self) -> i64 {
        match self {
            Error::Api(api) => api.code,
            _ => 0,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Configuration { .. } => ErrorCategory::Configuration,
            Error::Connectivity { .. } => ErrorCategory::Connectivity,
            Error::Api(_) => ErrorCategory::Api,
            Error::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Only connectivity failures are worth retrying; the engine never does it itself
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    Configuration,
    Connectivity,
    Api,
    Internal,
}

impl ErrorCategory {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Connectivity)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Connectivity => write!(f, "connectivity"),
            ErrorCategory::Api => write!(f, "api"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

/// One entry of an error or of its chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_chain: Vec<ErrorDetail>,
}

/// Error reported by the remote service in a `success=false` envelope
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("API error [{code}]: {message}")]
pub struct ApiError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_chain: Vec<ErrorDetail>,
}

impl ApiError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            error_chain: Vec::new(),
        }
    }

    pub fn with_chain(mut self, chain: Vec<ErrorDetail>) -> Self {
        self.error_chain = chain;
        self
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal {
            message: format!("JSON error: {}", err),
            source: Some(err.into()),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
