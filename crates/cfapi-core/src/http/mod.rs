//! HTTP pipeline for endpoint calls
//!
//! This module provides the stages every call goes through:
//! - Header construction for each auth mode
//! - URL building from endpoint parts and identifiers
//! - Execution over a pluggable transport
//! - Response classification by content type and status
//! - Envelope normalization and error unwrapping

pub mod auth;
pub mod builder;
pub mod classifier;
pub mod error;
pub mod executor;
pub mod normalizer;
pub mod transport;

pub use auth::{build_headers, user_agent, Headers};
pub use builder::{PreparedRequest, RequestBuilder};
pub use classifier::{decode, effective_content_type, MediaType};
pub use error::{extract_api_error, unwrap_envelope};
pub use executor::HttpExecutor;
pub use normalizer::{normalize, Envelope};
pub use transport::{ConnectionMode, ReqwestTransport, Transport};
