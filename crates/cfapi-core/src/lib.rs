//! cfapi Core - Dispatch-and-normalize engine for the Cloudflare v4 REST API
//!
//! This crate turns a declarative table of REST resources into callable
//! endpoints and normalizes whatever the remote service answers into a
//! uniform result or a structured error.
//!
//! # Main Components
//!
//! - **Endpoint Registry**: Tree of resources keyed by dotted path, each with an auth mode
//! - **Auth Strategy**: Header construction for key, certificate and token credentials
//! - **Path Builder**: URL assembly from endpoint parts and caller identifiers
//! - **HTTP Executor**: Pluggable transport with pooled or per-call connections
//! - **Response Handling**: Content-type classification, envelope normalization
//!   and error unwrapping
//!
//! # Example
//!
//! ```no_run
//! use cfapi_core::{AuthMode, CallRequest, Client, CredentialBundle, EndpointDef, EndpointRegistry, Result};
//!
//! const ENDPOINTS: &[EndpointDef] = &[
//!     EndpointDef::new(AuthMode::Key, "zones", None, None),
//!     EndpointDef::new(AuthMode::Key, "zones", Some("dns_records"), None),
//! ];
//!
//! async fn example() -> Result<()> {
//!     let client = Client::builder()
//!         .registry(EndpointRegistry::from_table(ENDPOINTS)?)
//!         .credentials(CredentialBundle::new().with_email("me@example.com").with_key("..."))
//!         .build()?;
//!
//!     let records = client
//!         .endpoint("zones.dns_records")?
//!         .get(CallRequest::new().id1("023e105f4ecef8ad9ca31a8372d0c353"))
//!         .await?;
//!     println!("{}", records);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod logging;
pub mod registry;
pub mod types;

// Re-export main types for convenience
pub use client::{Client, ClientBuilder, EndpointHandle};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use credentials::CredentialBundle;
pub use error::{ApiError, Error, ErrorCategory, ErrorDetail, Result};
pub use http::{ConnectionMode, Envelope, PreparedRequest, ReqwestTransport, Transport};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use registry::{ApiPaths, Endpoint, EndpointDef, EndpointRegistry, PathParts};
pub use types::{AuthMode, CallRequest, FileAttachment, Payload, RawResponse, Verb};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
