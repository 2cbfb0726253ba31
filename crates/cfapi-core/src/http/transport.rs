//! Transport seam between the engine and the network
//!
//! [`ReqwestTransport`] is the production implementation. Tests plug in
//! their own [`Transport`] to serve canned responses.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::http::builder::PreparedRequest;
use crate::types::{Payload, RawResponse, Verb};
use crate::{Error, Result};

/// Performs one HTTP exchange
///
/// Any `Err` is treated as a transport fault and reported to the caller as
/// `connection failed.`; status codes are never errors at this level.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> anyhow::Result<RawResponse>;
}

/// Connection reuse policy of [`ReqwestTransport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionMode {
    /// One connection pool shared by every call
    #[default]
    Pooled,
    /// Fresh connection for every call
    PerCall,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::Pooled => write!(f, "pooled"),
            ConnectionMode::PerCall => write!(f, "per-call"),
        }
    }
}

impl FromStr for ConnectionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pooled" | "session" | "sessions" => Ok(ConnectionMode::Pooled),
            "per-call" | "per_call" | "fresh" => Ok(ConnectionMode::PerCall),
            other => Err(Error::configuration(format!("Invalid connection mode: {}", other))),
        }
    }
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    mode: ConnectionMode,
    timeout: Option<Duration>,
    pooled: Option<ReqwestClient>,
}

impl ReqwestTransport {
    pub fn new(mode: ConnectionMode, timeout: Option<Duration>) -> Result<Self> {
        let pooled = match mode {
            ConnectionMode::Pooled => Some(build_client(timeout, true).map_err(|e| Error::Internal {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e.into()),
            })?),
            ConnectionMode::PerCall => None,
        };

        Ok(Self { mode, timeout, pooled })
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    fn client(&self) -> reqwest::Result<ReqwestClient> {
        match &self.pooled {
            Some(client) => Ok(client.clone()),
            None => build_client(self.timeout, false),
        }
    }
}

fn build_client(timeout: Option<Duration>, pooled: bool) -> reqwest::Result<ReqwestClient> {
    let mut builder = ReqwestClient::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    if !pooled {
        builder = builder.pool_max_idle_per_host(0);
    }
    builder.build()
}

fn method(verb: Verb) -> Method {
    match verb {
        Verb::Get => Method::GET,
        Verb::Post => Method::POST,
        Verb::Put => Method::PUT,
        Verb::Delete => Method::DELETE,
        Verb::Patch => Method::PATCH,
    }
}

/// Multipart form carrying the attachments plus the body's top-level fields
fn multipart_form(request: &PreparedRequest) -> reqwest::Result<Form> {
    let mut form = Form::new();

    if let Payload::Json(Value::Object(fields)) = &request.payload {
        for (name, value) in fields {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            form = form.text(name.clone(), text);
        }
    }

    for file in &request.files {
        let mut part = Part::bytes(file.content.clone()).file_name(file.file_name.clone());
        if let Some(mime) = &file.mime_type {
            part = part.mime_str(mime)?;
        }
        form = form.part(file.field.clone(), part);
    }

    Ok(form)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> anyhow::Result<RawResponse> {
        let client = self.client()?;

        let mut builder = client.request(method(request.verb), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }

        if !request.files.is_empty() {
            builder = builder.multipart(multipart_form(request)?);
        } else {
            match &request.payload {
                Payload::None => {}
                Payload::Json(body) => builder = builder.json(body),
                Payload::Text(body) => builder = builder.body(body.clone()),
            }
        }

        let response = builder.send().await?;
        tracing::debug!(url = %response.url(), "Response: url");

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse { content_type, status, body })
    }
}
