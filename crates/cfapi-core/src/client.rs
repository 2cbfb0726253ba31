//! Client facade orchestrating all components
//!
//! Provides the uniform call interface: look up an endpoint, build headers
//! and URL, execute, classify, normalize and unwrap.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

use crate::config::ClientConfig;
use crate::credentials::CredentialBundle;
use crate::http::{
    build_headers, decode, normalize, unwrap_envelope, HttpExecutor, ReqwestTransport,
    RequestBuilder, Transport,
};
use crate::logging::{call_span, generate_request_id};
use crate::registry::{Endpoint, EndpointRegistry};
use crate::types::{AuthMode, CallRequest, Verb};
use crate::{Error, Result};

struct Inner {
    registry: EndpointRegistry,
    credentials: CredentialBundle,
    config: ClientConfig,
    user_agent: String,
    request_builder: RequestBuilder,
    executor: HttpExecutor,
}

/// Dispatch engine bound to one registry, credential bundle and transport
///
/// Cheap to clone; clones share the registry and the connection pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

/// Builder for [`Client`]
#[derive(Default)]
pub struct ClientBuilder {
    registry: Option<EndpointRegistry>,
    credentials: CredentialBundle,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn registry(mut self, registry: EndpointRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn credentials(mut self, credentials: CredentialBundle) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default `reqwest` transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Client> {
        self.config.validate()?;

        let registry = self
            .registry
            .ok_or_else(|| Error::configuration("no endpoint registry supplied"))?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.config.connection, self.config.timeout())?),
        };

        let request_builder = RequestBuilder::new(&self.config.base_url)?;
        let user_agent = self.config.user_agent();

        tracing::debug!(
            base_url = %self.config.base_url,
            connection = %self.config.connection,
            raw = self.config.raw,
            endpoints = registry.len(),
            "client created"
        );

        Ok(Client {
            inner: Arc::new(Inner {
                registry,
                credentials: self.credentials,
                config: self.config,
                user_agent,
                request_builder,
                executor: HttpExecutor::new(transport),
            }),
        })
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Handle on the endpoint registered at `path` (dotted)
    pub fn endpoint(&self, path: &str) -> Result<EndpointHandle<'_>> {
        let endpoint = self
            .inner
            .registry
            .lookup(path)
            .ok_or_else(|| Error::configuration(format!("unknown endpoint: {}", path)))?;

        Ok(EndpointHandle { client: self, endpoint })
    }

    /// Call `verb` on the endpoint registered at `path`
    pub async fn call(&self, path: &str, verb: Verb, request: CallRequest) -> Result<Value> {
        self.endpoint(path)?.call(verb, request).await
    }

    async fn dispatch(&self, endpoint: &Endpoint, verb: Verb, request: CallRequest) -> Result<Value> {
        let request_id = generate_request_id();
        let span = call_span(&request_id, verb, endpoint.path());

        async move {
            let inner = &self.inner;
            let mode = endpoint.mode();

            let headers = build_headers(
                mode,
                verb,
                &inner.credentials,
                &inner.user_agent,
                &request.payload,
                !request.files.is_empty(),
            )?;

            tracing::debug!(
                parts = %endpoint,
                identifiers = ?request.identifiers,
                "Call"
            );
            tracing::debug!(params = ?request.params, data = ?request.payload, "Call: optional params and data");

            let prepared = inner
                .request_builder
                .build_request(endpoint.parts(), verb, request, headers)?;

            let response = inner.executor.execute(&prepared).await?;
            let decoded = decode(&response)?;

            if mode == AuthMode::KeyUnwrapped {
                tracing::debug!(response = %decoded, "Response: unwrapped");
                return Ok(decoded);
            }

            unwrap_envelope(normalize(decoded), inner.config.raw)
        }
        .instrument(span)
        .await
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.credentials)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("credentials", &self.inner.credentials)
            .field("base_url", &self.inner.config.base_url)
            .field("raw", &self.inner.config.raw)
            .field("user_agent", &self.inner.user_agent)
            .finish()
    }
}

/// One registered endpoint, bound to a client
#[derive(Clone, Copy)]
pub struct EndpointHandle<'a> {
    client: &'a Client,
    endpoint: &'a Endpoint,
}

impl<'a> EndpointHandle<'a> {
    pub fn endpoint(&self) -> &'a Endpoint {
        self.endpoint
    }

    pub async fn call(&self, verb: Verb, request: CallRequest) -> Result<Value> {
        self.client.dispatch(self.endpoint, verb, request).await
    }

    pub async fn get(&self, request: CallRequest) -> Result<Value> {
        self.call(Verb::Get, request).await
    }

    pub async fn post(&self, request: CallRequest) -> Result<Value> {
        self.call(Verb::Post, request).await
    }

    pub async fn put(&self, request: CallRequest) -> Result<Value> {
        self.call(Verb::Put, request).await
    }

    pub async fn patch(&self, request: CallRequest) -> Result<Value> {
        self.call(Verb::Patch, request).await
    }

    pub async fn delete(&self, request: CallRequest) -> Result<Value> {
        self.call(Verb::Delete, request).await
    }
}

impl fmt::Display for EndpointHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.endpoint.fmt(f)
    }
}
