//! HTTP executor
//!
//! Hands prepared requests to the configured transport and folds every
//! transport fault into a single connectivity error. No retries.

use std::sync::Arc;

use crate::http::builder::PreparedRequest;
use crate::http::transport::Transport;
use crate::logging::redact_headers;
use crate::types::RawResponse;
use crate::{Error, Result};

#[derive(Clone)]
pub struct HttpExecutor {
    transport: Arc<dyn Transport>,
}

impl HttpExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn execute(&self, request: &PreparedRequest) -> Result<RawResponse> {
        tracing::debug!(method = %request.verb, url = %request.url, "Call: method and url");
        tracing::debug!(headers = ?redact_headers(&request.headers), "Call: headers");
        if !request.files.is_empty() {
            let names: Vec<&str> = request.files.iter().map(|f| f.file_name.as_str()).collect();
            tracing::debug!(files = ?names, "Call: upload files");
        }

        match self.transport.send(request).await {
            Ok(response) => {
                tracing::debug!(
                    status = response.status,
                    content_type = response.content_type.as_deref().unwrap_or(""),
                    bytes = response.body.len(),
                    "Call: done"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Call: exception");
                Err(Error::connection_failed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Payload, Verb};
    use async_trait::async_trait;

    struct Refusing;

    #[async_trait]
    impl Transport for Refusing {
        async fn send(&self, _request: &PreparedRequest) -> anyhow::Result<RawResponse> {
            Err(anyhow::anyhow!("tcp connect error: connection refused"))
        }
    }

    struct Fixed(RawResponse);

    #[async_trait]
    impl Transport for Fixed {
        async fn send(&self, _request: &PreparedRequest) -> anyhow::Result<RawResponse> {
            Ok(self.0.clone())
        }
    }

    fn request() -> PreparedRequest {
        PreparedRequest {
            verb: Verb::Get,
            url: "https://api.example.com/zones".to_string(),
            headers: Default::default(),
            params: Default::default(),
            payload: Payload::None,
            files: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_transport_fault_becomes_connection_failed() {
        let executor = HttpExecutor::new(Arc::new(Refusing));
        let err = executor.execute(&request()).await.unwrap_err();

        assert_eq!(err.to_string(), "connection failed.");
        assert_eq!(err.code(), 0);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_response_passed_through() {
        // status codes are not interpreted here, even 5xx
        let raw = RawResponse::new(503, Some("text/html"), b"<h1>down</h1>".to_vec());
        let executor = HttpExecutor::new(Arc::new(Fixed(raw.clone())));
        assert_eq!(executor.execute(&request()).await.unwrap(), raw);
    }
}
