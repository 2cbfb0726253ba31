//! HTTP request builder for endpoint calls
//!
//! Turns a registered endpoint, a verb and per-call arguments into a
//! transport-ready [`PreparedRequest`].

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::multipart::Part;
use std::collections::BTreeMap;
use url::Url;

use crate::http::auth::Headers;
use crate::registry::PathParts;
use crate::types::{CallRequest, FileAttachment, Payload, Verb};
use crate::{Error, Result};

/// A fully resolved request, ready for a [`Transport`](crate::http::Transport)
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub verb: Verb,
    pub url: String,
    pub headers: Headers,
    pub params: BTreeMap<String, String>,
    pub payload: Payload,
    pub files: Vec<FileAttachment>,
}

/// Builder for constructing requests against one base URL
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
}

impl RequestBuilder {
    /// Create a builder, validating the base URL
    pub fn new(base_url: &str) -> Result<Self> {
        Url::parse(base_url).map_err(|e| Error::Configuration {
            message: format!("Invalid base URL {}: {}", base_url, e),
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for a specific endpoint
    pub fn build_request(
        &self,
        parts: &PathParts,
        verb: Verb,
        request: CallRequest,
        headers: Headers,
    ) -> Result<PreparedRequest> {
        let url = self.build_url(parts, &request.identifiers, verb, request.payload.is_some())?;

        if !request.files.is_empty() {
            if !verb.accepts_files() {
                return Err(Error::configuration(format!(
                    "{}() does not accept file attachments",
                    verb.operation()
                )));
            }
            match &request.payload {
                Payload::None => {}
                Payload::Json(value) if value.is_object() => {}
                _ => {
                    return Err(Error::configuration(
                        "file uploads only combine with an object body",
                    ))
                }
            }
        }

        validate_files(&request.files)?;
        validate_headers(&headers)?;

        // a JSON body on GET only selects the URL shape; it is never sent
        let payload = match (verb, request.payload) {
            (Verb::Get, Payload::Json(_)) => Payload::None,
            (_, payload) => payload,
        };

        Ok(PreparedRequest {
            verb,
            url,
            headers,
            params: request.params,
            payload,
            files: request.files,
        })
    }

    /// Build the full URL from the endpoint parts and caller identifiers
    ///
    /// `p0/id1/p1/id2` when the endpoint has a second part (or a GET carries a
    /// body), `p0[/id1]` otherwise; then `/p2` and `/id3` when present.
    pub fn build_url(
        &self,
        parts: &PathParts,
        identifiers: &[Option<String>; 3],
        verb: Verb,
        has_payload: bool,
    ) -> Result<String> {
        let [id1, id2, id3] = identifiers;
        let id1 = id1.as_deref().filter(|id| !id.is_empty());
        let id2 = id2.as_deref().filter(|id| !id.is_empty());
        let id3 = id3.as_deref().filter(|id| !id.is_empty());

        if parts.first().is_empty() {
            // should never happen, the registry rejects empty parts
            return Err(Error::internal("You must specify a method and endpoint"));
        }

        let mut url = format!("{}/{}", self.base_url, parts.first());

        if parts.second().is_some() || (has_payload && verb == Verb::Get) {
            let id1 = id1.ok_or_else(|| Error::configuration("You must specify identifier1"))?;
            url.push('/');
            url.push_str(id1);
            if let Some(p1) = parts.second() {
                url.push('/');
                url.push_str(p1);
            }
            if let Some(id2) = id2 {
                url.push('/');
                url.push_str(id2);
            }
        } else if let Some(id1) = id1 {
            url.push('/');
            url.push_str(id1);
        }

        if let Some(p2) = parts.third() {
            url.push('/');
            url.push_str(p2);
        }
        if let Some(id3) = id3 {
            url.push('/');
            url.push_str(id3);
        }

        Ok(url)
    }
}

/// Reject headers the HTTP layer would refuse to send
///
/// Values are never echoed back, they may hold credentials.
fn validate_headers(headers: &Headers) -> Result<()> {
    for (name, value) in headers {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::configuration(format!("invalid header name: {:?}", name)))?;
        HeaderValue::from_str(value)
            .map_err(|_| Error::configuration(format!("invalid value for header {}", name)))?;
    }
    Ok(())
}

fn validate_files(files: &[FileAttachment]) -> Result<()> {
    for file in files {
        if let Some(mime) = &file.mime_type {
            Part::bytes(Vec::new()).mime_str(mime).map_err(|_| {
                Error::configuration(format!("invalid MIME type for {}: {:?}", file.file_name, mime))
            })?;
        }
    }
    Ok(())
}
