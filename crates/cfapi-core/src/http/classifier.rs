//! Response classification
//!
//! Decides how a raw response body is decoded from its effective media type
//! and status code. Each media type maps to one decoding strategy; the
//! outcome is a JSON value that the normalizer turns into an envelope.

use serde_json::{json, Value};

use crate::types::RawResponse;
use crate::{Error, Result};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Decoding strategy selected by the effective content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// `application/json`: must parse, possibly as NDJSON
    Json,
    /// `text/plain`, `application/octet-stream`: often mislabelled JSON
    Text,
    /// `text/javascript`, `application/javascript`: worker scripts
    Javascript,
    /// `text/html`: previews
    Html,
    Other,
}

impl MediaType {
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type {
            "application/json" => MediaType::Json,
            "text/plain" | "application/octet-stream" => MediaType::Text,
            "text/javascript" | "application/javascript" => MediaType::Javascript,
            "text/html" => MediaType::Html,
            _ => MediaType::Other,
        }
    }
}

/// Media type with parameters dropped, trimmed and lower-cased
pub fn effective_content_type(header: Option<&str>) -> String {
    match header {
        Some(value) => value.split(';').next().unwrap_or_default().trim().to_lowercase(),
        None => DEFAULT_CONTENT_TYPE.to_string(),
    }
}

fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Envelope for a body that carries no envelope of its own
fn synthetic(status: u16, result: Value) -> Value {
    if is_success(status) {
        json!({"success": true, "result": result})
    } else {
        json!({"success": false, "code": status, "result": result})
    }
}

fn parse_ndjson(text: &str) -> serde_json::Result<Value> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str::<Value>)
        .collect::<serde_json::Result<Vec<_>>>()
        .map(Value::Array)
}

/// Decode a raw response into a JSON value
///
/// 5xx responses are rejected as connectivity errors before the body is
/// looked at. A non-2xx body that decodes to anything but a JSON object is
/// wrapped in a failure envelope carrying the status.
pub fn decode(response: &RawResponse) -> Result<Value> {
    let status = response.status;
    if (500..=599).contains(&status) {
        tracing::debug!(status, "Response: server error, body ignored");
        return Err(Error::Connectivity {
            message: format!("HTTP {} server error", status),
            status_code: Some(status),
            source: None,
        });
    }

    let content_type = effective_content_type(response.content_type.as_deref());
    let text = response.text();
    tracing::debug!(status, content_type = %content_type, body = %text, "Response");

    let decoded = match MediaType::from_content_type(&content_type) {
        MediaType::Json => match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(_) if text.trim().is_empty() => synthetic(status, Value::Null),
            Err(first) => parse_ndjson(&text).map_err(|_| {
                tracing::debug!(body = %text, "Response data not JSON");
                Error::Internal {
                    message: "JSON parse failed - report to Cloudflare.".to_string(),
                    source: Some(first.into()),
                }
            })?,
        },
        MediaType::Text => serde_json::from_str::<Value>(&text)
            .unwrap_or_else(|_| synthetic(status, Value::String(text))),
        MediaType::Javascript | MediaType::Html | MediaType::Other => {
            synthetic(status, Value::String(text))
        }
    };

    if !is_success(status) && !decoded.is_object() {
        return Ok(synthetic(status, decoded));
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, content_type: Option<&str>, body: &str) -> RawResponse {
        RawResponse::new(status, content_type, body.as_bytes().to_vec())
    }

    #[test]
    fn test_effective_content_type() {
        assert_eq!(effective_content_type(Some("application/json; charset=utf-8")), "application/json");
        assert_eq!(effective_content_type(Some("  Text/HTML ")), "text/html");
        assert_eq!(
            effective_content_type(Some("application/json; charset=utf-8; version=4")),
            "application/json"
        );
        assert_eq!(effective_content_type(None), "application/octet-stream");
    }

    #[test]
    fn test_media_type_table() {
        assert_eq!(MediaType::from_content_type("application/json"), MediaType::Json);
        assert_eq!(MediaType::from_content_type("application/octet-stream"), MediaType::Text);
        assert_eq!(MediaType::from_content_type("text/javascript"), MediaType::Javascript);
        assert_eq!(MediaType::from_content_type("text/html"), MediaType::Html);
        assert_eq!(MediaType::from_content_type("image/png"), MediaType::Other);
    }

    #[test]
    fn test_json_envelope() {
        let value = decode(&raw(200, Some("application/json"), r#"{"success":true,"result":{"a":1}}"#)).unwrap();
        assert_eq!(value, json!({"success": true, "result": {"a": 1}}));
    }

    #[test]
    fn test_json_empty_body() {
        let value = decode(&raw(200, Some("application/json"), "")).unwrap();
        assert_eq!(value, json!({"success": true, "result": null}));

        let value = decode(&raw(404, Some("application/json"), "")).unwrap();
        assert_eq!(value, json!({"success": false, "code": 404, "result": null}));
    }

    #[test]
    fn test_json_with_several_parameters() {
        let value = decode(&raw(
            200,
            Some("application/json; charset=utf-8; version=4"),
            r#"{"success":true,"result":{"a":1}}"#,
        ))
        .unwrap();
        assert_eq!(value, json!({"success": true, "result": {"a": 1}}));
    }

    #[test]
    fn test_non_object_failure_keeps_status() {
        let value = decode(&raw(404, Some("application/json"), "[]")).unwrap();
        assert_eq!(value, json!({"success": false, "code": 404, "result": []}));

        let value = decode(&raw(409, Some("application/json"), "{\"a\":1}\n{\"b\":2}")).unwrap();
        assert_eq!(value, json!({"success": false, "code": 409, "result": [{"a": 1}, {"b": 2}]}));

        let value = decode(&raw(400, Some("text/plain"), "42")).unwrap();
        assert_eq!(value, json!({"success": false, "code": 400, "result": 42}));

        // 2xx sequences stay as they are
        let value = decode(&raw(200, Some("application/json"), "[]")).unwrap();
        assert_eq!(value, json!([]));
    }

    #[test]
    fn test_ndjson() {
        let body = "{\"a\":1}\n{\"b\":2}\n";
        let value = decode(&raw(200, Some("application/json"), body)).unwrap();
        assert_eq!(value, json!([{"a": 1}, {"b": 2}]));
    }

    #[test]
    fn test_json_garbage_is_internal() {
        let err = decode(&raw(200, Some("application/json"), "{not json")).unwrap_err();
        assert!(matches!(err, Error::Internal { ref message, .. } if message.contains("JSON parse failed")));
    }

    #[test]
    fn test_text_may_be_json() {
        let value = decode(&raw(200, Some("text/plain"), r#"{"success":true,"result":[]}"#)).unwrap();
        assert_eq!(value, json!({"success": true, "result": []}));

        let value = decode(&raw(200, None, "plain words")).unwrap();
        assert_eq!(value, json!({"success": true, "result": "plain words"}));

        let value = decode(&raw(403, Some("text/plain"), "denied")).unwrap();
        assert_eq!(value, json!({"success": false, "code": 403, "result": "denied"}));
    }

    #[test]
    fn test_opaque_bodies() {
        // javascript is never parsed, even when it looks like JSON
        let value = decode(&raw(200, Some("application/javascript"), "{}")).unwrap();
        assert_eq!(value, json!({"success": true, "result": "{}"}));

        let value = decode(&raw(301, Some("text/html"), "<a>moved</a>")).unwrap();
        assert_eq!(value, json!({"success": false, "code": 301, "result": "<a>moved</a>"}));

        let value = decode(&raw(200, Some("image/svg+xml"), "<svg/>")).unwrap();
        assert_eq!(value, json!({"success": true, "result": "<svg/>"}));
    }

    #[test]
    fn test_server_errors_short_circuit() {
        for status in [500u16, 503, 599] {
            let err = decode(&raw(status, Some("application/json"), "{not json")).unwrap_err();
            match err {
                Error::Connectivity { status_code, .. } => assert_eq!(status_code, Some(status)),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }
}
