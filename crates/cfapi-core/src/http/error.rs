//! Error unwrapping
//!
//! Turns a failed envelope into a structured [`ApiError`] and a successful
//! one into the value handed back to the caller.

use serde_json::{json, Map, Value};

use crate::error::{ApiError, ErrorDetail};
use crate::http::normalizer::Envelope;
use crate::{Error, Result};

/// String form of a field, if present and not null
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn message_of(object: &Map<String, Value>) -> String {
    text_field(object, "message")
        .or_else(|| text_field(object, "error"))
        .unwrap_or_default()
}

/// Lenient parse used for chain entries
fn parse_detail(value: &Value) -> ErrorDetail {
    match value {
        Value::Object(object) => ErrorDetail {
            code: object.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: message_of(object),
            error_chain: parse_chain(object.get("error_chain")),
        },
        Value::String(s) => ErrorDetail {
            code: 0,
            message: s.clone(),
            error_chain: Vec::new(),
        },
        other => ErrorDetail {
            code: 0,
            message: other.to_string(),
            error_chain: Vec::new(),
        },
    }
}

fn parse_chain(value: Option<&Value>) -> Vec<ErrorDetail> {
    match value {
        Some(Value::Array(items)) => items.iter().map(parse_detail).collect(),
        _ => Vec::new(),
    }
}

/// Extract the primary error of a failed envelope
///
/// The first entry of `errors` must carry an integer `code`. Its own
/// `error_chain` wins over the envelope's top-level `messages`.
pub fn extract_api_error(envelope: &Envelope) -> Result<ApiError> {
    let primary = match envelope.errors.as_ref().and_then(|errors| errors.first()) {
        Some(primary) => primary,
        None => {
            // synthetic envelope built from an opaque non-2xx body
            let code = envelope
                .code
                .ok_or_else(|| Error::internal("error response carried no errors"))?;
            let message = match &envelope.result {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Ok(ApiError::new(i64::from(code), message));
        }
    };

    let object = primary
        .as_object()
        .ok_or_else(|| Error::internal(format!("malformed error entry: {}", primary)))?;
    let code = object
        .get("code")
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::internal(format!("error entry without code: {}", primary)))?;
    let message = message_of(object);

    let chain = match object.get("error_chain") {
        Some(Value::Array(own)) if !own.is_empty() => parse_chain(object.get("error_chain")),
        _ => parse_chain(envelope.messages.as_ref()),
    };

    for link in &chain {
        tracing::debug!(code = link.code, message = %link.message, "Response: error - chain");
    }
    tracing::debug!(code, message = %message, "Response: error");

    Ok(ApiError::new(code, message).with_chain(chain))
}

/// Raise the envelope's error, or return what the caller asked for
///
/// In raw mode the value is `{result, result_info?}`; otherwise just `result`.
pub fn unwrap_envelope(envelope: Envelope, raw: bool) -> Result<Value> {
    if !envelope.success {
        return Err(extract_api_error(&envelope)?.into());
    }

    tracing::debug!(result = %envelope.result, "Response: result");

    if raw {
        let mut out = json!({"result": envelope.result});
        if let Some(info) = envelope.result_info {
            out["result_info"] = info;
        }
        Ok(out)
    } else {
        Ok(envelope.result)
    }
}
