//! Envelope normalization
//!
//! Reduces whatever the classifier decoded into the canonical
//! `{success, result, result_info?, errors?}` envelope, synthesizing the
//! fields the remote service left out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Value>,
    /// HTTP status of a synthetic failure envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl Envelope {
    pub fn success(result: Value) -> Self {
        Self {
            success: true,
            result,
            result_info: None,
            errors: None,
            messages: None,
            code: None,
        }
    }
}

fn take_errors(map: &mut Map<String, Value>) -> Option<Vec<Value>> {
    match map.remove("errors") {
        None | Some(Value::Null) => None,
        Some(Value::Array(errors)) => Some(errors),
        Some(single) => Some(vec![single]),
    }
}

/// Normalize a decoded body into an [`Envelope`]
///
/// A missing `success` is inferred: `false` when `errors` is present, `false`
/// with the whole body as the only error when neither `errors` nor `result`
/// is present, `true` otherwise. Bodies that are not JSON objects (NDJSON
/// sequences, bare scalars) are successful results as they stand.
pub fn normalize(decoded: Value) -> Envelope {
    let mut map = match decoded {
        Value::Object(map) => map,
        other => return Envelope::success(other),
    };

    let explicit = map.get("success").map(|v| v.as_bool() != Some(false));

    let mut errors = take_errors(&mut map);
    let has_result = map.contains_key("result");

    let success = match explicit {
        Some(success) => success,
        None if errors.is_some() => {
            tracing::debug!("Response: assuming success = \"False\"");
            false
        }
        None if !has_result => {
            tracing::debug!("Response: assuming success = \"False\"");
            errors = Some(vec![Value::Object(map.clone())]);
            false
        }
        None => {
            tracing::debug!("Response: assuming success = \"True\"");
            true
        }
    };

    Envelope {
        success,
        result: map.remove("result").unwrap_or(Value::Null),
        result_info: map.remove("result_info"),
        errors,
        messages: map.remove("messages"),
        code: map
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok()),
    }
}
