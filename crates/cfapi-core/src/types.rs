//! Core types shared by the registry, the HTTP pipeline and the client
//!
//! This module defines auth modes, verbs, per-call requests and the raw
//! responses handed from the transport to the classifier.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Credential scheme required to call a registered endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthMode {
    /// Namespace node only; exposes no verbs
    None,
    /// No credentials, GET only
    Open,
    /// Email + global API key
    Key,
    /// Email + global API key, decoded body returned without envelope processing
    KeyUnwrapped,
    /// Origin CA certificate service key
    Cert,
    /// API token sent as `Authorization`
    Bearer,
    /// Explicitly unsupported endpoint
    Void,
}

impl AuthMode {
    /// Whether a node with this mode shows up in the registry listing
    pub fn is_callable(&self) -> bool {
        !matches!(self, AuthMode::None | AuthMode::Void)
    }

    /// Whether `verb` is offered by endpoints with this mode
    pub fn supports(&self, verb: Verb) -> bool {
        match self {
            AuthMode::None | AuthMode::Void => false,
            AuthMode::Open => verb == Verb::Get,
            AuthMode::Key | AuthMode::KeyUnwrapped | AuthMode::Cert | AuthMode::Bearer => true,
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthMode::None => "NONE",
            AuthMode::Open => "OPEN",
            AuthMode::Key => "KEY",
            AuthMode::KeyUnwrapped => "KEY_UNWRAPPED",
            AuthMode::Cert => "CERT",
            AuthMode::Bearer => "BEARER",
            AuthMode::Void => "VOID",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for AuthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(AuthMode::None),
            "OPEN" => Ok(AuthMode::Open),
            "KEY" | "AUTH" => Ok(AuthMode::Key),
            "KEY_UNWRAPPED" | "AUTH_UNWRAPPED" => Ok(AuthMode::KeyUnwrapped),
            "CERT" => Ok(AuthMode::Cert),
            "BEARER" => Ok(AuthMode::Bearer),
            "VOID" => Ok(AuthMode::Void),
            _ => Err(Error::internal("api load type mismatch")),
        }
    }
}

/// HTTP verb of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Verb {
    pub const ALL: [Verb; 5] = [Verb::Delete, Verb::Get, Verb::Patch, Verb::Post, Verb::Put];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Patch => "PATCH",
        }
    }

    /// Lower-case operation name as used in error messages (`get()`, `post()`...)
    pub fn operation(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
            Verb::Patch => "patch",
        }
    }

    pub fn accepts_files(&self) -> bool {
        matches!(self, Verb::Post | Verb::Put)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "DELETE" => Ok(Verb::Delete),
            "PATCH" => Ok(Verb::Patch),
            _ => Err(Error::internal(format!("method not supported: {}", s))),
        }
    }
}

/// Request body of a call
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    None,
    /// Structured body, serialized as JSON
    Json(Value),
    /// Literal body (worker scripts and similar), sent as-is
    Text(String),
}

impl Payload {
    pub fn is_some(&self) -> bool {
        !matches!(self, Payload::None)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Payload::Text(_))
    }
}

/// A file uploaded as one part of a multipart form
#[derive(Debug, Clone, PartialEq)]
pub struct FileAttachment {
    /// Form field name
    pub field: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime_type: Option<String>,
}

impl FileAttachment {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content: content.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Per-call arguments: identifiers, query parameters, body and attachments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallRequest {
    pub identifiers: [Option<String>; 3],
    pub params: BTreeMap<String, String>,
    pub payload: Payload,
    pub files: Vec<FileAttachment>,
}

impl CallRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id1(mut self, id: impl Into<String>) -> Self {
        self.identifiers[0] = Some(id.into());
        self
    }

    pub fn id2(mut self, id: impl Into<String>) -> Self {
        self.identifiers[1] = Some(id.into());
        self
    }

    pub fn id3(mut self, id: impl Into<String>) -> Self {
        self.identifiers[2] = Some(id.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.payload = Payload::Json(body);
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.payload = Payload::Text(body.into());
        self
    }

    pub fn file(mut self, file: FileAttachment) -> Self {
        self.files.push(file);
        self
    }
}

/// Response as handed over by the transport, before any interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub content_type: Option<String>,
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.map(|s| s.to_string()),
            status,
            body: body.into(),
        }
    }

    /// Body as text; invalid UTF-8 sequences are replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
