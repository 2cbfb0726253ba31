//! Credential bundle consumed by the auth strategy
//!
//! Values are resolved by the caller; the engine never reads them from
//! files or the environment.

use std::fmt;

const REDACTED: &str = "REDACTED";

/// The credential forms an endpoint may require
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialBundle {
    email: Option<String>,
    key: Option<String>,
    cert_token: Option<String>,
    bearer_token: Option<String>,
}

impl CredentialBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_cert_token(mut self, token: impl Into<String>) -> Self {
        self.cert_token = Some(token.into());
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Email, only if set and non-empty
    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }

    pub fn key(&self) -> Option<&str> {
        non_empty(&self.key)
    }

    pub fn cert_token(&self) -> Option<&str> {
        non_empty(&self.cert_token)
    }

    pub fn bearer_token(&self) -> Option<&str> {
        non_empty(&self.bearer_token)
    }

    /// Both halves of the email/key pair are usable
    pub fn has_key_pair(&self) -> bool {
        self.email().is_some() && self.key().is_some()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn mask(value: &Option<String>) -> &'static str {
    match value {
        Some(_) => REDACTED,
        None => "None",
    }
}

impl fmt::Display for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[\"{}\",\"{}\"]",
            self.email.as_deref().unwrap_or(""),
            REDACTED
        )
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("email", &self.email)
            .field("key", &mask(&self.key))
            .field("cert_token", &mask(&self.cert_token))
            .field("bearer_token", &mask(&self.bearer_token))
            .finish()
    }
}
