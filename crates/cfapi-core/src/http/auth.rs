//! Authentication handling for endpoint calls
//!
//! Supports the credential schemes the API accepts:
//! - Email + global API key (`X-Auth-Email` / `X-Auth-Key`)
//! - Origin CA service key (`X-Auth-User-Service-Key`)
//! - API tokens (`Authorization`)
//! - No authentication for open endpoints

use std::collections::HashMap;

use crate::credentials::CredentialBundle;
use crate::types::{AuthMode, Payload, Verb};
use crate::{Error, Result};

/// Request headers, keyed by header name
pub type Headers = HashMap<String, String>;

pub const USER_AGENT: &str = "User-Agent";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const X_AUTH_EMAIL: &str = "X-Auth-Email";
pub const X_AUTH_KEY: &str = "X-Auth-Key";
pub const X_AUTH_USER_SERVICE_KEY: &str = "X-Auth-User-Service-Key";
pub const AUTHORIZATION: &str = "Authorization";

/// Default User-Agent sent with every request
pub fn user_agent() -> String {
    format!("cfapi-core/{}", crate::VERSION)
}

/// Fails with the documented message when `verb` is not offered under `mode`
pub fn check_verb(mode: AuthMode, verb: Verb) -> Result<()> {
    if mode.supports(verb) {
        Ok(())
    } else {
        Err(Error::configuration(format!(
            "{}() call not available for this endpoint",
            verb.operation()
        )))
    }
}

/// Insert the credential headers `mode` requires
pub fn apply_auth(mode: AuthMode, credentials: &CredentialBundle, headers: &mut Headers) -> Result<()> {
    match mode {
        AuthMode::Open => Ok(()),
        AuthMode::Key | AuthMode::KeyUnwrapped => {
            match (credentials.email(), credentials.key()) {
                (Some(email), Some(key)) => {
                    headers.insert(X_AUTH_EMAIL.to_string(), email.to_string());
                    headers.insert(X_AUTH_KEY.to_string(), key.to_string());
                    Ok(())
                }
                _ => Err(Error::configuration("no email and/or token defined")),
            }
        }
        AuthMode::Cert => match credentials.cert_token() {
            Some(token) => {
                headers.insert(X_AUTH_USER_SERVICE_KEY.to_string(), token.to_string());
                Ok(())
            }
            None => Err(Error::configuration("no cert token defined")),
        },
        AuthMode::Bearer => match credentials.bearer_token() {
            Some(token) => {
                headers.insert(AUTHORIZATION.to_string(), token.to_string());
                Ok(())
            }
            None => Err(Error::configuration("no bearer token defined")),
        },
        AuthMode::None | AuthMode::Void => Err(Error::internal(format!(
            "auth requested for a {} endpoint",
            mode
        ))),
    }
}

/// Full header set for one call
///
/// Rejects unsupported verbs before looking at credentials, so a `VOID`
/// endpoint fails the same way whatever the bundle holds.
pub fn build_headers(
    mode: AuthMode,
    verb: Verb,
    credentials: &CredentialBundle,
    user_agent: &str,
    payload: &Payload,
    has_files: bool,
) -> Result<Headers> {
    check_verb(mode, verb)?;

    let mut headers = Headers::new();
    headers.insert(USER_AGENT.to_string(), user_agent.to_string());
    headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());

    apply_auth(mode, credentials, &mut headers)?;

    if payload.is_text() {
        headers.insert(CONTENT_TYPE.to_string(), "application/javascript".to_string());
    }
    if has_files {
        // multipart boundary comes from the HTTP layer
        headers.remove(CONTENT_TYPE);
    }

    Ok(headers)
}
