//! Connection authenticator.
//!
//! Turns whatever credentials a request carries into a [`ConnectionContext`].
//! Two sources are consulted: values bound to the caller's session (written
//! after the OAuth exchange) and request headers (`Authorization: Bearer`
//! plus `Env`). Each value resolves independently, session first.
//!
//! No network I/O happens here. A stale token is only discovered when the
//! platform rejects it later.

use forcehook_types::connection::ConnectionContext;
use forcehook_types::error::WebhookError;

/// Credential values available on one inbound request.
#[derive(Debug, Default, Clone, Copy)]
pub struct CredentialSources<'a> {
    pub session_token: Option<&'a str>,
    pub session_env: Option<&'a str>,
    pub header_token: Option<&'a str>,
    pub header_env: Option<&'a str>,
}

/// Extract the token from an `Authorization` header value.
///
/// Only the `Bearer` scheme is accepted.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve a connection, or fail with [`WebhookError::Authorization`].
pub fn resolve_connection(sources: &CredentialSources<'_>) -> Result<ConnectionContext, WebhookError> {
    let token = first_present(sources.session_token, sources.header_token);
    let env = first_present(sources.session_env, sources.header_env);

    match (token, env) {
        (Some(token), Some(env)) => Ok(ConnectionContext::new(token, env)),
        (None, _) => Err(WebhookError::Authorization(
            "no session credential or bearer token".to_string(),
        )),
        (Some(_), None) => Err(WebhookError::Authorization(
            "no environment in session or Env header".to_string(),
        )),
    }
}

fn first_present<'a>(preferred: Option<&'a str>, fallback: Option<&'a str>) -> Option<&'a str> {
    let present = |v: Option<&'a str>| v.map(str::trim).filter(|s| !s.is_empty());
    present(preferred).or_else(|| present(fallback))
}
