//! Connection extractor and cookie helpers.
//!
//! A request is authorized by its session (set after the OAuth callback)
//! and/or by `Authorization: Bearer <token>` plus an `Env` header. Values
//! are combined by [`resolve_connection`]; on failure the session named by
//! the cookie is dropped.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use secrecy::ExposeSecret;

use forcehook_core::auth::{CredentialSources, bearer_token, resolve_connection};
use forcehook_infra::session::{LOGIN_STATE_TTL, SessionData};
use forcehook_types::connection::ConnectionContext;

use crate::http::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "forcehook_session";
pub const LOGIN_STATE_COOKIE: &str = "forcehook_login_state";
pub const ENV_HEADER: &str = "env";

/// An authorized platform connection for the current request.
pub struct Connection(pub ConnectionContext);

impl FromRequestParts<AppState> for Connection {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_id = session_cookie(&parts.headers);
        let session = session_id.as_deref().and_then(|id| state.sessions.get(id));

        let sources = CredentialSources {
            session_token: session.as_ref().map(|s| s.access_token.expose_secret()),
            session_env: session.as_ref().map(|s| s.env.as_str()),
            header_token: header_str(&parts.headers, AUTHORIZATION.as_str()).and_then(bearer_token),
            header_env: header_str(&parts.headers, ENV_HEADER),
        };

        match resolve_connection(&sources) {
            Ok(conn) => Ok(Connection(conn)),
            Err(e) => {
                if let Some(id) = &session_id {
                    state.sessions.remove(id);
                }
                Err(AppError::unauthorized(e.to_string(), state.cookies))
            }
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Value of the named cookie from the `Cookie` header(s), if present and non-empty.
pub fn cookie_value(headers: &HeaderMap, cookie: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE)
}

/// The session the request's cookie points at, if it still exists.
pub fn current_session(state: &AppState, headers: &HeaderMap) -> Option<Arc<SessionData>> {
    session_cookie(headers).and_then(|id| state.sessions.get(&id))
}

/// Attributes for the cookies forcehook sets.
///
/// `Secure` is added when the app is reached over https, as indicated by
/// the configured OAuth redirect URI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn for_redirect_uri(redirect_uri: Option<&str>) -> Self {
        Self {
            secure: redirect_uri.is_some_and(|uri| uri.starts_with("https://")),
        }
    }

    fn build(self, name: &str, value: &str, max_age: Option<u64>) -> String {
        let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
        if let Some(secs) = max_age {
            cookie.push_str(&format!("; Max-Age={secs}"));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn session(self, id: &str) -> String {
        self.build(SESSION_COOKIE, id, None)
    }

    pub fn expired_session(self) -> String {
        self.build(SESSION_COOKIE, "", Some(0))
    }

    pub fn login_state(self, nonce: &str) -> String {
        self.build(LOGIN_STATE_COOKIE, nonce, Some(LOGIN_STATE_TTL.as_secs()))
    }

    pub fn expired_login_state(self) -> String {
        self.build(LOGIN_STATE_COOKIE, "", Some(0))
    }
}
