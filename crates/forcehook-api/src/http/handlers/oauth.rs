//! Browser login through the platform's OAuth web-server flow.
//!
//! `/login` issues a single-use nonce as the OAuth `state`, remembers which
//! environment it was issued for, and pins it to the browser with a
//! short-lived cookie. The callback only accepts a `state` that matches both.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use serde::Deserialize;

use forcehook_infra::session::{PendingLogins, SessionData};

use crate::http::error::AppError;
use crate::http::extractors::connection::{LOGIN_STATE_COOKIE, cookie_value, session_cookie};
use crate::state::AppState;

const DEFAULT_ENV: &str = "prod";

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub env: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /login?env=<env> - Redirect to the platform's authorize endpoint.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    let env = query.env.as_deref().unwrap_or(DEFAULT_ENV);
    let nonce = PendingLogins::new_nonce();
    let url = state.oauth.authorize_url(env, &nonce)?;
    state.logins.insert(&nonce, env);
    tracing::debug!(env, "starting oauth login");

    Ok((
        AppendHeaders([(SET_COOKIE, state.cookies.login_state(&nonce))]),
        Redirect::to(&url),
    )
        .into_response())
}

/// GET /_oauth_callback?code=&state=<nonce> - Exchange the code and start a session.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    if let Some(error) = query.error {
        let reason = query.error_description.unwrap_or(error);
        return Err(AppError::unauthorized(reason, state.cookies));
    }

    let nonce = query
        .state
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("missing state".to_string()))?;

    if cookie_value(&headers, LOGIN_STATE_COOKIE).as_deref() != Some(nonce.as_str()) {
        tracing::warn!("oauth callback state does not match this browser's login");
        return Err(AppError::unauthorized("login state mismatch", state.cookies));
    }
    let env = state.logins.complete(&nonce).ok_or_else(|| {
        tracing::warn!("oauth callback state is unknown or expired");
        AppError::unauthorized("unknown or expired login state", state.cookies)
    })?;

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("missing authorization code".to_string()))?;

    let token = state.oauth.exchange_code(&env, &code).await?;

    if let Some(previous) = session_cookie(&headers) {
        state.sessions.remove(&previous);
    }
    let session_id = state.sessions.create(SessionData::new(token.access_token, env.as_str()));
    tracing::info!(%env, "session started");

    Ok((
        AppendHeaders([
            (SET_COOKIE, state.cookies.session(&session_id)),
            (SET_COOKIE, state.cookies.expired_login_state()),
        ]),
        Redirect::to("/"),
    )
        .into_response())
}

/// GET /logout - Drop the session and return to the entry point.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_cookie(&headers) {
        state.sessions.remove(&id);
    }
    (
        AppendHeaders([(SET_COOKIE, state.cookies.expired_session())]),
        Redirect::to("/"),
    )
        .into_response()
}
