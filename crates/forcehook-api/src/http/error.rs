//! Application error type mapping to HTTP status codes.
//!
//! Error bodies are `{"error": {"message": ..., "code": ...}}`. An
//! authorization failure is not an error body: the browser is sent back to
//! the entry point with its session cookie expired.

use axum::http::StatusCode;
use axum::http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::response::{AppendHeaders, IntoResponse, Response};
use serde_json::json;

use forcehook_infra::oauth::OAuthError;
use forcehook_types::error::WebhookError;

use crate::http::extractors::connection::CookiePolicy;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// No usable credentials, or a login that could not be trusted.
    Unauthorized { reason: String, cookies: CookiePolicy },
    /// Domain errors from the webhook service and authenticator.
    Webhook(WebhookError),
    /// Login flow errors.
    OAuth(OAuthError),
    /// Malformed request outside the domain payload rules.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl AppError {
    pub fn unauthorized(reason: impl Into<String>, cookies: CookiePolicy) -> Self {
        AppError::Unauthorized {
            reason: reason.into(),
            cookies,
        }
    }
}

impl From<WebhookError> for AppError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::Authorization(reason) => AppError::unauthorized(reason, CookiePolicy::default()),
            other => AppError::Webhook(other),
        }
    }
}

impl From<OAuthError> for AppError {
    fn from(e: OAuthError) -> Self {
        AppError::OAuth(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized { reason, cookies } => {
                tracing::info!(%reason, "unauthorized, resetting session");
                return (
                    StatusCode::SEE_OTHER,
                    AppendHeaders([
                        (LOCATION, "/".to_string()),
                        (SET_COOKIE, cookies.expired_session()),
                    ]),
                )
                    .into_response();
            }
            AppError::Webhook(e) => {
                let status = match e {
                    WebhookError::Validation(_) => StatusCode::BAD_REQUEST,
                    WebhookError::Parse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    WebhookError::Duplicate(_) => StatusCode::CONFLICT,
                    WebhookError::Upstream(_) | WebhookError::Authorization(_) => StatusCode::BAD_GATEWAY,
                };
                (status, e.code(), e.to_string())
            }
            AppError::OAuth(e @ OAuthError::UnknownEnvironment(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::OAuth(e @ OAuthError::NotConfigured(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "OAUTH_NOT_CONFIGURED", e.to_string())
            }
            AppError::OAuth(e) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        if status.is_server_error() {
            tracing::error!(%status, code, %message, "request failed");
        } else {
            tracing::debug!(%status, code, %message, "request rejected");
        }

        let body = json!({
            "error": {
                "message": message,
                "code": code,
            }
        });

        (status, [(CONTENT_TYPE, "application/json")], body.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn authorization_redirects_and_expires_cookie() {
        let response = AppError::from(WebhookError::Authorization("no token".into())).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/");
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("forcehook_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn secure_policy_applies_to_reset_cookie() {
        let response = AppError::unauthorized("expired", CookiePolicy { secure: true }).into_response();
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.ends_with("; Secure"));
    }

    #[tokio::test]
    async fn status_per_kind() {
        let cases = [
            (WebhookError::Validation("url is required".into()), StatusCode::BAD_REQUEST),
            (
                WebhookError::Parse { name: "X".into(), reason: "r".into() },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (WebhookError::Duplicate("dup".into()), StatusCode::CONFLICT),
            (WebhookError::Upstream("down".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn upstream_message_is_verbatim() {
        let response = AppError::from(WebhookError::Upstream("INVALID_FIELD: bad".into())).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "INVALID_FIELD: bad");
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    }
}
