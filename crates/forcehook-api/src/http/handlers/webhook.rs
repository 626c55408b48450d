//! Webhook discovery and provisioning handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;

use forcehook_types::webhook::{TriggerMetadata, WebhookPayload};

use crate::http::error::AppError;
use crate::http::extractors::connection::Connection;
use crate::state::AppState;

/// GET /webhooks - Every webhook currently installed.
pub async fn list_webhooks(
    State(state): State<AppState>,
    Connection(conn): Connection,
) -> Result<Json<Vec<TriggerMetadata>>, AppError> {
    let webhooks = state.webhook_service.discover(&conn).await?;
    Ok(Json(webhooks))
}

/// POST /webhooks - Provision a webhook. Empty 200 on success.
///
/// The body is decoded by hand so that malformed JSON is reported in the
/// same error shape as a missing field.
pub async fn create_webhook(
    State(state): State<AppState>,
    Connection(conn): Connection,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("invalid JSON body: {e}")))?;

    let meta = state.webhook_service.provision(&conn, payload).await?;
    tracing::info!(webhook = %meta.name, sobject = %meta.sobject, "webhook provisioned");
    Ok(StatusCode::OK)
}
