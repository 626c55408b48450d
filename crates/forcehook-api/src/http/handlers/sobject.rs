//! Sobject listing.

use axum::Json;
use axum::extract::State;

use crate::http::error::AppError;
use crate::http::extractors::connection::Connection;
use crate::state::AppState;

/// GET /sobjects - Names of sobjects that accept triggers.
pub async fn list_sobjects(
    State(state): State<AppState>,
    Connection(conn): Connection,
) -> Result<Json<Vec<String>>, AppError> {
    let names = state.webhook_service.list_triggerable_sobjects(&conn).await?;
    Ok(Json(names))
}
