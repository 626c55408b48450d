//! Entry point and health check.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;
use serde_json::{Value, json};

use crate::http::extractors::connection::current_session;
use crate::state::AppState;

#[derive(Serialize)]
pub struct EntryPoint {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    /// Environment name -> path that starts the login flow for it.
    pub login: BTreeMap<String, String>,
}

/// GET / - Whether the browser has a session, and where to log in.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Json<EntryPoint> {
    let session = current_session(&state, &headers);
    let login = state
        .config
        .environments
        .keys()
        .map(|env| (env.clone(), format!("/login?env={env}")))
        .collect();

    Json(EntryPoint {
        authenticated: session.is_some(),
        env: session.map(|s| s.env.clone()),
        login,
    })
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
