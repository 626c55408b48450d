//! Axum router configuration with middleware.
//!
//! Middleware: CORS, request tracing.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index::index))
        .route("/health", get(handlers::index::health))
        // Browser login
        .route("/login", get(handlers::oauth::login))
        .route("/_oauth_callback", get(handlers::oauth::callback))
        .route("/logout", get(handlers::oauth::logout))
        // Connection-authenticated
        .route("/sobjects", get(handlers::sobject::list_sobjects))
        .route(
            "/webhooks",
            get(handlers::webhook::list_webhooks).post(handlers::webhook::create_webhook),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
