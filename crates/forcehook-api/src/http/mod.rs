//! HTTP layer for forcehook.
//!
//! Axum router with browser OAuth login, connection-authenticated webhook
//! endpoints, and a JSON error body.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
