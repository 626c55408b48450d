//! Custom axum extractors.

pub mod connection;
