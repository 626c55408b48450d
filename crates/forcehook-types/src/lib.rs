//! Shared domain types for forcehook.
//!
//! Webhook trigger metadata, the connection context handed to the platform
//! client, the platform records read back during discovery, configuration,
//! and the error types shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod connection;
pub mod error;
pub mod platform;
pub mod secret;
pub mod webhook;
