//! Platform management API client.
//!
//! [`ForceClient`] implements the
//! [`ForcePlatform`](forcehook_core::platform::ForcePlatform) port against the
//! platform's REST data API, tooling API and metadata SOAP API.

pub mod client;
pub mod metadata;
pub mod types;

pub use client::ForceClient;
