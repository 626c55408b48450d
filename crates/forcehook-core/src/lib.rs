//! Webhook discovery and provisioning logic for forcehook.
//!
//! This crate defines the platform port ([`platform::ForcePlatform`]) that
//! the infrastructure layer implements, the Apex generator/parser contract,
//! and the connection authenticator. It depends only on `forcehook-types`
//! -- never on `forcehook-infra` or any HTTP crate.

pub mod apex;
pub mod auth;
pub mod platform;
pub mod service;
