//! Infrastructure layer for forcehook.
//!
//! Contains the reqwest implementation of the platform port defined in
//! `forcehook-core`, the OAuth web-server flow client, the in-memory session
//! store, and the `config.toml` loader.

pub mod config;
pub mod force;
pub mod oauth;
pub mod session;
