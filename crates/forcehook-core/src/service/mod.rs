//! Domain services.

pub mod webhook;
