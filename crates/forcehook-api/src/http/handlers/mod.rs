//! Route handlers.

pub mod index;
pub mod oauth;
pub mod sobject;
pub mod webhook;
