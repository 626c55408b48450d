//! Observability setup for forcehook: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
