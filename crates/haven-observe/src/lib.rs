//! Observability setup for Haven: structured logging and optional
//! OpenTelemetry trace export.

pub mod tracing_setup;
