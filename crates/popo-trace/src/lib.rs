//! Logging and OpenTelemetry integration for the bulletin service.
//!
//! Provides subscriber setup with optional OTLP export, plus span helpers
//! for scrape runs, pipeline stages and cache operations.

pub mod spans;
pub mod tracer;

pub use spans::{cache_span, request_span, scrape_span, stage_span};
pub use tracer::{LogFormat, OtlpConfig, TracerError, TracingConfig, init_tracer, shutdown_tracer};
