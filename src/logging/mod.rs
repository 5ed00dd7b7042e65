//! Structured logging: tracing subscriber setup and ndjson output.

mod format;

pub use format::StructuredLogger;
