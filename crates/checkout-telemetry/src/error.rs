//! Telemetry Error Types

use thiserror::Error;

/// Failures while building or tearing down the telemetry pipeline.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// OTLP exporter construction failed.
    #[error("Exporter init failed: {0}")]
    Exporter(String),

    /// The global tracing subscriber could not be installed.
    #[error("Subscriber init failed: {0}")]
    Subscriber(String),

    /// Provider shutdown/flush failed.
    #[error("Shutdown failed: {0}")]
    Shutdown(String),
}
