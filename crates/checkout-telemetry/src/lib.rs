//! # checkout-telemetry
//!
//! Tracing and metrics plumbing for the checkout demo:
//!
//! - [`init_telemetry`] wires OTLP span/metric export into the `tracing`
//!   subscriber stack and returns a guard that flushes on drop.
//! - [`StageTracer`] / [`ScopedSpan`] give lifecycle stages spans that are
//!   guaranteed to end on every exit path (RAII), with a [`CountingTracer`]
//!   double for asserting span balance in tests.
//! - [`TelemetryShim`] writes trace-correlated log lines and records errors
//!   on spans while feeding the injected [`MetricsSink`](checkout_core::MetricsSink).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     tracing::info!("spans and metrics now export over OTLP");
//!     Ok(())
//! }
//! ```

mod error;
mod metrics;
mod otel;
mod shim;
mod span;

pub use error::TelemetryError;
pub use metrics::OtelMetrics;
pub use otel::{
    EXPORT_TIMEOUT, MAX_EXPORT_BATCH_SIZE, MAX_QUEUE_SIZE, METRIC_EXPORT_INTERVAL,
    TelemetryConfig, TelemetryGuard, init_telemetry,
};
pub use shim::{LogLevel, NO_SPAN, NO_TRACE, TelemetryShim};
pub use span::{CountingTracer, LifecycleSpan, NoopTracer, OtelStageTracer, ScopedSpan, StageTracer};
