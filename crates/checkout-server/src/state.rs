//! Application State

use std::sync::Arc;

use checkout_core::PaymentGateway;
use checkout_telemetry::{StageTracer, TelemetryShim};

use crate::metrics::ServerMetrics;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Upstream payment gateway (None if credentials are not configured).
    pub gateway: Option<Arc<dyn PaymentGateway>>,

    /// Public client identifier served to the frontend; the `not_set`
    /// sentinel when credentials are missing.
    pub client_id: String,

    /// Trace-correlated logging shim.
    pub shim: TelemetryShim,

    /// Span source for request handlers.
    pub tracer: Arc<dyn StageTracer>,

    /// Request/order counters and duration histogram.
    pub metrics: ServerMetrics,

    /// Client used to forward browser telemetry to the collector.
    pub http: reqwest::Client,

    /// Collector base URL the proxy routes forward to.
    pub collector_base: String,
}
