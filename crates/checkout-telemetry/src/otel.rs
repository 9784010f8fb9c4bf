//! OpenTelemetry Pipeline
//!
//! OTLP-over-HTTP export for spans and metrics. The batch and interval
//! constants mirror the collector configuration this demo ships with.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{BatchConfigBuilder, BatchSpanProcessor, TracerProvider};
use opentelemetry_sdk::{Resource, runtime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::TelemetryError;

/// Spans queued before the exporter starts dropping.
pub const MAX_QUEUE_SIZE: usize = 2048;

/// Spans per export batch.
pub const MAX_EXPORT_BATCH_SIZE: usize = 512;

/// Upper bound for one export call.
pub const EXPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between metric exports.
pub const METRIC_EXPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Collector endpoint and resource identity.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Service name reported in the resource.
    pub service_name: String,

    /// Collector base URL; `/v1/traces` and `/v1/metrics` are appended.
    pub collector_endpoint: String,

    /// Deployment environment label.
    pub environment: String,

    /// Instance id, typically the hostname.
    pub instance_id: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "checkout-backend".into(),
            collector_endpoint: "http://localhost:4318".into(),
            environment: "development".into(),
            instance_id: "localhost".into(),
        }
    }
}

impl TelemetryConfig {
    /// Read the collector endpoint and resource labels from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: defaults.service_name,
            collector_endpoint: std::env::var("OTEL_ENDPOINT")
                .unwrap_or(defaults.collector_endpoint),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            instance_id: std::env::var("HOSTNAME").unwrap_or(defaults.instance_id),
        }
    }

    fn signal_url(&self, signal: &str) -> String {
        format!("{}/v1/{signal}", self.collector_endpoint.trim_end_matches('/'))
    }

    fn resource(&self) -> Resource {
        Resource::new(vec![
            KeyValue::new("service.name", self.service_name.clone()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("service.instance.id", self.instance_id.clone()),
            KeyValue::new("deployment.environment", self.environment.clone()),
        ])
    }
}

/// Holds the providers alive; flushes and shuts them down on drop.
pub struct TelemetryGuard {
    tracer_provider: TracerProvider,
    meter_provider: SdkMeterProvider,
    shut: AtomicBool,
}

impl TelemetryGuard {
    /// Flush and shut down both providers. Idempotent.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        if self.shut.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.tracer_provider
            .shutdown()
            .map_err(|e| TelemetryError::Shutdown(e.to_string()))?;
        self.meter_provider
            .shutdown()
            .map_err(|e| TelemetryError::Shutdown(e.to_string()))?;
        Ok(())
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            eprintln!("telemetry shutdown failed: {err}");
        }
    }
}

/// Build the OTLP pipeline and install the global tracing subscriber.
///
/// Must run inside a tokio runtime; the batch span processor and the
/// periodic metric reader schedule their exports on it.
///
/// # Errors
///
/// Returns an error if an exporter cannot be constructed or a global
/// subscriber is already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let resource = config.resource();

    global::set_text_map_propagator(TraceContextPropagator::new());

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(config.signal_url("traces"))
        .with_timeout(EXPORT_TIMEOUT)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let span_processor = BatchSpanProcessor::builder(span_exporter, runtime::Tokio)
        .with_batch_config(
            BatchConfigBuilder::default()
                .with_max_queue_size(MAX_QUEUE_SIZE)
                .with_max_export_batch_size(MAX_EXPORT_BATCH_SIZE)
                .with_max_export_timeout(EXPORT_TIMEOUT)
                .build(),
        )
        .build();

    let tracer_provider = TracerProvider::builder()
        .with_resource(resource.clone())
        .with_span_processor(span_processor)
        .build();

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_http()
        .with_endpoint(config.signal_url("metrics"))
        .with_timeout(EXPORT_TIMEOUT)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let metric_reader = PeriodicReader::builder(metric_exporter, runtime::Tokio)
        .with_interval(METRIC_EXPORT_INTERVAL)
        .build();

    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(metric_reader)
        .build();

    global::set_tracer_provider(tracer_provider.clone());
    global::set_meter_provider(meter_provider.clone());

    let otel_layer = tracing_opentelemetry::layer()
        .with_tracer(tracer_provider.tracer(config.service_name.clone()));
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .try_init()
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;

    Ok(TelemetryGuard {
        tracer_provider,
        meter_provider,
        shut: AtomicBool::new(false),
    })
}
