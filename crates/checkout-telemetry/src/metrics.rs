//! OTLP-backed Metrics Sink

use opentelemetry::global;
use opentelemetry::metrics::Counter;

use checkout_core::MetricsSink;

/// [`MetricsSink`] writing to the global meter provider.
///
/// Counter names match what the backend dashboards already chart.
pub struct OtelMetrics {
    actions: Counter<u64>,
    errors: Counter<u64>,
}

impl OtelMetrics {
    pub fn new(scope: &'static str) -> Self {
        let meter = global::meter(scope);
        Self {
            actions: meter
                .u64_counter("checkout_actions_total")
                .with_description("Total number of checkout lifecycle actions")
                .build(),
            errors: meter
                .u64_counter("checkout_errors_total")
                .with_description("Total number of checkout lifecycle errors")
                .build(),
        }
    }
}

impl MetricsSink for OtelMetrics {
    fn increment_action(&self) {
        self.actions.add(1, &[]);
    }

    fn increment_error(&self) {
        self.errors.add(1, &[]);
    }
}
