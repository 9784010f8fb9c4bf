//! Request Metrics
//!
//! Counters and a duration histogram on the global meter provider, exported
//! over OTLP alongside the spans.

use opentelemetry::metrics::{Counter, Histogram};
use opentelemetry::{KeyValue, global};

#[derive(Clone)]
pub struct ServerMetrics {
    requests: Counter<u64>,
    orders: Counter<u64>,
    errors: Counter<u64>,
    duration: Histogram<f64>,
}

impl ServerMetrics {
    pub fn new() -> Self {
        let meter = global::meter("checkout-server");
        Self {
            requests: meter
                .u64_counter("payment_requests_total")
                .with_description("Total number of payment API requests")
                .build(),
            orders: meter
                .u64_counter("payment_orders_total")
                .with_description("Total number of payment orders by outcome")
                .build(),
            errors: meter
                .u64_counter("payment_errors_total")
                .with_description("Total number of payment API errors")
                .build(),
            duration: meter
                .f64_histogram("payment_request_duration_seconds")
                .with_description("Duration of payment API requests in seconds")
                .build(),
        }
    }

    pub fn request(&self, endpoint: &'static str, method: &'static str) {
        self.requests.add(
            1,
            &[
                KeyValue::new("endpoint", endpoint),
                KeyValue::new("method", method),
            ],
        );
    }

    pub fn order(&self, status: &'static str) {
        self.orders.add(1, &[KeyValue::new("status", status)]);
    }

    pub fn error(&self, endpoint: &'static str) {
        self.errors.add(1, &[KeyValue::new("endpoint", endpoint)]);
    }

    pub fn duration(&self, endpoint: &'static str, status: &'static str, seconds: f64) {
        self.duration.record(
            seconds,
            &[
                KeyValue::new("endpoint", endpoint),
                KeyValue::new("status", status),
            ],
        );
    }
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
