//! Telemetry Shim
//!
//! Translates lifecycle events into trace-correlated log lines and span
//! error records. Side-effect only: nothing here swallows or rethrows —
//! callers decide whether an error propagates.

use std::error::Error;
use std::fmt::Write as _;
use std::sync::Arc;

use opentelemetry::trace::TraceContextExt;
use opentelemetry::{Context, KeyValue};

use checkout_core::MetricsSink;

use crate::span::ScopedSpan;

/// Sentinel trace id logged when no span is active.
pub const NO_TRACE: &str = "no-trace";

/// Sentinel span id logged when no span is active.
pub const NO_SPAN: &str = "no-span";

/// Severity of a correlated log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// The shim itself. Cheap to clone; shares the metrics sink.
#[derive(Clone)]
pub struct TelemetryShim {
    metrics: Arc<dyn MetricsSink>,
}

impl TelemetryShim {
    pub fn new(metrics: Arc<dyn MetricsSink>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &Arc<dyn MetricsSink> {
        &self.metrics
    }

    /// Write a correlated log line.
    ///
    /// Identifiers come from the enclosing stage span when the caller holds
    /// one, falling back to the ambient context; the sentinels stand in when
    /// neither yields a valid span. Increments the error counter when the
    /// level is [`LogLevel::Error`], and the action counter unconditionally.
    pub fn log_with_trace(
        &self,
        level: LogLevel,
        message: &str,
        span: Option<&ScopedSpan>,
        attributes: &[KeyValue],
    ) {
        let (trace_id, span_id) = trace_ids_for(span);
        let attrs = format_attributes(attributes);
        match level {
            LogLevel::Debug => {
                tracing::debug!(%trace_id, %span_id, attributes = %attrs, "{message}");
            }
            LogLevel::Info => {
                tracing::info!(%trace_id, %span_id, attributes = %attrs, "{message}");
            }
            LogLevel::Warn => {
                tracing::warn!(%trace_id, %span_id, attributes = %attrs, "{message}");
            }
            LogLevel::Error => {
                tracing::error!(%trace_id, %span_id, attributes = %attrs, "{message}");
            }
        }
        if level == LogLevel::Error {
            self.metrics.increment_error();
        }
        self.metrics.increment_action();
    }

    /// Record an error on its enclosing span and count it.
    ///
    /// When a span is given, the exception is recorded on it, the span status
    /// flips to error, and the message/operation attributes are attached
    /// merged with `extra`; the log line carries that span's identifiers.
    /// Always increments the error counter and emits a correlated error log.
    pub fn handle_error(
        &self,
        error: &(dyn Error + 'static),
        mut span: Option<&mut ScopedSpan>,
        operation: &str,
        extra: &[KeyValue],
    ) {
        let (trace_id, span_id) = trace_ids_for(span.as_deref());
        if let Some(span) = span.as_deref_mut() {
            span.record_error(error);
            span.set_attribute(KeyValue::new("error.message", error.to_string()));
            span.set_attribute(KeyValue::new("operation", operation.to_string()));
            for attribute in extra {
                span.set_attribute(attribute.clone());
            }
        }
        self.metrics.increment_error();

        tracing::error!(
            %trace_id,
            %span_id,
            operation,
            attributes = %format_attributes(extra),
            "{error}"
        );
    }
}

/// Identifiers of the given span when it is open and valid, otherwise
/// whatever the ambient context holds.
fn trace_ids_for(span: Option<&ScopedSpan>) -> (String, String) {
    if let Some(context) = span.and_then(ScopedSpan::context) {
        if context.is_valid() {
            return (
                context.trace_id().to_string(),
                context.span_id().to_string(),
            );
        }
    }
    current_trace_ids()
}

fn current_trace_ids() -> (String, String) {
    let context = Context::current();
    let span = context.span();
    let span_context = span.span_context();
    if span_context.is_valid() {
        (
            span_context.trace_id().to_string(),
            span_context.span_id().to_string(),
        )
    } else {
        (NO_TRACE.to_string(), NO_SPAN.to_string())
    }
}

fn format_attributes(attributes: &[KeyValue]) -> String {
    let mut rendered = String::new();
    for (index, attribute) in attributes.iter().enumerate() {
        if index > 0 {
            rendered.push(' ');
        }
        let _ = write!(rendered, "{}={}", attribute.key, attribute.value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::CountingMetrics;

    fn shim_with_counters() -> (TelemetryShim, Arc<CountingMetrics>) {
        let metrics = Arc::new(CountingMetrics::new());
        (TelemetryShim::new(metrics.clone()), metrics)
    }

    #[test]
    fn sentinels_used_outside_any_span() {
        let (trace_id, span_id) = current_trace_ids();
        assert_eq!(trace_id, NO_TRACE);
        assert_eq!(span_id, NO_SPAN);
    }

    #[test]
    fn info_log_counts_one_action_and_no_errors() {
        let (shim, metrics) = shim_with_counters();
        shim.log_with_trace(LogLevel::Info, "hello", None, &[]);
        assert_eq!(metrics.actions(), 1);
        assert_eq!(metrics.errors(), 0);
    }

    #[test]
    fn error_log_counts_action_and_error() {
        let (shim, metrics) = shim_with_counters();
        shim.log_with_trace(LogLevel::Error, "boom", None, &[KeyValue::new("k", "v")]);
        assert_eq!(metrics.actions(), 1);
        assert_eq!(metrics.errors(), 1);
    }

    #[test]
    fn log_inside_an_open_stage_span_carries_its_ids() {
        use opentelemetry::global;
        use opentelemetry_sdk::trace::TracerProvider;

        use crate::span::{OtelStageTracer, StageTracer};

        global::set_tracer_provider(TracerProvider::builder().build());
        let tracer = OtelStageTracer::new("shim-test");
        let span = tracer.start_span("stage", None, vec![]);
        let context = span.context().expect("open span has a context");
        assert!(context.is_valid());

        let (trace_id, span_id) = trace_ids_for(Some(&span));
        assert_eq!(trace_id, context.trace_id().to_string());
        assert_eq!(span_id, context.span_id().to_string());
        assert_ne!(trace_id, NO_TRACE);
        assert_ne!(span_id, NO_SPAN);
    }

    #[test]
    fn invalid_span_context_falls_back_to_sentinels() {
        use crate::span::{CountingTracer, StageTracer};

        let tracer = CountingTracer::new();
        let span = tracer.start_span("stage", None, vec![]);
        let (trace_id, span_id) = trace_ids_for(Some(&span));
        assert_eq!(trace_id, NO_TRACE);
        assert_eq!(span_id, NO_SPAN);
    }

    #[test]
    fn handle_error_counts_error_without_action() {
        use crate::span::{CountingTracer, StageTracer};

        let (shim, metrics) = shim_with_counters();
        let tracer = CountingTracer::new();
        let mut span = tracer.start_span("op", None, vec![]);
        let err = checkout_core::CheckoutError::Capture("declined".into());
        shim.handle_error(&err, Some(&mut span), "capture", &[]);
        drop(span);
        assert_eq!(metrics.errors(), 1);
        assert_eq!(metrics.actions(), 0);
        assert_eq!(tracer.ended(), 1);
    }

    #[test]
    fn attributes_render_as_key_value_pairs() {
        let rendered = format_attributes(&[
            KeyValue::new("order.id", "O1"),
            KeyValue::new("retry", true),
        ]);
        assert_eq!(rendered, "order.id=O1 retry=true");
    }
}
