//! Stage Spans
//!
//! Lifecycle stages acquire spans through [`StageTracer`] and hold them as
//! [`ScopedSpan`] guards. The guard ends the span when it goes out of scope,
//! so every exit path — success, error, early return — closes the span
//! exactly once, and nested spans close in reverse open order.

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use opentelemetry::trace::{Span, SpanContext, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue, global};

/// One named, timed unit of work.
pub trait LifecycleSpan: Send {
    /// Attach an attribute.
    fn set_attribute(&mut self, attribute: KeyValue);

    /// Record an exception and flip the span status to error.
    fn record_error(&mut self, error: &(dyn Error + 'static));

    /// Identifier pair for parenting and log correlation.
    fn span_context(&self) -> SpanContext;

    /// Close the span. Called at most once.
    fn end(&mut self);
}

/// Produces spans for lifecycle stages.
pub trait StageTracer: Send + Sync {
    /// Start a span, optionally as a child of `parent`.
    fn start_span(
        &self,
        name: &'static str,
        parent: Option<&SpanContext>,
        attributes: Vec<KeyValue>,
    ) -> ScopedSpan;
}

/// Guard around a [`LifecycleSpan`]; ends it on drop.
pub struct ScopedSpan {
    inner: Option<Box<dyn LifecycleSpan>>,
}

impl ScopedSpan {
    pub fn new(inner: Box<dyn LifecycleSpan>) -> Self {
        Self { inner: Some(inner) }
    }

    pub fn set_attribute(&mut self, attribute: KeyValue) {
        if let Some(span) = self.inner.as_mut() {
            span.set_attribute(attribute);
        }
    }

    pub fn record_error(&mut self, error: &(dyn Error + 'static)) {
        if let Some(span) = self.inner.as_mut() {
            span.record_error(error);
        }
    }

    /// Context for parenting child spans. `None` once ended.
    pub fn context(&self) -> Option<SpanContext> {
        self.inner.as_ref().map(|span| span.span_context())
    }

    /// End explicitly; equivalent to dropping the guard.
    pub fn end(self) {}
}

impl Drop for ScopedSpan {
    fn drop(&mut self) {
        if let Some(mut span) = self.inner.take() {
            span.end();
        }
    }
}

/// Tracer backed by the global OpenTelemetry tracer provider.
pub struct OtelStageTracer {
    tracer: global::BoxedTracer,
}

impl OtelStageTracer {
    pub fn new(scope: &'static str) -> Self {
        Self { tracer: global::tracer(scope) }
    }
}

impl StageTracer for OtelStageTracer {
    fn start_span(
        &self,
        name: &'static str,
        parent: Option<&SpanContext>,
        attributes: Vec<KeyValue>,
    ) -> ScopedSpan {
        let builder = self.tracer.span_builder(name).with_attributes(attributes);
        let span = match parent {
            Some(parent) if parent.is_valid() => {
                let cx = Context::new().with_remote_span_context(parent.clone());
                builder.start_with_context(&self.tracer, &cx)
            }
            _ => builder.start(&self.tracer),
        };
        ScopedSpan::new(Box::new(OtelLifecycleSpan { span }))
    }
}

struct OtelLifecycleSpan {
    span: global::BoxedSpan,
}

impl LifecycleSpan for OtelLifecycleSpan {
    fn set_attribute(&mut self, attribute: KeyValue) {
        self.span.set_attribute(attribute);
    }

    fn record_error(&mut self, error: &(dyn Error + 'static)) {
        self.span.record_error(error);
        self.span.set_status(Status::error(error.to_string()));
    }

    fn span_context(&self) -> SpanContext {
        self.span.span_context().clone()
    }

    fn end(&mut self) {
        self.span.end();
    }
}

/// Test double that counts span starts and ends.
///
/// Span-balance assertions hinge on this: after a lifecycle completes,
/// `started() == ended()` proves no span leaked.
#[derive(Debug, Default)]
pub struct CountingTracer {
    started: AtomicU64,
    ended: Arc<AtomicU64>,
}

impl CountingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    pub fn ended(&self) -> u64 {
        self.ended.load(Ordering::Relaxed)
    }
}

impl StageTracer for CountingTracer {
    fn start_span(
        &self,
        _name: &'static str,
        _parent: Option<&SpanContext>,
        _attributes: Vec<KeyValue>,
    ) -> ScopedSpan {
        self.started.fetch_add(1, Ordering::Relaxed);
        ScopedSpan::new(Box::new(CountingSpan {
            ended: Arc::clone(&self.ended),
            done: false,
        }))
    }
}

struct CountingSpan {
    ended: Arc<AtomicU64>,
    done: bool,
}

impl LifecycleSpan for CountingSpan {
    fn set_attribute(&mut self, _attribute: KeyValue) {}

    fn record_error(&mut self, _error: &(dyn Error + 'static)) {}

    fn span_context(&self) -> SpanContext {
        SpanContext::empty_context()
    }

    fn end(&mut self) {
        if !self.done {
            self.done = true;
            self.ended.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Tracer that produces inert spans.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl StageTracer for NoopTracer {
    fn start_span(
        &self,
        _name: &'static str,
        _parent: Option<&SpanContext>,
        _attributes: Vec<KeyValue>,
    ) -> ScopedSpan {
        ScopedSpan::new(Box::new(NoopSpan))
    }
}

struct NoopSpan;

impl LifecycleSpan for NoopSpan {
    fn set_attribute(&mut self, _attribute: KeyValue) {}

    fn record_error(&mut self, _error: &(dyn Error + 'static)) {}

    fn span_context(&self) -> SpanContext {
        SpanContext::empty_context()
    }

    fn end(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_tracer_balances_on_drop() {
        let tracer = CountingTracer::new();
        {
            let _a = tracer.start_span("a", None, vec![]);
            let _b = tracer.start_span("b", None, vec![]);
        }
        let c = tracer.start_span("c", None, vec![]);
        c.end();
        assert_eq!(tracer.started(), 3);
        assert_eq!(tracer.ended(), 3);
    }

    #[test]
    fn explicit_end_does_not_double_count() {
        let tracer = CountingTracer::new();
        let span = tracer.start_span("once", None, vec![]);
        span.end();
        assert_eq!(tracer.ended(), 1);
    }

    #[test]
    fn counting_span_context_is_invalid() {
        let tracer = CountingTracer::new();
        let span = tracer.start_span("ctx", None, vec![]);
        let context = span.context().expect("open span has a context");
        assert!(!context.is_valid());
    }
}
