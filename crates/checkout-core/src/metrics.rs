//! Metrics Sink Seam
//!
//! The original page kept two globals, `actionCount` and `errorCount`. Here
//! they are behind an injected trait so lifecycle code has no hidden shared
//! state and tests can read the counts back.

use std::sync::atomic::{AtomicU64, Ordering};

/// Injected counter pair for lifecycle instrumentation.
pub trait MetricsSink: Send + Sync {
    /// Count one telemetry-visible action.
    fn increment_action(&self);

    /// Count one recorded error.
    fn increment_error(&self);
}

/// Process-local monotonic counters.
///
/// Reset only when dropped — the equivalent of the original page reload.
#[derive(Debug, Default)]
pub struct CountingMetrics {
    actions: AtomicU64,
    errors: AtomicU64,
}

impl CountingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> u64 {
        self.actions.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

impl MetricsSink for CountingMetrics {
    fn increment_action(&self) {
        self.actions.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment_action(&self) {}

    fn increment_error(&self) {}
}
