//! Request counters for the /health endpoint.
//! Updated by the prediction handlers.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters. Handlers update, /health reads.
#[derive(Default)]
pub struct HealthState {
    predictions_served: AtomicU64,
    predictions_failed: AtomicU64,
    inputs_rejected: AtomicU64,
    warnings_emitted: AtomicU64,
    /// Nanosecond timestamp of the last successful prediction (0 = none).
    last_prediction_at_ns: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthCounters {
    pub predictions_served: u64,
    pub predictions_failed: u64,
    pub inputs_rejected: u64,
    pub warnings_emitted: u64,
    pub last_prediction_at_ns: u64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, warnings: usize, at_ns: u64) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        self.warnings_emitted
            .fetch_add(warnings as u64, Ordering::Relaxed);
        self.last_prediction_at_ns.store(at_ns, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.predictions_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.inputs_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn counters(&self) -> HealthCounters {
        HealthCounters {
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            predictions_failed: self.predictions_failed.load(Ordering::Relaxed),
            inputs_rejected: self.inputs_rejected.load(Ordering::Relaxed),
            warnings_emitted: self.warnings_emitted.load(Ordering::Relaxed),
            last_prediction_at_ns: self.last_prediction_at_ns.load(Ordering::Relaxed),
        }
    }
}
