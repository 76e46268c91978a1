//! In-memory latency histogram for prediction requests.
//! Covers transform, inference and formatting; excludes HTTP parsing.

use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;

/// Shared latency stats, in microseconds. Handlers record, /stats/latency reads.
pub struct LatencyStats {
    inner: Mutex<hdrhistogram::Histogram<u64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencySnapshot {
    pub samples: u64,
    pub p50_us: Option<u64>,
    pub p95_us: Option<u64>,
    pub p99_us: Option<u64>,
}

impl LatencyStats {
    /// Tracks 1us to 60s, 3 significant figures.
    pub fn new() -> Self {
        let histogram = hdrhistogram::Histogram::new_with_bounds(1, 60_000_000, 3)
            .expect("valid histogram bounds");
        Self {
            inner: Mutex::new(histogram),
        }
    }

    pub fn record(&self, d: Duration) {
        let us = d.as_micros().clamp(1, 60_000_000) as u64;
        if let Ok(mut h) = self.inner.lock() {
            let _ = h.record(us);
        }
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        let Ok(h) = self.inner.lock() else {
            return LatencySnapshot {
                samples: 0,
                p50_us: None,
                p95_us: None,
                p99_us: None,
            };
        };
        let samples = h.len();
        let q = |quantile: f64| (samples > 0).then(|| h.value_at_quantile(quantile));
        LatencySnapshot {
            samples,
            p50_us: q(0.5),
            p95_us: q(0.95),
            p99_us: q(0.99),
        }
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}
