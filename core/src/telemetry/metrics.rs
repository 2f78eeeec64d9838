use std::sync::Mutex;

use serde::Serialize;

use crate::prelude::RegridResult;
use crate::Field2D;

/// Counters shared by callers that run many regridding operations.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub operations: usize,
    pub failures: usize,
    pub cells_written: usize,
}

#[derive(Default)]
struct Metrics {
    operations: usize,
    failures: usize,
    cells_written: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_success(&self, cells: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.operations += 1;
            metrics.cells_written += cells;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.operations += 1;
            metrics.failures += 1;
        }
    }

    /// Records the outcome of an operation and passes it through.
    pub fn observe(&self, result: RegridResult<Field2D>) -> RegridResult<Field2D> {
        match &result {
            Ok(field) => self.record_success(field.len()),
            Err(_) => self.record_failure(),
        }
        result
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                operations: metrics.operations,
                failures: metrics.failures,
                cells_written: metrics.cells_written,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
