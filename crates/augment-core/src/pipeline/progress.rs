//! Batch progress reporting.

use std::sync::{Arc, Mutex};

/// Receives batch progress as whole percentages in `[0, 100]`.
///
/// Values arrive non-decreasing and the last one is 100 when every task has
/// settled. Calls come from worker tasks, so implementations must be cheap.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

impl<F> ProgressSink for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        self(percent)
    }
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u8) {}
}

/// `round(settled / total * 100)` in integer arithmetic, halves rounding up.
///
/// 100 is reserved for a fully settled batch; anything short of that reports
/// at most 99.
pub fn percent(settled: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let settled = settled.min(total);
    let rounded = ((settled * 200 + total) / (2 * total)) as u8;
    if settled < total {
        rounded.min(99)
    } else {
        rounded
    }
}

/// Counts settled tasks and forwards the percentage to a sink.
///
/// Each update happens under one lock, so concurrent workers can never
/// deliver percentages out of order.
pub(crate) struct ProgressTracker {
    total: usize,
    settled: Mutex<usize>,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressTracker {
    pub(crate) fn new(total: usize, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            total,
            settled: Mutex::new(0),
            sink,
        }
    }

    /// Mark `n` more tasks as settled.
    pub(crate) fn advance(&self, n: usize) {
        let mut settled = self.settled.lock().unwrap_or_else(|e| e.into_inner());
        *settled += n;
        self.sink.report(percent(*settled, self.total));
    }

    pub(crate) fn settled(&self) -> usize {
        *self.settled.lock().unwrap_or_else(|e| e.into_inner())
    }
}
