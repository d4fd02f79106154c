//! Progress reporting for convolution runs.
//!
//! Workers never talk to the caller's sink directly. Every update funnels
//! through a [`ProgressRouter`], which serializes delivery and filters out
//! anything that would make the observed sequence decrease, no matter which
//! worker produced the update.

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Receiver of progress percentages for one run.
///
/// Values arrive in `[0, 100]`, non-decreasing, with a final `100` on
/// successful completion only. Implementations must not publish progress
/// back into the same controller from inside `report`; pausing or
/// cancelling it is fine.
pub trait ProgressSink: Send + Sync {
    /// Observe a progress value.
    fn report(&self, percent: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, percent: f64) {
        self(percent)
    }
}

/// Sink that forwards progress into a crossbeam channel, for callers that
/// prefer to consume updates by receiving rather than by callback.
pub struct ChannelSink {
    tx: Sender<f64>,
}

impl ChannelSink {
    /// Create a sink and the receiver its values arrive on.
    pub fn unbounded() -> (Self, Receiver<f64>) {
        let (tx, rx) = channel::unbounded();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, percent: f64) {
        // A departed receiver just means nobody is watching anymore.
        let _ = self.tx.send(percent);
    }
}

struct RouterInner {
    sink: Option<Arc<dyn ProgressSink>>,
    last: f64,
}

/// Single ordered delivery point for progress updates.
///
/// The lock is held across the sink call so the delivery order always
/// matches the filter decision.
pub struct ProgressRouter {
    inner: Mutex<RouterInner>,
}

impl ProgressRouter {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(RouterInner {
                sink: None,
                last: 0.0,
            }),
        }
    }

    /// Attach the sink for a fresh run, resetting the monotonic filter.
    pub(crate) fn install(&self, sink: Option<Arc<dyn ProgressSink>>) {
        let mut inner = self.inner.lock();
        inner.sink = sink;
        inner.last = 0.0;
    }

    /// Detach the sink once a run reaches a terminal state.
    pub(crate) fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.sink = None;
        inner.last = 0.0;
    }

    /// Deliver `percent` unless a greater-or-equal value was already seen.
    pub(crate) fn publish(&self, percent: f64) {
        let mut inner = self.inner.lock();
        if percent > inner.last {
            inner.last = percent;
            if let Some(sink) = &inner.sink {
                sink.report(percent);
            }
        }
    }

    /// Cancellation path: push the caller-visible value back to zero,
    /// bypassing the monotonic filter.
    pub(crate) fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.last = 0.0;
        if let Some(sink) = &inner.sink {
            sink.report(0.0);
        }
    }
}

/// Shared completed-row counter for one run.
///
/// Percentages are computed from this single atomic rather than from
/// per-worker state, which is what makes the delivered sequence
/// order-insensitive under the parallel strategy.
pub(crate) struct RowProgress<'a> {
    completed: AtomicUsize,
    total_rows: usize,
    router: &'a ProgressRouter,
}

impl<'a> RowProgress<'a> {
    /// Publish every this many completed rows.
    const REPORT_INTERVAL: usize = 5;

    pub(crate) fn new(total_rows: usize, router: &'a ProgressRouter) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total_rows,
            router,
        }
    }

    /// Record one completed row, publishing rate-limited progress.
    pub(crate) fn row_done(&self) {
        let done = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        if done % Self::REPORT_INTERVAL == 0 {
            self.router
                .publish(done as f64 / self.total_rows as f64 * 100.0);
        }
    }

    /// Publish the exact final value on success.
    pub(crate) fn finish(&self) {
        self.router.publish(100.0);
    }
}
