//! Execution control for convolution runs.
//!
//! One controller coordinates one in-flight run at a time: it owns the
//! pause gate, the cancellation flag, and the progress router, and exposes
//! `pause`/`resume`/`cancel` to the caller. All three are safe to call
//! from any thread while the run executes elsewhere.

use crate::core::buffer::PixelBuffer;
use crate::core::error::{ChitraError, ControlError, ConvolveError, RunId};
use crate::execution::engine::{ConvolutionEngine, Strategy};
use crate::execution::progress::{ProgressRouter, ProgressSink};
use crate::kernels::kernel::Kernel;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of a controller's current (or most recent) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    /// No run has been started yet.
    Idle,
    /// A run is processing rows.
    Running,
    /// A run is blocked on the pause gate.
    Paused,
    /// The last run delivered a result.
    Completed,
    /// The last run was cancelled by the caller.
    Cancelled,
    /// The last run aborted on a fault.
    Failed,
}

impl ExecutionState {
    /// Whether a run is currently in flight.
    pub fn is_active(&self) -> bool {
        matches!(self, ExecutionState::Running | ExecutionState::Paused)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionState::Idle => "idle",
            ExecutionState::Running => "running",
            ExecutionState::Paused => "paused",
            ExecutionState::Completed => "completed",
            ExecutionState::Cancelled => "cancelled",
            ExecutionState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Gate the workers block on while a run is paused. Open means running.
struct PauseGate {
    is_open: Mutex<bool>,
    cond: Condvar,
}

impl PauseGate {
    /// Bounded wait so a paused worker re-checks cancellation even if no
    /// signal ever arrives.
    const POLL_INTERVAL: Duration = Duration::from_millis(100);

    fn new() -> Self {
        Self {
            is_open: Mutex::new(true),
            cond: Condvar::new(),
        }
    }

    fn close(&self) {
        *self.is_open.lock() = false;
    }

    fn open(&self) {
        *self.is_open.lock() = true;
        self.cond.notify_all();
    }

    /// Block until the gate opens, bailing out if cancellation is flagged
    /// while waiting.
    fn wait_open(&self, cancelled: &AtomicBool) -> Result<(), ConvolveError> {
        let mut is_open = self.is_open.lock();
        while !*is_open {
            if cancelled.load(Ordering::Acquire) {
                return Err(ConvolveError::Cancelled);
            }
            self.cond.wait_for(&mut is_open, Self::POLL_INTERVAL);
        }
        drop(is_open);
        if cancelled.load(Ordering::Acquire) {
            return Err(ConvolveError::Cancelled);
        }
        Ok(())
    }
}

/// Coordinates one in-flight convolution run.
///
/// The engine call executes on the thread that invoked [`run`](Self::run);
/// callers that want it off their thread spawn one and share the
/// controller via [`Arc`], driving `pause`/`resume`/`cancel` from the
/// outside. A controller is reusable: every terminal state releases the
/// gate and flag for the next `run`.
pub struct ExecutionController {
    state: Mutex<ExecutionState>,
    gate: PauseGate,
    cancelled: AtomicBool,
    router: ProgressRouter,
    run_id: Mutex<Option<RunId>>,
}

impl ExecutionController {
    /// Create a controller in the `Idle` state.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ExecutionState::Idle),
            gate: PauseGate::new(),
            cancelled: AtomicBool::new(false),
            router: ProgressRouter::new(),
            run_id: Mutex::new(None),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ExecutionState {
        *self.state.lock()
    }

    /// Whether a run is currently in flight.
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Identifier of the in-flight run, if any.
    pub fn current_run(&self) -> Option<RunId> {
        *self.run_id.lock()
    }

    /// Execute one convolution run under this controller.
    ///
    /// Rejects re-entry with [`ControlError::AlreadyRunning`] while a run
    /// is `Running` or `Paused`; the in-flight run is not disturbed. On
    /// return the controller is in `Completed`, `Cancelled`, or `Failed`
    /// and immediately reusable.
    pub fn run(
        &self,
        engine: &ConvolutionEngine,
        source: &PixelBuffer,
        kernel: &Kernel,
        strategy: Strategy,
        sink: Option<Arc<dyn ProgressSink>>,
    ) -> Result<PixelBuffer, ChitraError> {
        let run_id = self.begin(sink)?;
        log::info!(
            "run {} started: {:?} strategy, {}x{} image, {}x{} kernel",
            run_id,
            strategy,
            source.width(),
            source.height(),
            kernel.rows(),
            kernel.cols()
        );

        let outcome = engine.convolve(source, kernel, strategy, self);
        self.finish(run_id, &outcome);
        outcome.map_err(ChitraError::from)
    }

    /// Pause the in-flight run. No-op unless `Running`.
    pub fn pause(&self) {
        let mut state = self.state.lock();
        if *state == ExecutionState::Running {
            *state = ExecutionState::Paused;
            self.gate.close();
            log::debug!("run paused");
        }
    }

    /// Resume a paused run. No-op unless `Paused`.
    pub fn resume(&self) {
        let mut state = self.state.lock();
        if *state == ExecutionState::Paused {
            *state = ExecutionState::Running;
            self.gate.open();
            log::debug!("run resumed");
        }
    }

    /// Request cancellation of the in-flight run. No-op unless a run is
    /// active. The gate is opened so paused workers observe the flag
    /// promptly instead of waiting for a resume that never comes.
    pub fn cancel(&self) {
        let state = self.state.lock();
        if state.is_active() {
            self.cancelled.store(true, Ordering::Release);
            self.gate.open();
            log::debug!("cancellation requested");
        }
    }

    fn begin(&self, sink: Option<Arc<dyn ProgressSink>>) -> Result<RunId, ControlError> {
        {
            let mut state = self.state.lock();
            if state.is_active() {
                return Err(ControlError::AlreadyRunning);
            }
            *state = ExecutionState::Running;
            // Under the state lock so a racing cancel() cannot be lost.
            self.cancelled.store(false, Ordering::Release);
            self.gate.open();
        }
        // The router must not be touched while holding the state lock:
        // sinks are invoked under the router lock and may call back into
        // pause/resume/cancel.
        self.router.install(sink);

        let id = RunId::new();
        *self.run_id.lock() = Some(id);
        Ok(id)
    }

    fn finish(&self, run_id: RunId, outcome: &Result<PixelBuffer, ConvolveError>) {
        let terminal = match outcome {
            Ok(_) => ExecutionState::Completed,
            Err(ConvolveError::Cancelled) => ExecutionState::Cancelled,
            Err(_) => ExecutionState::Failed,
        };

        // Release the gate and flag for the next run.
        self.gate.open();
        self.cancelled.store(false, Ordering::Release);

        if terminal == ExecutionState::Cancelled {
            // Roll the caller-visible progress back to zero.
            self.router.reset();
        }
        self.router.clear();
        *self.run_id.lock() = None;

        // The state stays active until cleanup is done, so a concurrent
        // start cannot interleave with it.
        *self.state.lock() = terminal;

        match outcome {
            Err(err) if terminal == ExecutionState::Failed => {
                log::error!("run {} failed: {}", run_id, err)
            }
            _ => log::info!("run {} finished: {}", run_id, terminal),
        }
    }

    /// Row-boundary checkpoint for engine workers: observes cancellation
    /// and blocks while the gate is closed.
    pub(crate) fn checkpoint(&self) -> Result<(), ConvolveError> {
        if self.cancelled.load(Ordering::Acquire) {
            return Err(ConvolveError::Cancelled);
        }
        self.gate.wait_open(&self.cancelled)
    }

    pub(crate) fn router(&self) -> &ProgressRouter {
        &self.router
    }
}

impl Default for ExecutionController {
    fn default() -> Self {
        Self::new()
    }
}
