use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use nix::unistd::Pid;
use tracing::{debug, info};

use super::WORKER_TARGET;
use super::child::deliver;
use crate::control::ControlAction;
use crate::flag::BlockingFlag;

const NO_CHILD: i32 = 0;

/// State shared between the monitoring loop and control callers.
#[derive(Debug, Default)]
pub(crate) struct ControlState {
    pid: AtomicI32,
    detached: AtomicBool,
    notified: AtomicBool,
    interrupted_at: Mutex<Option<Instant>>,
    pub(crate) finish: BlockingFlag,
}

impl ControlState {
    pub(crate) fn pid(&self) -> Option<Pid> {
        match self.pid.load(Ordering::SeqCst) {
            NO_CHILD => None,
            raw => Some(Pid::from_raw(raw)),
        }
    }

    pub(crate) fn set_pid(&self, pid: Pid) {
        self.pid.store(pid.as_raw(), Ordering::SeqCst);
    }

    /// Forgets the child once it has been reaped, so its pid is never
    /// signalled after the kernel may have recycled it.
    pub(crate) fn clear_pid(&self) {
        self.pid.store(NO_CHILD, Ordering::SeqCst);
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    pub(crate) fn was_notified(&self) -> bool {
        self.notified.load(Ordering::SeqCst)
    }

    /// Records when the child was interrupted for a detach. A later mark only
    /// moves the clock forward.
    pub(crate) fn mark_interrupted(&self, at: Instant) {
        let mut interrupted_at = self
            .interrupted_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *interrupted_at = Some(interrupted_at.map_or(at, |earlier| earlier.max(at)));
    }

    /// End of the detach window, measured from the interrupt.
    pub(crate) fn detach_deadline(&self, window: Duration) -> Option<Instant> {
        let interrupted_at = *self
            .interrupted_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        interrupted_at
            .unwrap_or_else(Instant::now)
            .checked_add(window)
    }
}

/// Cloneable handle for steering a running [`Worker`](crate::Worker).
///
/// Every method is safe to call from any thread, before the child has been
/// spawned and after it has exited.
#[derive(Debug, Clone)]
pub struct WorkerController {
    state: Arc<ControlState>,
}

impl WorkerController {
    pub(crate) fn new(state: Arc<ControlState>) -> Self {
        Self { state }
    }

    /// Asks the child to stop: `SIGTERM` when graceful, `SIGQUIT` when
    /// immediate.
    pub fn stop(&self, immediate: bool) {
        self.apply(if immediate {
            ControlAction::StopImmediate
        } else {
            ControlAction::StopGraceful
        });
    }

    /// Asks the child to restart: `SIGUSR1` when graceful, `SIGHUP` when
    /// immediate.
    pub fn restart(&self, immediate: bool) {
        self.apply(if immediate {
            ControlAction::RestartImmediate
        } else {
            ControlAction::RestartGraceful
        });
    }

    /// Tells the child its log files were rotated (`SIGUSR2`).
    pub fn logrotated(&self) {
        self.apply(ControlAction::LogRotate);
    }

    /// Interrupts the child and switches the worker to bounded supervision.
    ///
    /// Detaching cannot be undone. The monitoring loop wakes immediately and
    /// gives the child at most the configured detach window to exit.
    pub fn detach(&self) {
        self.apply(ControlAction::Detach);
    }

    /// Carries out `action`.
    ///
    /// A later exit counts as requested only once a signal has reached the
    /// child, or after a detach.
    pub fn apply(&self, action: ControlAction) {
        info!(target: WORKER_TARGET, %action, "control action requested");
        if action == ControlAction::Detach {
            self.state.notified.store(true, Ordering::SeqCst);
            if !self.state.detached.swap(true, Ordering::SeqCst) {
                self.state.mark_interrupted(Instant::now());
            }
            self.signal_child(action);
            self.state.finish.set();
        } else if self.signal_child(action) {
            self.state.notified.store(true, Ordering::SeqCst);
        }
    }

    /// Pid of the supervised child while it is running.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.state
            .pid()
            .and_then(|pid| u32::try_from(pid.as_raw()).ok())
    }

    /// Reports whether [`detach`](Self::detach) has been requested.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.state.is_detached()
    }

    fn signal_child(&self, action: ControlAction) -> bool {
        let Some(pid) = self.state.pid() else {
            debug!(target: WORKER_TARGET, %action, "no child running; signal skipped");
            return false;
        };
        deliver(pid, action.child_signal())
    }
}
