//! Supervision of a single child process.
//!
//! A [`Worker`] spawns the command produced by its [`Runner`], forwards
//! operator control actions to it as signals, and watches it until it exits.
//! Detaching switches the worker from indefinite to bounded supervision: the
//! child gets at most [`WorkerConfig::detach_wait`] to exit before `run`
//! returns and leaves it running on its own.

mod child;
mod controller;
mod errors;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use nix::unistd::Pid;
use quiver_config::{Config, default_detach_wait};
use tracing::{debug, info, warn};

pub use child::ChildExit;
pub use controller::WorkerController;
pub use errors::WorkerError;

use crate::control::{ChannelGuard, ControlAction, ControlChannel, SignalChannel};
use crate::runner::Runner;
use child::{Reap, deliver, reap};
use controller::ControlState;

pub(crate) const WORKER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::worker");

/// Longest sleep between reap attempts while supervising.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Longest sleep between reap attempts inside the detach window.
pub const DETACH_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Settings that shape supervision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    detach_wait: Duration,
}

impl WorkerConfig {
    /// How long a detached child is watched before `run` returns.
    #[must_use]
    pub fn detach_wait(&self) -> Duration {
        self.detach_wait
    }

    /// Replaces the detach window.
    #[must_use]
    pub fn with_detach_wait(mut self, detach_wait: Duration) -> Self {
        self.detach_wait = detach_wait;
        self
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            detach_wait: default_detach_wait(),
        }
    }
}

impl From<&Config> for WorkerConfig {
    fn from(config: &Config) -> Self {
        Self {
            detach_wait: config.detach_wait(),
        }
    }
}

/// How a call to [`Worker::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The child exited while fully supervised.
    Exited(ChildExit),
    /// The worker was detached. `exit` is set when the child exited inside the
    /// detach window.
    Detached {
        /// Exit observed during the detach window.
        exit: Option<ChildExit>,
    },
    /// The child could no longer be reaped, e.g. because another part of the
    /// process already collected it.
    Lost,
}

/// Supervises one child process built by a [`Runner`].
#[derive(Debug)]
pub struct Worker<R> {
    runner: R,
    config: WorkerConfig,
    started: AtomicBool,
    state: Arc<ControlState>,
}

impl<R: Runner> Worker<R> {
    /// Creates a worker; nothing is spawned until [`run`](Self::run).
    #[must_use]
    pub fn new(runner: R, config: WorkerConfig) -> Self {
        Self {
            runner,
            config,
            started: AtomicBool::new(false),
            state: Arc::new(ControlState::default()),
        }
    }

    /// Settings in effect.
    #[must_use]
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Handle for driving this worker from other threads.
    #[must_use]
    pub fn controller(&self) -> WorkerController {
        WorkerController::new(Arc::clone(&self.state))
    }

    /// See [`WorkerController::stop`].
    pub fn stop(&self, immediate: bool) {
        self.controller().stop(immediate);
    }

    /// See [`WorkerController::restart`].
    pub fn restart(&self, immediate: bool) {
        self.controller().restart(immediate);
    }

    /// See [`WorkerController::logrotated`].
    pub fn logrotated(&self) {
        self.controller().logrotated();
    }

    /// See [`WorkerController::detach`].
    pub fn detach(&self) {
        self.controller().detach();
    }

    /// Spawns the child and supervises it, taking control actions from
    /// process signals.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError`] when the worker already ran, the signal
    /// handlers cannot be installed, or the child cannot be spawned.
    pub fn run(&self) -> Result<RunOutcome, WorkerError> {
        self.run_with(&SignalChannel::new())
    }

    /// Spawns the child and supervises it, taking control actions from
    /// `channel`.
    ///
    /// The channel is installed before the child starts and closed before
    /// this returns; the dispatcher thread is joined on every path.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError`] when the worker already ran, the channel
    /// cannot be installed, or the child cannot be spawned.
    pub fn run_with<C: ControlChannel>(&self, channel: &C) -> Result<RunOutcome, WorkerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(WorkerError::AlreadyStarted);
        }

        let (sender, receiver) = mpsc::channel::<ControlAction>();
        let controller = self.controller();
        let dispatcher = thread::Builder::new()
            .name(String::from("quiverd-control"))
            .spawn(move || {
                for action in receiver {
                    controller.apply(action);
                }
            })
            .map_err(|source| WorkerError::Dispatcher { source })?;

        let guard = match channel.install(sender) {
            Ok(guard) => guard,
            Err(source) => {
                join_dispatcher(dispatcher);
                return Err(WorkerError::Control { source });
            }
        };

        let result = self.spawn().map(|pid| self.supervise(pid));
        shutdown(guard, dispatcher);
        result
    }

    fn spawn(&self) -> Result<Pid, WorkerError> {
        let runner = self.runner.describe();
        let child = self
            .runner
            .command()
            .spawn()
            .map_err(|source| WorkerError::Spawn {
                runner: runner.clone(),
                source,
            })?;
        let raw = child.id();
        let pid = i32::try_from(raw)
            .map(Pid::from_raw)
            .map_err(|_| WorkerError::PidOutOfRange { pid: raw })?;
        self.state.set_pid(pid);
        info!(target: WORKER_TARGET, pid = raw, %runner, "child process started");

        // A detach requested while the child was starting found no pid to
        // interrupt; the window runs from this interrupt instead.
        if self.state.is_detached() {
            deliver(pid, ControlAction::Detach.child_signal());
            self.state.mark_interrupted(Instant::now());
        }
        Ok(pid)
    }

    fn supervise(&self, pid: Pid) -> RunOutcome {
        while !self.state.finish.is_set() {
            match reap(pid) {
                Reap::Running => {
                    self.state.finish.wait(POLL_INTERVAL);
                }
                Reap::Exited(exit) => {
                    self.state.clear_pid();
                    self.log_exit(pid, exit);
                    return RunOutcome::Exited(exit);
                }
                Reap::Lost(errno) => {
                    self.state.clear_pid();
                    info!(
                        target: WORKER_TARGET,
                        pid = pid.as_raw(),
                        %errno,
                        "child process could not be reaped"
                    );
                    return RunOutcome::Lost;
                }
            }
        }
        self.await_detached(pid)
    }

    fn await_detached(&self, pid: Pid) -> RunOutcome {
        let window = self.config.detach_wait;
        info!(
            target: WORKER_TARGET,
            pid = pid.as_raw(),
            detach_wait_ms = window.as_millis(),
            "worker detached; waiting for child to exit"
        );
        let deadline = self.state.detach_deadline(window);
        loop {
            let remaining = deadline.map_or(window, |deadline| {
                deadline.saturating_duration_since(Instant::now())
            });
            if remaining.is_zero() {
                break;
            }
            thread::sleep(remaining.min(DETACH_POLL_INTERVAL));
            match reap(pid) {
                Reap::Running => {}
                Reap::Exited(exit) => {
                    self.state.clear_pid();
                    info!(
                        target: WORKER_TARGET,
                        pid = pid.as_raw(),
                        %exit,
                        "detached child exited"
                    );
                    return RunOutcome::Detached { exit: Some(exit) };
                }
                Reap::Lost(errno) => {
                    self.state.clear_pid();
                    info!(
                        target: WORKER_TARGET,
                        pid = pid.as_raw(),
                        %errno,
                        "detached child could not be reaped"
                    );
                    return RunOutcome::Detached { exit: None };
                }
            }
        }
        info!(
            target: WORKER_TARGET,
            pid = pid.as_raw(),
            "detach window elapsed; leaving child running"
        );
        RunOutcome::Detached { exit: None }
    }

    fn log_exit(&self, pid: Pid, exit: ChildExit) {
        if self.state.was_notified() {
            info!(target: WORKER_TARGET, pid = pid.as_raw(), %exit, "child process exited");
        } else {
            warn!(
                target: WORKER_TARGET,
                pid = pid.as_raw(),
                %exit,
                "child process finished unexpectedly"
            );
        }
    }
}

fn shutdown(guard: ChannelGuard, dispatcher: JoinHandle<()>) {
    guard.close();
    join_dispatcher(dispatcher);
}

fn join_dispatcher(dispatcher: JoinHandle<()>) {
    if dispatcher.join().is_err() {
        warn!(target: WORKER_TARGET, "control dispatcher panicked");
    } else {
        debug!(target: WORKER_TARGET, "control dispatcher stopped");
    }
}

