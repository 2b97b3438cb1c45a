//! Thin wrappers over `kill(2)` and `waitpid(2)` for the supervised child.

use std::fmt;

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use tracing::{debug, warn};

use super::WORKER_TARGET;

/// How the supervised child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// The child exited with this status code.
    Code(i32),
    /// The child was terminated by this signal.
    Signaled(Signal),
}

impl ChildExit {
    /// Shell-style status: the exit code, or 128 plus the signal number.
    #[must_use]
    pub fn status_code(self) -> i32 {
        match self {
            Self::Code(code) => code,
            Self::Signaled(signal) => 128_i32.saturating_add(signal as i32),
        }
    }

    /// Reports whether the child exited with status zero.
    #[must_use]
    pub fn success(self) -> bool {
        self == Self::Code(0)
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(formatter, "exit code {code}"),
            Self::Signaled(signal) => write!(formatter, "signal {}", signal.as_str()),
        }
    }
}

/// Result of one non-blocking reap attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reap {
    Running,
    Exited(ChildExit),
    Lost(Errno),
}

pub(crate) fn reap(pid: Pid) -> Reap {
    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::Exited(_, code)) => Reap::Exited(ChildExit::Code(code)),
        Ok(WaitStatus::Signaled(_, signal, _)) => Reap::Exited(ChildExit::Signaled(signal)),
        Ok(_) | Err(Errno::EINTR) => Reap::Running,
        Err(errno) => Reap::Lost(errno),
    }
}

/// Sends `signal` to `pid` and reports whether the kernel accepted it. A
/// child that is gone or out of reach is not an error.
pub(crate) fn deliver(pid: Pid, signal: Signal) -> bool {
    match kill(pid, signal) {
        Ok(()) => {
            debug!(
                target: WORKER_TARGET,
                pid = pid.as_raw(),
                signal = signal.as_str(),
                "signal delivered to child"
            );
            true
        }
        Err(errno @ (Errno::ESRCH | Errno::EPERM)) => {
            debug!(
                target: WORKER_TARGET,
                pid = pid.as_raw(),
                signal = signal.as_str(),
                %errno,
                "signal not delivered; child unreachable"
            );
            false
        }
        Err(errno) => {
            warn!(
                target: WORKER_TARGET,
                pid = pid.as_raw(),
                signal = signal.as_str(),
                %errno,
                "signal delivery failed"
            );
            false
        }
    }
}
