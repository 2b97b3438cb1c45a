use std::fmt;

use nix::sys::signal::Signal;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGUSR1, SIGUSR2};

/// Control actions an operator can request from a running worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    /// Let in-flight work finish, then exit.
    StopGraceful,
    /// Exit promptly.
    StopImmediate,
    /// Let in-flight work finish, then restart.
    RestartGraceful,
    /// Restart promptly.
    RestartImmediate,
    /// Reopen log files after rotation.
    LogRotate,
    /// Stop supervising and leave the child running on its own.
    Detach,
}

impl ControlAction {
    /// Every action, in signal-table order.
    pub const ALL: [Self; 6] = [
        Self::StopGraceful,
        Self::StopImmediate,
        Self::RestartGraceful,
        Self::RestartImmediate,
        Self::LogRotate,
        Self::Detach,
    ];

    /// Maps a signal received by the supervisor to the action it requests.
    ///
    /// An interactive interrupt (`SIGINT`) means "detach", not "stop": a
    /// terminal Ctrl-C releases the worker, while scripted stops use `SIGTERM`
    /// or `SIGQUIT`.
    #[must_use]
    pub fn from_signal(signal: i32) -> Option<Self> {
        match signal {
            SIGTERM => Some(Self::StopGraceful),
            SIGQUIT => Some(Self::StopImmediate),
            SIGUSR1 => Some(Self::RestartGraceful),
            SIGHUP => Some(Self::RestartImmediate),
            SIGUSR2 => Some(Self::LogRotate),
            SIGINT => Some(Self::Detach),
            _ => None,
        }
    }

    /// Signal forwarded to the child to carry out this action.
    #[must_use]
    pub fn child_signal(self) -> Signal {
        match self {
            Self::StopGraceful => Signal::SIGTERM,
            Self::StopImmediate => Signal::SIGQUIT,
            Self::RestartGraceful => Signal::SIGUSR1,
            Self::RestartImmediate => Signal::SIGHUP,
            Self::LogRotate => Signal::SIGUSR2,
            Self::Detach => Signal::SIGINT,
        }
    }

    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StopGraceful => "stop-graceful",
            Self::StopImmediate => "stop-immediate",
            Self::RestartGraceful => "restart-graceful",
            Self::RestartImmediate => "restart-immediate",
            Self::LogRotate => "log-rotate",
            Self::Detach => "detach",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
