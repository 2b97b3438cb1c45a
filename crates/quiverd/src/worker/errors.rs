//! Failures surfaced by [`Worker::run`](crate::Worker::run).

use std::io;

use thiserror::Error;

use crate::control::ControlError;

/// Errors that prevent a worker from supervising its child.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// `run` was called on a worker that has already run.
    #[error("worker has already been started")]
    AlreadyStarted,
    /// The control channel could not be installed.
    #[error("failed to install control channel: {source}")]
    Control {
        /// Underlying channel error.
        #[source]
        source: ControlError,
    },
    /// The control dispatcher thread could not be started.
    #[error("failed to start control dispatcher: {source}")]
    Dispatcher {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The child process could not be started.
    #[error("failed to spawn '{runner}': {source}")]
    Spawn {
        /// Description of the runner that failed.
        runner: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The operating system reported a pid outside the signed range.
    #[error("child pid {pid} does not fit in pid_t")]
    PidOutOfRange {
        /// Reported process id.
        pid: u32,
    },
}
