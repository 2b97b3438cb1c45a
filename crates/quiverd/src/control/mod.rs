//! Out-of-band control of a running worker.
//!
//! Operators steer the supervisor with signals. A [`ControlChannel`] turns
//! whatever notification mechanism is in use into [`ControlAction`] values and
//! pushes them down an `mpsc` channel; the worker drains that channel on one
//! dispatcher thread so actions are applied one at a time, in arrival order.

mod action;
mod manual;
mod signal;

use std::io;
use std::sync::mpsc::Sender;

use thiserror::Error;

pub use action::ControlAction;
pub use manual::ManualChannel;
pub use signal::SignalChannel;

pub(crate) const CONTROL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::control");

/// Source of control actions for a running worker.
pub trait ControlChannel {
    /// Starts forwarding actions into `sink` until the guard is closed.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError`] when the underlying mechanism cannot be set up.
    fn install(&self, sink: Sender<ControlAction>) -> Result<ChannelGuard, ControlError>;
}

/// Errors raised while installing a control channel.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Registering signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Starting the forwarding thread failed.
    #[error("failed to start control forwarding thread: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Keeps a control channel installed. Closing it stops delivery and releases
/// every sender the channel holds.
#[must_use = "dropping the guard closes the control channel"]
pub struct ChannelGuard {
    closer: Option<Box<dyn FnOnce() + Send>>,
}

impl ChannelGuard {
    /// Wraps the teardown routine of an installed channel.
    pub fn new(closer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            closer: Some(Box::new(closer)),
        }
    }

    /// Stops delivery and waits for the channel to release its resources.
    pub fn close(mut self) {
        self.run_closer();
    }

    fn run_closer(&mut self) {
        if let Some(closer) = self.closer.take() {
            closer();
        }
    }
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        self.run_closer();
    }
}

impl std::fmt::Debug for ChannelGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelGuard")
            .field("open", &self.closer.is_some())
            .finish()
    }
}
