use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{CONTROL_TARGET, ChannelGuard, ControlAction, ControlChannel, ControlError};

type Slot = Arc<Mutex<Option<Sender<ControlAction>>>>;

/// In-process control channel for embedders and tests.
///
/// Clones share one slot, so any clone can deliver actions to the worker that
/// installed the channel.
#[derive(Debug, Clone, Default)]
pub struct ManualChannel {
    sink: Slot,
}

impl ManualChannel {
    /// Creates a channel with no worker attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `action` for the attached worker.
    ///
    /// Returns `false` when no worker is listening.
    pub fn send(&self, action: ControlAction) -> bool {
        let delivered = lock(&self.sink)
            .as_ref()
            .is_some_and(|sender| sender.send(action).is_ok());
        if !delivered {
            debug!(target: CONTROL_TARGET, %action, "no worker attached; action dropped");
        }
        delivered
    }

    /// Reports whether a worker currently has the channel installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        lock(&self.sink).is_some()
    }
}

impl ControlChannel for ManualChannel {
    fn install(&self, sink: Sender<ControlAction>) -> Result<ChannelGuard, ControlError> {
        *lock(&self.sink) = Some(sink);
        let slot = Arc::clone(&self.sink);
        Ok(ChannelGuard::new(move || {
            lock(&slot).take();
        }))
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Sender<ControlAction>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
