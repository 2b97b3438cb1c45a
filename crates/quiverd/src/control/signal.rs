use std::sync::mpsc::Sender;
use std::thread;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook::iterator::Signals;
use tracing::{debug, info, warn};

use super::{CONTROL_TARGET, ChannelGuard, ControlAction, ControlChannel, ControlError};

/// Signals the supervisor listens for.
pub(crate) const CONTROL_SIGNALS: [i32; 6] = [SIGTERM, SIGINT, SIGQUIT, SIGUSR1, SIGHUP, SIGUSR2];

/// Control channel fed by process signals delivered to the supervisor.
///
/// Handlers only record the signal; a forwarding thread maps each one to a
/// [`ControlAction`] outside of signal context.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalChannel;

impl SignalChannel {
    /// Builds a signal-backed channel.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ControlChannel for SignalChannel {
    fn install(&self, sink: Sender<ControlAction>) -> Result<ChannelGuard, ControlError> {
        let mut signals =
            Signals::new(CONTROL_SIGNALS).map_err(|source| ControlError::Install { source })?;
        let handle = signals.handle();
        let forwarder = thread::Builder::new()
            .name(String::from("quiverd-signals"))
            .spawn(move || {
                for signal in signals.forever() {
                    let Some(action) = ControlAction::from_signal(signal) else {
                        continue;
                    };
                    info!(
                        target: CONTROL_TARGET,
                        signal,
                        %action,
                        "control signal received"
                    );
                    if sink.send(action).is_err() {
                        debug!(
                            target: CONTROL_TARGET,
                            "control dispatcher gone; forwarding stopped"
                        );
                        break;
                    }
                }
            })
            .map_err(|source| ControlError::Spawn { source })?;
        debug!(target: CONTROL_TARGET, "signal handlers installed");
        Ok(ChannelGuard::new(move || {
            handle.close();
            if forwarder.join().is_err() {
                warn!(target: CONTROL_TARGET, "signal forwarding thread panicked");
            }
        }))
    }
}
