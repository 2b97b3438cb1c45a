//! Supervisor for a single long-running worker process.
//!
//! `quiverd` launches a command, relays operator signals to it, and watches it
//! until it exits. Sending the supervisor `SIGINT` detaches it: the child is
//! interrupted and given a bounded window to finish before the supervisor
//! returns and leaves it running.
//!
//! | Supervisor receives | Action            | Child receives |
//! |---------------------|-------------------|----------------|
//! | `SIGTERM`           | graceful stop     | `SIGTERM`      |
//! | `SIGQUIT`           | immediate stop    | `SIGQUIT`      |
//! | `SIGUSR1`           | graceful restart  | `SIGUSR1`      |
//! | `SIGHUP`            | immediate restart | `SIGHUP`       |
//! | `SIGUSR2`           | log rotation      | `SIGUSR2`      |
//! | `SIGINT`            | detach            | `SIGINT`       |
//!
//! The same supervision is available as a library through [`Worker`].

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use quiver_config::ConfigError;
use thiserror::Error;
use tracing::info;

mod config;
mod control;
mod flag;
mod runner;
pub mod telemetry;
mod worker;

pub use control::{
    ChannelGuard, ControlAction, ControlChannel, ControlError, ManualChannel, SignalChannel,
};
pub use flag::BlockingFlag;
pub use runner::{CommandRunner, Runner};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use worker::{
    ChildExit, DETACH_POLL_INTERVAL, POLL_INTERVAL, RunOutcome, Worker, WorkerConfig,
    WorkerController, WorkerError,
};

const LAUNCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");

/// Exit status reported when the supervisor itself fails.
const FAILURE_STATUS: u8 = 1;

const CONFIG_HELP: &str = "Configuration flags must come before `--`:\n  \
    --config-path <PATH>   TOML configuration file [env: QUIVER_CONFIG_PATH]\n  \
    --logger <SINK>        stderr, stdout, or a file path [env: QUIVER_LOGGER]\n  \
    --detach-wait <SECS>   seconds to watch a detached child [env: QUIVER_DETACH_WAIT]\n  \
    --log-filter <FILTER>  tracing filter directive [env: QUIVER_LOG_FILTER]\n  \
    --log-format <FORMAT>  json or compact [env: QUIVER_LOG_FORMAT]";

/// Command line accepted by the `quiverd` binary.
#[derive(Debug, Parser)]
#[command(
    name = "quiverd",
    version,
    about = "Run a command under signal-driven supervision",
    after_help = CONFIG_HELP
)]
struct Invocation {
    /// Command to supervise, with its arguments.
    #[arg(last = true, required = true, value_name = "COMMAND")]
    command: Vec<OsString>,
}

/// Failures that stop the supervisor before or during supervision.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The command line could not be parsed.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Logging could not be set up.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The worker could not supervise the command.
    #[error(transparent)]
    Worker(#[from] WorkerError),
    /// No command followed the `--` separator.
    #[error("no command given to supervise")]
    MissingCommand,
}

/// Runs the supervisor with process-style arguments and returns its exit
/// status.
///
/// Help and version output go to `stdout`; usage errors and launch failures
/// are written to `stderr`.
pub fn run<I, T, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    match launch(args) {
        Ok(outcome) => ExitCode::from(exit_status(outcome)),
        Err(LaunchError::Usage(error)) => {
            let rendered = error.render();
            if error.use_stderr() {
                let _ = write!(stderr, "{rendered}");
            } else {
                let _ = write!(stdout, "{rendered}");
            }
            ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(FAILURE_STATUS))
        }
        Err(error) => {
            let _ = writeln!(stderr, "quiverd: {error}");
            ExitCode::from(FAILURE_STATUS)
        }
    }
}

fn launch<I, T>(args: I) -> Result<RunOutcome, LaunchError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let split = config::split_config_arguments(&args);
    let invocation = Invocation::try_parse_from(split.command_arguments)?;
    let config = config::load_config(&split.config_arguments)?;
    telemetry::initialise(&config)?;
    let runner = CommandRunner::from_argv(invocation.command).ok_or(LaunchError::MissingCommand)?;
    let worker = Worker::new(runner, WorkerConfig::from(&config));
    let outcome = worker.run()?;
    info!(target: LAUNCH_TARGET, ?outcome, "supervision finished");
    Ok(outcome)
}

/// Maps a supervision outcome to the supervisor's own exit status.
///
/// A supervised exit is passed through shell-style (the child's code, or 128
/// plus the signal number). Detaching is a success; losing the child is not.
#[must_use]
pub fn exit_status(outcome: RunOutcome) -> u8 {
    match outcome {
        RunOutcome::Exited(exit) => u8::try_from(exit.status_code()).unwrap_or(FAILURE_STATUS),
        RunOutcome::Detached { .. } => 0,
        RunOutcome::Lost => FAILURE_STATUS,
    }
}

#[cfg(test)]
mod tests;
