//! What the supervisor launches.

use std::ffi::{OsStr, OsString};
use std::process::Command;

/// Describes the program a [`Worker`](crate::Worker) supervises.
///
/// The worker builds a fresh [`Command`] for each launch, so implementations
/// must not hold process state of their own.
pub trait Runner: Send + Sync {
    /// Human-readable summary used in logs and errors.
    fn describe(&self) -> String;

    /// Builds the command that starts the child process.
    fn command(&self) -> Command;
}

/// Runs an external program with fixed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRunner {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandRunner {
    /// Creates a runner for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builds a runner from an argument vector whose first item is the
    /// program. Returns `None` for an empty vector.
    #[must_use]
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next()?;
        Some(Self {
            program,
            args: argv.collect(),
        })
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program to execute.
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }
}

impl Runner for CommandRunner {
    fn describe(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}
