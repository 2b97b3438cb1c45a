//! Layered configuration shared by the Quiver supervisor and its tooling.
//!
//! Values are resolved from four layers, lowest precedence first: built-in
//! defaults, an optional TOML file, `QUIVER_*` environment variables, and
//! command-line flags. The file accepts both `snake_case` and `kebab-case`
//! spellings of each key:
//!
//! ```toml
//! logger = "/var/log/quiver/worker.log"
//! detach_wait = 5.0
//! log-filter = "quiverd=debug"
//! log_format = "compact"
//! ```

//! Layered configuration shared by the Quiver supervisor and its tooling.
//!
//! Values are resolved by `ortho_config` from four layers, lowest precedence
//! first: built-in defaults, an optional TOML file named by `--config-path`
//! or `QUIVER_CONFIG_PATH`, `QUIVER_*` environment variables, and
//! command-line flags:
//!
//! ```toml
//! logger = "/var/log/quiver/worker.log"
//! detach_wait = 5.0
//! log_filter = "quiverd=debug"
//! log_format = "compact"
//! ```

mod defaults;
mod detach;
mod error;
mod logging;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DETACH_WAIT_SECS, DEFAULT_LOG_FILTER, default_detach_wait, default_log_filter,
    default_log_filter_string, default_log_format, default_logger,
};
pub use detach::{DetachWait, DetachWaitError, detach_wait_from_secs};
pub use error::ConfigError;
pub use logging::{LogFormat, LogFormatParseError, LogSink, LogSinkParseError};

/// Resolved configuration for a supervisor run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "QUIVER")]
pub struct Config {
    /// Log destination: `stderr`, `stdout`, or a file path.
    #[serde(default = "default_logger")]
    logger: LogSink,
    /// Seconds a detached child is still watched before returning.
    #[serde(default)]
    detach_wait: DetachWait,
    /// Tracing filter directive.
    #[serde(default = "default_log_filter_string")]
    log_filter: String,
    /// Log output format: `json` or `compact`.
    #[serde(default = "default_log_format")]
    log_format: LogFormat,
}

impl Config {
    /// Destination for supervisor log records.
    #[must_use]
    pub fn logger(&self) -> &LogSink {
        &self.logger
    }

    /// How long a detached child is still watched before returning.
    #[must_use]
    pub fn detach_wait(&self) -> Duration {
        self.detach_wait.as_duration()
    }

    /// Tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns a copy with a different detach window.
    #[must_use]
    pub fn with_detach_wait(mut self, detach_wait: Duration) -> Self {
        self.detach_wait = DetachWait::new(detach_wait);
        self
    }

    /// Returns a copy writing logs to `logger`.
    #[must_use]
    pub fn with_logger(mut self, logger: LogSink) -> Self {
        self.logger = logger;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logger: default_logger(),
            detach_wait: DetachWait::default(),
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests;
