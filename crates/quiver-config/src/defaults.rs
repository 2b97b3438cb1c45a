use std::time::Duration;

use crate::logging::{LogFormat, LogSink};

/// Seconds a detached child is still watched before the supervisor returns.
pub const DEFAULT_DETACH_WAIT_SECS: f64 = 10.0;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default detach window.
#[must_use]
pub fn default_detach_wait() -> Duration {
    Duration::from_secs_f64(DEFAULT_DETACH_WAIT_SECS)
}

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default destination for log records.
#[must_use]
pub fn default_logger() -> LogSink {
    LogSink::Stderr
}
