use std::fmt;
use std::str::FromStr;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Destination for supervisor log records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogSink {
    /// Standard error of the supervisor process.
    #[default]
    Stderr,
    /// Standard output of the supervisor process.
    Stdout,
    /// A file opened in append mode.
    File(Utf8PathBuf),
}

/// Error raised when a log sink string is empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("log sink must be 'stderr', 'stdout', or a file path")]
pub struct LogSinkParseError;

impl FromStr for LogSink {
    type Err = LogSinkParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LogSinkParseError);
        }
        if trimmed.eq_ignore_ascii_case("stderr") {
            Ok(Self::Stderr)
        } else if trimmed.eq_ignore_ascii_case("stdout") {
            Ok(Self::Stdout)
        } else {
            Ok(Self::File(Utf8PathBuf::from(trimmed)))
        }
    }
}

impl TryFrom<String> for LogSink {
    type Error = LogSinkParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LogSink> for String {
    fn from(value: LogSink) -> Self {
        value.to_string()
    }
}

impl fmt::Display for LogSink {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stderr => formatter.write_str("stderr"),
            Self::Stdout => formatter.write_str("stdout"),
            Self::File(path) => write!(formatter, "{path}"),
        }
    }
}
