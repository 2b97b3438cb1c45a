//! The detach window: how long a detached child is still watched.

use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::DEFAULT_DETACH_WAIT_SECS;

/// Errors raised while reading a detach window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetachWaitError {
    /// The text is not a number.
    #[error("detach_wait must be a number of seconds, got '{text}': {source}")]
    NotANumber {
        /// Rejected text.
        text: String,
        /// Parser error.
        #[source]
        source: ParseFloatError,
    },
    /// The value is negative, not finite, or too large.
    #[error("detach_wait must be a finite, non-negative number of seconds (got {value})")]
    OutOfRange {
        /// Rejected value, rendered as text.
        value: String,
    },
}

/// A validated detach window, written as seconds in every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DetachWait(Duration);

impl DetachWait {
    /// Wraps an already validated duration.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// The window as a duration.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl Default for DetachWait {
    fn default() -> Self {
        Self(Duration::from_secs_f64(DEFAULT_DETACH_WAIT_SECS))
    }
}

impl TryFrom<f64> for DetachWait {
    type Error = DetachWaitError;

    fn try_from(seconds: f64) -> Result<Self, Self::Error> {
        detach_wait_from_secs(seconds).map(Self)
    }
}

impl From<DetachWait> for f64 {
    fn from(value: DetachWait) -> Self {
        value.0.as_secs_f64()
    }
}

impl FromStr for DetachWait {
    type Err = DetachWaitError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let seconds = text
            .trim()
            .parse::<f64>()
            .map_err(|source| DetachWaitError::NotANumber {
                text: text.to_owned(),
                source,
            })?;
        Self::try_from(seconds)
    }
}

impl fmt::Display for DetachWait {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.as_secs_f64())
    }
}

/// Converts a seconds value into a detach window.
///
/// # Errors
///
/// Returns [`DetachWaitError::OutOfRange`] for negative, non-finite, or
/// out-of-range values.
pub fn detach_wait_from_secs(seconds: f64) -> Result<Duration, DetachWaitError> {
    Duration::try_from_secs_f64(seconds).map_err(|_| DetachWaitError::OutOfRange {
        value: seconds.to_string(),
    })
}
