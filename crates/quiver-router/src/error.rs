//! Error types surfaced while registering or resolving routes.

use thiserror::Error;

/// Errors reported by the router.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RouterError {
    /// A pattern could not be turned into a match expression.
    #[error("invalid route pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern text as supplied by the caller.
        pattern: String,
        /// Description of the compilation failure.
        message: String,
    },

    /// A symbolic target names a handler that was never registered.
    #[error("no handler registered under '{name}' (routing '{job_type}')")]
    UnknownHandler {
        /// Symbolic handler name carried by the matching route.
        name: String,
        /// Job type being routed when resolution failed.
        job_type: String,
    },

    /// A declaration table entry could not be interpreted.
    #[error("invalid route declaration for key '{key}': {reason}")]
    InvalidDeclaration {
        /// Table key that was rejected.
        key: String,
        /// Why the entry was rejected.
        reason: String,
    },
}

impl RouterError {
    pub(crate) fn invalid_pattern(pattern: impl Into<String>, source: &regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: source.to_string(),
        }
    }

    pub(crate) fn invalid_declaration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDeclaration {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
