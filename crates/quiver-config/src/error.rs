use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

/// Errors raised while assembling the layered configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A layer could not be read, parsed, or merged.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Arc<OrthoError>),
}
