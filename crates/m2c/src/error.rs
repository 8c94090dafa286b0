//! CLI error types.

use m2c_config::ConfigError;
use m2c_sync::{RunError, SourceError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Run(#[from] RunError),
}
