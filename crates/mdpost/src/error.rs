//! CLI error types.

use mdpost_config::ConfigError;
use mdpost_core::{AssetError, PipelineError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    Asset(#[from] AssetError),

    #[error("{0}")]
    Validation(String),
}
