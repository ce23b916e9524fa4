//! CLI error types.

use diasite_config::ConfigError;
use diasite_model::ModelError;
use diasite_site::{BuildError, WriteError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model: {0}")]
    Model(#[from] ModelError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Write(#[from] WriteError),

    #[error("{0}")]
    Validation(String),
}
