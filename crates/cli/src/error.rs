//! CLI error types.

use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The config file could not be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `--args` was not a JSON object.
    #[error("invalid --args: {0}")]
    InvalidArgs(String),

    /// An error occurred in the client layer.
    #[error(transparent)]
    Client(#[from] client::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
