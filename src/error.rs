//! Crate error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the runtime, the CV loader and configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Terminal I/O failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// The CV document is not valid JSON or has the wrong shape.
    #[error("invalid cv document: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be parsed.
    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A transition was applied to a node it cannot animate.
    #[error("transition error: {0}")]
    Transition(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn transition(message: impl Into<String>) -> Self {
        Self::Transition(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
