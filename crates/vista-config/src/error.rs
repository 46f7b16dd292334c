//! Errors raised while reading or writing `config.ron`.

use std::path::PathBuf;

/// Failure to load, validate or persist the viewer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `config.ron` exists but could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config directory or `config.ron` could not be written.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `config.ron` is not valid RON for [`Config`](crate::Config).
    #[error("failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// The in-memory config could not be turned into RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A loaded value violates a cross-field constraint, such as an empty
    /// fov range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
