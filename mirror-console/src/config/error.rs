//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or saving credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the credentials file.
    #[error("Failed to access credentials file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the credentials file.
    #[error("Failed to parse credentials file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to serialize credentials for writing.
    #[error("Failed to serialize credentials: {0}")]
    Serialize(#[from] toml::ser::Error),
}
