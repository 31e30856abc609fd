use std::path::PathBuf;
use thiserror::Error;

/// Core library errors
#[derive(Error, Debug)]
pub enum SweeperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unknown target: {0}")]
    UnknownTarget(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Raised by estimators, cleaners and orchestrators once their token has been cancelled.
///
/// This is the only failure that crosses a target boundary; every other problem is
/// absorbed where it happens and shows up as a size of zero or a failed clean.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

impl From<Cancelled> for SweeperError {
    fn from(_: Cancelled) -> Self {
        SweeperError::Cancelled
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SweeperError>;
