use thiserror::Error;

/// Result type for derivation
pub type Result<T> = std::result::Result<T, DeriveError>;

/// Errors raised around schema derivation.
///
/// Deriving from a list of paths never fails: malformed entries are read as
/// literal-only paths and an unusable clustering falls back to value
/// buckets. Only configuration and corpus collection can error.
#[derive(Error, Debug)]
pub enum DeriveError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl DeriveError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
