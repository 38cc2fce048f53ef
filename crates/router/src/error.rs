use thiserror::Error;

/// Result type for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

/// Errors surfaced by the router.
///
/// Routing a packet never produces one of these; unresolvable packets land
/// in a sink. Errors only come from schema loading, configuration, and the
/// filesystem side effects (directory creation, pattern enumeration).
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Schema error: {0}")]
    Schema(#[from] pathmodel_schema::SchemaError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A wildcard pattern could not be compiled for enumeration
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl RouterError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
