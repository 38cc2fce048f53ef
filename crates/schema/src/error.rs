use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Structural defects found while building or loading a routing schema.
///
/// These are the only hard errors of the engine. They are raised before any
/// packet is routed; routing itself never fails.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema root is not a key → branch-map mapping
    #[error("Schema root must be a mapping, found {found}")]
    NotAMapping { found: &'static str },

    /// A node is neither a mapping nor a filename template
    #[error("Invalid schema node at '{path}': expected mapping or template, found {found}")]
    InvalidNode { path: String, found: &'static str },

    /// An attribute key does not map to a branch map
    #[error("Invalid branch map at '{path}': expected mapping, found {found}")]
    InvalidBranchMap { path: String, found: &'static str },

    /// An attribute key is not a single plain path component
    #[error("Invalid key '{key}' at '{path}': keys must be a single path component")]
    InvalidKey { path: String, key: String },

    /// A `r/…/` label body is not a valid regular expression
    #[error("Invalid pattern label '{label}': {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },

    /// Schema file extension is not recognized
    #[error("Unsupported schema format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    pub(crate) fn invalid_node(path: impl Into<String>, found: &'static str) -> Self {
        Self::InvalidNode {
            path: path.into(),
            found,
        }
    }

    pub(crate) fn invalid_branch_map(path: impl Into<String>, found: &'static str) -> Self {
        Self::InvalidBranchMap {
            path: path.into(),
            found,
        }
    }
}
