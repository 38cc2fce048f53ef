use crate::error::{DeriveError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for schema derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveConfig {
    /// Upper bound on the number of path groups
    pub max_clusters: usize,

    /// Number of frequent literal segments used as feature dimensions
    pub top_literals: usize,

    /// Divisor applied to path depth for the depth dimension
    pub depth_scale: f64,

    /// Bucket count of the value-hash fallback grouping
    pub fallback_buckets: usize,

    /// Paths kept per group as provenance
    pub sample_paths: usize,

    /// Leaf template stem; a shared file extension is appended to it
    pub leaf_stem: String,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            max_clusters: 5,
            top_literals: 10,
            depth_scale: 10.0,
            fallback_buckets: 10,
            sample_paths: 3,
            leaf_stem: "{filename}".to_string(),
        }
    }
}

impl DeriveConfig {
    /// Default configuration with a different group bound
    #[must_use]
    pub fn with_max_clusters(max_clusters: usize) -> Self {
        Self {
            max_clusters,
            ..Default::default()
        }
    }

    /// Create config that keeps distinct layouts apart (more, smaller groups)
    #[must_use]
    pub fn fine_grained() -> Self {
        Self {
            max_clusters: 12,
            top_literals: 20,
            sample_paths: 5,
            ..Default::default()
        }
    }

    /// Create config that folds the corpus into a single group
    #[must_use]
    pub fn single_group() -> Self {
        Self {
            max_clusters: 1,
            top_literals: 0,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_clusters == 0 {
            return Err(DeriveError::invalid_config("max_clusters must be > 0"));
        }

        if !self.depth_scale.is_finite() || self.depth_scale <= 0.0 {
            return Err(DeriveError::invalid_config(
                "depth_scale must be a positive number",
            ));
        }

        if self.fallback_buckets == 0 {
            return Err(DeriveError::invalid_config("fallback_buckets must be > 0"));
        }

        if self.leaf_stem.trim().is_empty() {
            return Err(DeriveError::invalid_config("leaf_stem must not be empty"));
        }

        Ok(())
    }
}
