use crate::builder::build_group_schema;
use crate::config::DeriveConfig;
use crate::corpus::collect_corpus;
use crate::derived::{DerivationStats, DerivedSchema, GroupSummary};
use crate::error::Result;
use crate::features::PathFeatures;
use crate::grouping::{GroupingStrategy, ValueBuckets, WardLinkage};
use crate::merge::merge_group_schemas;
use pathmodel_schema::Schema;
use std::path::Path;

/// Induces routing schemas from existing path corpora.
///
/// Stateless between calls: features are rebuilt for every corpus.
#[derive(Debug, Clone, Default)]
pub struct SchemaInducer {
    config: DeriveConfig,
}

impl SchemaInducer {
    pub fn new(config: DeriveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &DeriveConfig {
        &self.config
    }

    /// Derive a schema from `paths`. Never fails; an empty corpus yields an empty structure.
    pub fn derive<S: AsRef<str>>(&self, paths: &[S]) -> DerivedSchema {
        if paths.is_empty() {
            return DerivedSchema::empty();
        }

        let features = PathFeatures::extract(paths);
        let labels = self.group(&features);

        let mut members: Vec<Vec<usize>> = Vec::new();
        for (idx, &label) in labels.iter().enumerate() {
            if members.len() <= label {
                members.resize_with(label + 1, Vec::new);
            }
            members[label].push(idx);
        }

        let mut group_schemas = Vec::with_capacity(members.len());
        let mut summaries = Vec::with_capacity(members.len());
        for (id, indices) in members.iter().enumerate().filter(|(_, m)| !m.is_empty()) {
            let schema = build_group_schema(&features, indices, &self.config.leaf_stem);
            group_schemas.push((schema, indices.len()));
            summaries.push(GroupSummary {
                id,
                path_count: indices.len(),
                sample_paths: indices
                    .iter()
                    .take(self.config.sample_paths)
                    .map(|&i| features.paths()[i].raw().to_string())
                    .collect(),
            });
        }

        let structure = merge_group_schemas(&group_schemas);
        let stats = DerivationStats {
            path_count: features.len(),
            clusters: summaries.len(),
            unique_keys: features.key_count(),
        };
        log::debug!(
            "Derived {} keys from {} paths in {} groups",
            stats.unique_keys,
            stats.path_count,
            stats.clusters
        );

        DerivedSchema::new(Schema::new(structure), stats, summaries)
    }

    /// Collect every file under `root` and derive from the relative paths
    pub fn derive_dir(&self, root: impl AsRef<Path>) -> Result<DerivedSchema> {
        let corpus = collect_corpus(root)?;
        Ok(self.derive(&corpus))
    }

    fn group(&self, features: &PathFeatures) -> Vec<usize> {
        let clusters = self.config.max_clusters.min(features.len());
        let ward = WardLinkage::new(self.config.top_literals, self.config.depth_scale);
        match ward.group(features, clusters) {
            Some(labels) => labels,
            None => {
                let fallback = ValueBuckets::new(self.config.fallback_buckets);
                log::debug!(
                    "{} grouping unavailable for {} paths, using {}",
                    ward.name(),
                    features.len(),
                    fallback.name()
                );
                fallback.assign(features)
            }
        }
    }
}

/// Derive with default settings and at most `max_clusters` groups
#[must_use]
pub fn derive_schema<S: AsRef<str>>(paths: &[S], max_clusters: usize) -> DerivedSchema {
    let config = DeriveConfig::with_max_clusters(max_clusters.max(1));
    SchemaInducer { config }.derive(paths)
}
