use pathmodel_schema::{Schema, SchemaNode};
use serde::Serialize;
use std::fmt::Write as _;

const EXPLAIN_BRANCHES: usize = 5;

/// Provenance numbers of a derivation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DerivationStats {
    pub path_count: usize,
    pub clusters: usize,
    pub unique_keys: usize,
}

/// One group of similar paths found during derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: usize,
    pub path_count: usize,
    pub sample_paths: Vec<String>,
}

/// A schema induced from a path corpus, with its provenance.
///
/// It has no tie to any live routing schema until [`DerivedSchema::into_schema`]
/// promotes it. Serializes as
/// `{"_derived": true, "_structure": {...}, "_stats": {...}, "_groups": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSchema {
    #[serde(rename = "_derived")]
    derived: bool,
    #[serde(rename = "_structure")]
    structure: Schema,
    #[serde(rename = "_stats")]
    stats: DerivationStats,
    #[serde(rename = "_groups")]
    groups: Vec<GroupSummary>,
}

impl DerivedSchema {
    #[must_use]
    pub fn new(structure: Schema, stats: DerivationStats, groups: Vec<GroupSummary>) -> Self {
        Self {
            derived: true,
            structure,
            stats,
            groups,
        }
    }

    /// Result for an empty corpus
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Schema::default(), DerivationStats::default(), Vec::new())
    }

    #[must_use]
    pub const fn structure(&self) -> &Schema {
        &self.structure
    }

    #[must_use]
    pub const fn stats(&self) -> &DerivationStats {
        &self.stats
    }

    #[must_use]
    pub fn groups(&self) -> &[GroupSummary] {
        &self.groups
    }

    /// Routing keys present in the induced structure
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.structure.keys()
    }

    /// Adopt the structure as a routing schema
    #[must_use]
    pub fn into_schema(self) -> Schema {
        self.structure
    }

    /// Human-readable summary of what was discovered
    #[must_use]
    pub fn explain(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Derived schema from {} paths", self.stats.path_count);
        let _ = writeln!(out, "Discovered {} natural groupings", self.stats.clusters);
        let _ = writeln!(out, "Found {} routing dimensions", self.stats.unique_keys);
        out.push('\n');
        out.push_str("Schema structure:");

        for entry in self.structure.root().entries() {
            let branches = entry.branches();
            let _ = write!(out, "\n  {}:", entry.key());
            let sample: Vec<&str> = branches
                .iter()
                .take(EXPLAIN_BRANCHES)
                .map(|b| b.label().as_str())
                .collect();
            let _ = write!(out, "\n    {} branches: {}", branches.len(), sample.join(", "));
            if branches.len() > EXPLAIN_BRANCHES {
                let _ = write!(out, "\n    ... and {} more", branches.len() - EXPLAIN_BRANCHES);
            }
            let nested = branches
                .iter()
                .filter(|b| matches!(b.node(), SchemaNode::Internal(_)))
                .count();
            if nested > 0 {
                let _ = write!(out, "\n    {nested} nested");
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_result_shape() {
        let value = serde_json::to_value(DerivedSchema::empty()).unwrap();
        assert_eq!(
            value,
            json!({
                "_derived": true,
                "_structure": {},
                "_stats": {"path_count": 0, "clusters": 0, "unique_keys": 0},
                "_groups": []
            })
        );
    }

    #[test]
    fn explain_lists_first_branches() {
        let labels: serde_json::Map<String, serde_json::Value> = (0..7)
            .map(|i| (format!("v{i}"), json!("{filename}")))
            .collect();
        let structure = Schema::from_value(&json!({
            "type": labels,
            "region": {"us": {"sensor": {"lidar": "{filename}"}}}
        }))
        .unwrap();
        let derived = DerivedSchema::new(
            structure,
            DerivationStats {
                path_count: 8,
                clusters: 2,
                unique_keys: 3,
            },
            Vec::new(),
        );

        assert_eq!(
            derived.explain(),
            "Derived schema from 8 paths\n\
             Discovered 2 natural groupings\n\
             Found 3 routing dimensions\n\
             \n\
             Schema structure:\n  \
             type:\n    \
             7 branches: v0, v1, v2, v3, v4\n    \
             ... and 2 more\n  \
             region:\n    \
             1 branches: us\n    \
             1 nested"
        );
    }
}
