use pathmodel_schema::is_plain_key;
use std::collections::{BTreeMap, BTreeSet};

const PAIR_SEPARATOR: char = '=';

/// One positional segment of a corpus path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// `key=value` with exactly one separator, a plain key and a non-empty value
    Pair { key: String, value: String },
    /// Anything else, kept verbatim
    Literal(String),
}

impl PathSegment {
    fn parse(segment: &str) -> Self {
        if segment.matches(PAIR_SEPARATOR).count() == 1 {
            if let Some((key, value)) = segment.split_once(PAIR_SEPARATOR) {
                if is_plain_key(key) && !value.is_empty() {
                    return Self::Pair {
                        key: key.to_string(),
                        value: value.to_string(),
                    };
                }
            }
        }
        Self::Literal(segment.to_string())
    }

    #[must_use]
    pub fn pair(&self) -> Option<(&str, &str)> {
        match self {
            Self::Pair { key, value } => Some((key.as_str(), value.as_str())),
            Self::Literal(_) => None,
        }
    }
}

/// A corpus path split into positional segments.
///
/// Backslashes are read as separators; empty and `.` segments are skipped,
/// so positions count real directory levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl ParsedPath {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.replace('\\', "/");
        let segments = normalized
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(PathSegment::parse)
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// `(key, value)` at `position`, if that segment is a pair
    #[must_use]
    pub fn pair_at(&self, position: usize) -> Option<(&str, &str)> {
        self.segments.get(position).and_then(PathSegment::pair)
    }

    /// Positioned pairs in path order
    pub fn pairs(&self) -> impl Iterator<Item = (usize, &str, &str)> {
        self.segments
            .iter()
            .enumerate()
            .filter_map(|(pos, seg)| seg.pair().map(|(k, v)| (pos, k, v)))
    }

    /// Value of the first pair carrying `key`
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.pairs().find(|(_, k, _)| *k == key).map(|(_, _, v)| v)
    }

    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.value_of(key).is_some()
    }

    #[must_use]
    pub fn has_literal(&self, literal: &str) -> bool {
        self.segments
            .iter()
            .any(|seg| matches!(seg, PathSegment::Literal(l) if l == literal))
    }

    /// Extension of the final segment, when it is a literal filename
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        match self.segments.last()? {
            PathSegment::Literal(name) => match name.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
                _ => None,
            },
            PathSegment::Pair { .. } => None,
        }
    }
}

/// Aggregate view of a path corpus, rebuilt for every derivation
#[derive(Debug, Clone, Default)]
pub struct PathFeatures {
    paths: Vec<ParsedPath>,
    key_values: BTreeMap<String, BTreeSet<String>>,
    literal_counts: BTreeMap<String, usize>,
}

impl PathFeatures {
    pub fn extract<S: AsRef<str>>(paths: &[S]) -> Self {
        let mut features = Self::default();

        for raw in paths {
            let parsed = ParsedPath::parse(raw.as_ref());
            for segment in parsed.segments() {
                match segment {
                    PathSegment::Pair { key, value } => {
                        features
                            .key_values
                            .entry(key.clone())
                            .or_default()
                            .insert(value.clone());
                    }
                    PathSegment::Literal(literal) => {
                        *features.literal_counts.entry(literal.clone()).or_insert(0) += 1;
                    }
                }
            }
            features.paths.push(parsed);
        }

        features
    }

    #[must_use]
    pub fn paths(&self) -> &[ParsedPath] {
        &self.paths
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Discovered keys, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.key_values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.key_values.len()
    }

    #[must_use]
    pub fn values(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.key_values.get(key)
    }

    #[must_use]
    pub fn literal_count(&self, literal: &str) -> usize {
        self.literal_counts.get(literal).copied().unwrap_or(0)
    }

    /// Literals seen more than once, most frequent first (ties by name), at most `limit`
    #[must_use]
    pub fn frequent_literals(&self, limit: usize) -> Vec<&str> {
        let mut frequent: Vec<(&str, usize)> = self
            .literal_counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(literal, count)| (literal.as_str(), *count))
            .collect();
        frequent.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        frequent.into_iter().take(limit).map(|(l, _)| l).collect()
    }

    pub fn depths(&self) -> impl Iterator<Item = usize> + '_ {
        self.paths.iter().map(ParsedPath::depth)
    }

    /// Key with the most distinct values; ties go to the first key in sort order
    #[must_use]
    pub fn most_diverse_key(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (key, values) in &self.key_values {
            if best.map_or(true, |(_, count)| values.len() > count) {
                best = Some((key.as_str(), values.len()));
            }
        }
        best.map(|(key, _)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn splits_pairs_and_literals() {
        let path = ParsedPath::parse("data/region=us-east/sensor=lidar/0.parquet");
        assert_eq!(path.depth(), 4);
        assert_eq!(path.pair_at(1), Some(("region", "us-east")));
        assert_eq!(path.pair_at(0), None);
        assert_eq!(
            path.pairs().collect::<Vec<_>>(),
            vec![(1, "region", "us-east"), (2, "sensor", "lidar")]
        );
        assert_eq!(path.extension(), Some("parquet"));
    }

    #[test]
    fn malformed_pairs_are_literals() {
        let path = ParsedPath::parse("a=b=c/=x/y=/plain/..=up");
        assert!(path
            .segments()
            .iter()
            .all(|s| matches!(s, PathSegment::Literal(_))));
    }

    #[test]
    fn windows_separators_and_empty_segments() {
        let path = ParsedPath::parse(r"C:\lake\\kind=log\.\run.txt");
        assert_eq!(path.depth(), 4);
        assert_eq!(path.value_of("kind"), Some("log"));
        assert!(path.has_literal("C:"));
    }

    #[test]
    fn extension_needs_stem_and_suffix() {
        assert_eq!(ParsedPath::parse("a/.hidden").extension(), None);
        assert_eq!(ParsedPath::parse("a/trailing.").extension(), None);
        assert_eq!(ParsedPath::parse("a/k=v.json").extension(), None);
        assert_eq!(ParsedPath::parse("a/archive.tar.gz").extension(), Some("gz"));
    }

    #[test]
    fn aggregates_corpus() {
        let features = PathFeatures::extract(&[
            "data/region=us-east/sensor=lidar/a.parquet",
            "data/region=us-west/sensor=lidar/b.parquet",
            "data/region=eu/c.parquet",
            "misc/notes.txt",
        ]);

        assert_eq!(features.len(), 4);
        assert_eq!(features.keys().collect::<Vec<_>>(), vec!["region", "sensor"]);
        assert_eq!(features.values("region").map(BTreeSet::len), Some(3));
        assert_eq!(features.literal_count("data"), 3);
        assert_eq!(features.frequent_literals(10), vec!["data"]);
        assert_eq!(features.depths().collect::<Vec<_>>(), vec![4, 4, 3, 2]);
        assert_eq!(features.most_diverse_key(), Some("region"));
    }

    #[test]
    fn diverse_key_ties_go_to_sort_order() {
        let features = PathFeatures::extract(&["b=1/a=1/x", "b=2/a=2/x"]);
        assert_eq!(features.most_diverse_key(), Some("a"));
        assert_eq!(PathFeatures::extract(&["x/y"]).most_diverse_key(), None);
    }

    #[test]
    fn frequent_literals_rank_by_count_then_name() {
        let features = PathFeatures::extract(&["a/b/c", "a/b/d", "a/c/e", "z/z"]);
        assert_eq!(features.frequent_literals(10), vec!["a", "b", "c", "z"]);
        assert_eq!(features.frequent_literals(2), vec!["a", "b"]);
    }

    proptest! {
        #[test]
        fn proptest_extract_keeps_every_path(paths in prop::collection::vec("[a-z=/.\\\\]{0,24}", 0..16)) {
            let features = PathFeatures::extract(&paths);
            prop_assert_eq!(features.len(), paths.len());
            for parsed in features.paths() {
                for (_, key, value) in parsed.pairs() {
                    prop_assert!(features.values(key).is_some_and(|v| v.contains(value)));
                }
            }
        }
    }
}
