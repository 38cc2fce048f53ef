use crate::error::{Result, RouterError};
use globset::GlobBuilder;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expands projected wildcard patterns into the files they select.
///
/// `*` never crosses a directory separator. With `deep_leaf`, the trailing
/// filename wildcard also matches files in nested directories, which is
/// what leaf templates containing `/` produce.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternEnumerator {
    deep_leaf: bool,
}

impl PatternEnumerator {
    #[must_use]
    pub const fn new() -> Self {
        Self { deep_leaf: false }
    }

    /// Builder: let the trailing `*` match at any depth
    #[must_use]
    pub const fn deep_leaf(mut self, deep_leaf: bool) -> Self {
        self.deep_leaf = deep_leaf;
        self
    }

    /// Files matching `pattern`, sorted. A missing base directory yields nothing.
    pub fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let mut normalized = pattern.replace('\\', "/");
        if self.deep_leaf {
            if let Some(prefix) = normalized.strip_suffix("/*") {
                normalized = format!("{prefix}/**/*");
            }
        }

        let matcher = GlobBuilder::new(&normalized)
            .literal_separator(true)
            .build()
            .map_err(|source| RouterError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();

        let base = literal_prefix(&normalized);
        let base_path = if base.is_empty() { Path::new(".") } else { Path::new(base) };
        if !base_path.exists() {
            log::debug!("Pattern base {} does not exist", base_path.display());
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in WalkDir::new(base_path).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let candidate = entry.path().to_string_lossy().replace('\\', "/");
            let candidate = if base.is_empty() {
                candidate.strip_prefix("./").unwrap_or(&candidate).to_string()
            } else {
                candidate
            };
            if matcher.is_match(&candidate) {
                matches.push(entry.into_path());
            }
        }

        matches.sort();
        log::debug!("Pattern {pattern} matched {} files", matches.len());
        Ok(matches)
    }
}

/// Leading segments free of glob metacharacters, joined back with `/`
fn literal_prefix(pattern: &str) -> &str {
    let mut end = 0;
    for (idx, segment) in pattern.split('/').enumerate() {
        if segment.contains(&['*', '?', '[', '{'][..]) {
            break;
        }
        end = if idx == 0 { segment.len() } else { end + 1 + segment.len() };
    }
    if end == 0 && pattern.starts_with('/') {
        return "/";
    }
    &pattern[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn literal_prefix_stops_at_first_wildcard() {
        assert_eq!(literal_prefix("lake/sensor=*/altitude=*/*"), "lake");
        assert_eq!(literal_prefix("lake/sensor=lidar/altitude=*/*"), "lake/sensor=lidar");
        assert_eq!(literal_prefix("*/x"), "");
        assert_eq!(literal_prefix("/*"), "/");
        assert_eq!(literal_prefix("/data/a=*/*"), "/data");
    }

    #[test]
    fn expands_single_level_wildcards() {
        let temp = TempDir::new().expect("tempdir");
        let root = temp.path().join("lake");
        for rel in ["a=1/x.json", "a=2/y.json", "a=2/deep/z.json", "b=1/w.json"] {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "{}").unwrap();
        }

        let pattern = format!("{}/a=*/*", root.display());
        let shallow = PatternEnumerator::new().expand(&pattern).unwrap();
        assert_eq!(shallow, vec![root.join("a=1/x.json"), root.join("a=2/y.json")]);

        let deep = PatternEnumerator::new().deep_leaf(true).expand(&pattern).unwrap();
        assert_eq!(
            deep,
            vec![
                root.join("a=1/x.json"),
                root.join("a=2/deep/z.json"),
                root.join("a=2/y.json"),
            ]
        );
    }

    #[test]
    fn missing_base_is_empty() {
        let temp = TempDir::new().expect("tempdir");
        let pattern = format!("{}/nowhere/k=*/*", temp.path().display());
        assert!(PatternEnumerator::new().expand(&pattern).unwrap().is_empty());
    }
}
