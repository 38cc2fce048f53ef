use crate::error::Result;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Files under `root` as `/`-separated paths relative to it, sorted
pub fn collect_corpus(root: impl AsRef<Path>) -> Result<Vec<String>> {
    let root = root.as_ref();
    let mut corpus = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if !segments.is_empty() {
            corpus.push(segments.join("/"));
        }
    }

    corpus.sort();
    log::debug!("Collected {} corpus paths under {}", corpus.len(), root.display());
    Ok(corpus)
}
