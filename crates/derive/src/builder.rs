use crate::features::{ParsedPath, PathFeatures};
use pathmodel_schema::{BranchLabel, BranchMap, InternalNode, SchemaNode};
use std::collections::BTreeSet;

/// Rebuild a nested schema from the paths of one group.
///
/// Each path is read left to right. At every level, the next `key=value`
/// segment of each path is taken; the keys found (in first-appearance
/// order) become entries whose branches are the sorted values, and each
/// branch recurses on the paths carrying that segment, past it. Literal
/// segments in between are skipped. A branch whose paths have no further
/// pairs ends in a leaf template.
#[must_use]
pub fn build_group_schema(
    features: &PathFeatures,
    members: &[usize],
    leaf_stem: &str,
) -> InternalNode {
    let cursors: Vec<Cursor<'_>> = members
        .iter()
        .filter_map(|&idx| features.paths().get(idx))
        .map(|path| Cursor { path, from: 0 })
        .collect();
    build_level(&cursors, leaf_stem).unwrap_or_default()
}

/// A path and the position its unread segments start at
#[derive(Clone, Copy)]
struct Cursor<'a> {
    path: &'a ParsedPath,
    from: usize,
}

impl<'a> Cursor<'a> {
    fn next_pair(&self) -> Option<(usize, &'a str, &'a str)> {
        self.path.pairs().find(|(pos, _, _)| *pos >= self.from)
    }
}

fn build_level(cursors: &[Cursor<'_>], leaf_stem: &str) -> Option<InternalNode> {
    let heads: Vec<(Cursor<'_>, usize, &str, &str)> = cursors
        .iter()
        .filter_map(|cursor| {
            cursor
                .next_pair()
                .map(|(pos, key, value)| (*cursor, pos, key, value))
        })
        .collect();
    if heads.is_empty() {
        return None;
    }

    let mut keys: Vec<&str> = Vec::new();
    for (_, _, key, _) in &heads {
        if !keys.contains(key) {
            keys.push(*key);
        }
    }

    let mut node = InternalNode::new();
    for key in keys {
        let values: BTreeSet<&str> = heads
            .iter()
            .filter(|(_, _, k, _)| *k == key)
            .map(|(_, _, _, v)| *v)
            .collect();

        let mut branches = BranchMap::new();
        for value in values {
            let carriers: Vec<Cursor<'_>> = heads
                .iter()
                .filter(|(_, _, k, v)| *k == key && *v == value)
                .map(|(cursor, pos, _, _)| Cursor {
                    path: cursor.path,
                    from: pos + 1,
                })
                .collect();
            let child = match build_level(&carriers, leaf_stem) {
                Some(internal) => SchemaNode::Internal(internal),
                None => SchemaNode::leaf(leaf_template(&carriers, leaf_stem)),
            };
            branches.push(derived_label(value), child);
        }
        node.push_entry(key, branches);
    }
    Some(node)
}

/// `<stem>.<ext>` when every path shares one extension, otherwise the bare stem
fn leaf_template(cursors: &[Cursor<'_>], leaf_stem: &str) -> String {
    let mut extensions = cursors.iter().map(|cursor| cursor.path.extension());
    match extensions.next() {
        Some(Some(first)) if extensions.all(|ext| ext == Some(first)) => {
            format!("{leaf_stem}.{first}")
        }
        _ => leaf_stem.to_string(),
    }
}

/// Observed values become labels, compiled the way a loaded schema compiles them
fn derived_label(value: &str) -> BranchLabel {
    BranchLabel::parse(value).unwrap_or_else(|err| {
        log::debug!("Keeping derived label '{value}' literal: {err}");
        BranchLabel::literal(value)
    })
}
