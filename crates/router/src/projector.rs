use crate::engine::RoutingEngine;
use crate::matcher::match_branch;
use crate::packet::Packet;
use crate::sanitize::{confine_key, pair_segment};
use globset::escape;
use pathmodel_schema::{Entry, InternalNode, SchemaNode};
use std::collections::HashSet;

const WILDCARD: &str = "*";

impl RoutingEngine {
    /// Wildcard pattern selecting the data that matches a partial intent.
    ///
    /// Only the first entry of each node is considered. A supplied key whose
    /// value selects a branch contributes `key=<label>`; an omitted or
    /// unmatched key contributes `key=*` and the walk continues through the
    /// first branch. The filename is always `*`. Root and key text are
    /// glob-escaped, so `[`, `{`, `*` and `?` there match literally.
    ///
    /// Following the first branch is only faithful when sibling branches
    /// share their shape; see [`RoutingEngine::project_family`] otherwise.
    #[must_use]
    pub fn project(&self, intent: &Packet) -> String {
        let mut segments = vec![self.root_segment()];
        let mut node = self.schema.root();

        while let Some(entry) = node.first_entry() {
            let next = match select(entry, intent) {
                Some((child, label)) => {
                    segments.push(labelled(entry, label));
                    child
                }
                None => {
                    segments.push(wildcard(entry));
                    let Some(first) = entry.branches().first() else {
                        break;
                    };
                    if !entry.branches().is_uniform() {
                        log::warn!(
                            "Projecting '{}' through first branch '{}' of divergent siblings",
                            entry.key(),
                            first.label()
                        );
                    }
                    first.node()
                }
            };

            match next {
                SchemaNode::Internal(child) => node = child,
                SchemaNode::Leaf(_) => break,
            }
        }

        segments.push(WILDCARD.to_string());
        segments.join("/")
    }

    /// One pattern per distinct schema shape reachable under the intent.
    ///
    /// Like [`RoutingEngine::project`], but a wildcarded key expands into
    /// every branch instead of the first one. Patterns are deduplicated and
    /// returned in schema order.
    #[must_use]
    pub fn project_family(&self, intent: &Packet) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut segments = vec![self.root_segment()];
        expand(
            Some(self.schema.root()),
            intent,
            &mut segments,
            &mut seen,
            &mut out,
        );
        out
    }

    /// Root as a glob literal: separators normalized, metacharacters escaped
    fn root_segment(&self) -> String {
        let root = self.config.root.to_string_lossy().replace('\\', "/");
        escape(root.trim_end_matches('/'))
    }
}

/// Branch node and label selected by the intent's value for `entry`
fn select<'a>(entry: &'a Entry, intent: &Packet) -> Option<(&'a SchemaNode, &'a str)> {
    let value = intent.get(entry.key())?;
    let branch = match_branch(value, entry.branches())?;
    Some((branch.node(), branch.label().as_str()))
}

fn labelled(entry: &Entry, label: &str) -> String {
    escape(&pair_segment(entry.key(), label))
}

fn wildcard(entry: &Entry) -> String {
    format!("{}={WILDCARD}", escape(&confine_key(entry.key())))
}

/// `node` is `None` once a leaf is reached
fn expand(
    node: Option<&InternalNode>,
    intent: &Packet,
    segments: &mut Vec<String>,
    seen: &mut HashSet<String>,
    out: &mut Vec<String>,
) {
    let Some(entry) = node.and_then(InternalNode::first_entry) else {
        segments.push(WILDCARD.to_string());
        let pattern = segments.join("/");
        segments.pop();
        if seen.insert(pattern.clone()) {
            out.push(pattern);
        }
        return;
    };

    if let Some((child, label)) = select(entry, intent) {
        segments.push(labelled(entry, label));
        expand(child.as_internal(), intent, segments, seen, out);
        segments.pop();
        return;
    }

    segments.push(wildcard(entry));
    if entry.branches().is_empty() {
        expand(None, intent, segments, seen, out);
    } else {
        for branch in entry.branches().iter() {
            expand(branch.node().as_internal(), intent, segments, seen, out);
        }
    }
    segments.pop();
}
