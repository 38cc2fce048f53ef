use crate::error::{Result, SchemaError};
use crate::label::BranchLabel;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::ffi::OsStr;
use std::path::{Component, Path};

/// A node of the routing decision tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    /// Ordered attribute key → branch map entries
    Internal(InternalNode),
    /// Filename template with `{placeholder}` tokens
    Leaf(String),
}

impl SchemaNode {
    #[must_use]
    pub fn leaf(template: impl Into<String>) -> Self {
        Self::Leaf(template.into())
    }

    #[must_use]
    pub const fn as_internal(&self) -> Option<&InternalNode> {
        match self {
            Self::Internal(node) => Some(node),
            Self::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(template) => Some(template),
            Self::Internal(_) => None,
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Build a node from a JSON value, compiling every branch label.
    ///
    /// `path` is the location of `value` inside the schema and only serves
    /// error reporting.
    pub fn from_value(value: &Value, path: &str) -> Result<Self> {
        match value {
            Value::String(template) => Ok(Self::Leaf(template.clone())),
            Value::Object(map) => {
                let mut node = InternalNode::new();
                for (key, branches) in map {
                    let entry_path = join_path(path, key);
                    if !is_plain_key(key) {
                        return Err(SchemaError::InvalidKey {
                            path: entry_path,
                            key: key.clone(),
                        });
                    }
                    let Value::Object(branch_values) = branches else {
                        return Err(SchemaError::invalid_branch_map(
                            entry_path,
                            value_kind(branches),
                        ));
                    };
                    let mut branch_map = BranchMap::new();
                    for (label, child) in branch_values {
                        let label_path = join_path(&entry_path, label);
                        let child = Self::from_value(child, &label_path)?;
                        branch_map.push(BranchLabel::parse(label.as_str())?, child);
                    }
                    node.push_entry(key.clone(), branch_map);
                }
                Ok(Self::Internal(node))
            }
            other => Err(SchemaError::invalid_node(path, value_kind(other))),
        }
    }

    /// Convert back to the nested JSON shape the schema was authored in
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Leaf(template) => Value::String(template.clone()),
            Self::Internal(node) => node.to_value(),
        }
    }
}

/// Mapping node: attribute keys in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternalNode {
    entries: Vec<Entry>,
}

impl InternalNode {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry. An existing key keeps its position and gets the new branches.
    pub fn push_entry(&mut self, key: impl Into<String>, branches: BranchMap) {
        let key = key.into();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(existing) => existing.branches = branches,
            None => self.entries.push(Entry { key, branches }),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn entry_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.key == key)
    }

    #[must_use]
    pub fn first_entry(&self) -> Option<&Entry> {
        self.entries.first()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for entry in &self.entries {
            map.insert(entry.key.clone(), entry.branches.to_value());
        }
        Value::Object(map)
    }
}

/// One attribute key and the branches it can take
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    branches: BranchMap,
}

impl Entry {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn branches(&self) -> &BranchMap {
        &self.branches
    }

    pub fn branches_mut(&mut self) -> &mut BranchMap {
        &mut self.branches
    }
}

/// Ordered label → subtree mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchMap {
    branches: Vec<Branch>,
}

impl BranchMap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            branches: Vec::new(),
        }
    }

    /// Append a branch. A repeated label replaces the earlier subtree in place.
    pub fn push(&mut self, label: BranchLabel, node: SchemaNode) {
        match self.branches.iter_mut().find(|b| b.label == label) {
            Some(existing) => existing.node = node,
            None => self.branches.push(Branch { label, node }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Branch> {
        self.branches.iter_mut()
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.label.as_str() == label)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut Branch> {
        self.branches.iter_mut().find(|b| b.label.as_str() == label)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Branch> {
        self.branches.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for branch in &self.branches {
            map.insert(branch.label.as_str().to_string(), branch.node.to_value());
        }
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    label: BranchLabel,
    node: SchemaNode,
}

impl Branch {
    #[must_use]
    pub const fn label(&self) -> &BranchLabel {
        &self.label
    }

    #[must_use]
    pub const fn node(&self) -> &SchemaNode {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut SchemaNode {
        &mut self.node
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(template) => serializer.serialize_str(template),
            Self::Internal(node) => node.serialize(serializer),
        }
    }
}

impl Serialize for InternalNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.branches)?;
        }
        map.end()
    }
}

impl Serialize for BranchMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.branches.len()))?;
        for branch in &self.branches {
            map.serialize_entry(branch.label.as_str(), &branch.node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value, "").map_err(D::Error::custom)
    }
}

/// True when `key` names exactly one normal path component.
///
/// Empty keys, `.`, `..`, and anything carrying a separator or a root are
/// rejected, since every key becomes a `key=label` directory.
#[must_use]
pub fn is_plain_key(key: &str) -> bool {
    if key.contains(&['/', '\\'][..]) {
        return false;
    }
    let mut components = Path::new(key).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == OsStr::new(key)
    )
}

pub(crate) fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}/{segment}")
    }
}

pub(crate) const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn builds_tagged_tree_from_json() {
        let value = json!({
            "sensor": {
                "lidar": {"altitude": {">100": "{ts}_high.parquet"}},
                "rgb": "{ts}_rgb.jpg"
            }
        });
        let node = SchemaNode::from_value(&value, "").unwrap();
        let root = node.as_internal().expect("internal root");
        let sensor = root.entry("sensor").expect("sensor entry");
        assert_eq!(sensor.branches().len(), 2);
        assert_eq!(
            sensor.branches().get("rgb").unwrap().node().as_leaf(),
            Some("{ts}_rgb.jpg")
        );
        assert!(sensor
            .branches()
            .get("lidar")
            .unwrap()
            .node()
            .as_internal()
            .is_some());
    }

    #[test]
    fn preserves_declaration_order() {
        let value = json!({"k": {"z": "a", "a": "b", "m": "c"}});
        let node = SchemaNode::from_value(&value, "").unwrap();
        let labels: Vec<_> = node.as_internal().unwrap().entries()[0]
            .branches()
            .iter()
            .map(|b| b.label().as_str().to_string())
            .collect();
        assert_eq!(labels, vec!["z", "a", "m"]);
    }

    #[test]
    fn rejects_non_template_leaf() {
        let value = json!({"k": {"a": 42}});
        let err = SchemaNode::from_value(&value, "").unwrap_err();
        match err {
            SchemaError::InvalidNode { path, found } => {
                assert_eq!(path, "k/a");
                assert_eq!(found, "number");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_key_without_branch_map() {
        let value = json!({"outcome": "{step}.json"});
        let err = SchemaNode::from_value(&value, "").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidBranchMap { .. }));
    }

    #[test]
    fn keys_must_be_single_path_components() {
        for key in ["/etc/cron.d", "../../up", "a/b", r"a\b", "..", ".", ""] {
            let value = json!({ key: {"a": "{n}.json"} });
            match SchemaNode::from_value(&value, "") {
                Err(SchemaError::InvalidKey { key: found, .. }) => assert_eq!(found, key),
                other => panic!("key {key:?} accepted: {other:?}"),
            }
        }

        let nested = json!({"sensor": {"lidar": {"../altitude": {">1": "x"}}}});
        match SchemaNode::from_value(&nested, "").unwrap_err() {
            SchemaError::InvalidKey { path, .. } => assert_eq!(path, "sensor/lidar/../altitude"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn plain_keys_are_accepted() {
        for key in ["sensor", "cron.d", "..hidden", "a.b.c", "run-id_2"] {
            assert!(is_plain_key(key), "{key}");
        }
    }

    #[test]
    fn serializes_back_to_authored_shape() {
        let value = json!({
            "metric": {">0.5": "high/{name}.json", "<=0.5": "low/{name}.json"}
        });
        let node = SchemaNode::from_value(&value, "").unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap(), value);
        assert_eq!(node.to_value(), value);
    }

    #[test]
    fn repeated_label_replaces_in_place() {
        let mut branches = BranchMap::new();
        branches.push(BranchLabel::literal("a"), SchemaNode::leaf("1"));
        branches.push(BranchLabel::literal("b"), SchemaNode::leaf("2"));
        branches.push(BranchLabel::literal("a"), SchemaNode::leaf("3"));
        assert_eq!(branches.len(), 2);
        assert_eq!(branches.first().unwrap().node().as_leaf(), Some("3"));
    }
}
