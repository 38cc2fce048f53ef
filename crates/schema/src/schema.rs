use crate::error::{Result, SchemaError};
use crate::node::{join_path, value_kind, BranchMap, InternalNode, SchemaNode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// A validated routing schema. The root is always a mapping node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    root: InternalNode,
}

/// A key whose sibling branches lead to differently shaped subtrees.
///
/// Wildcard projection through such a key only follows the first branch,
/// so patterns for the other branches can be misleading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergentNode {
    /// Slash-joined `key/label` trail from the root to the node holding `key`
    pub path: String,
    pub key: String,
}

impl Schema {
    #[must_use]
    pub const fn new(root: InternalNode) -> Self {
        Self { root }
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(SchemaError::NotAMapping {
                found: value_kind(value),
            });
        }
        match SchemaNode::from_value(value, "")? {
            SchemaNode::Internal(root) => Ok(Self { root }),
            SchemaNode::Leaf(_) => Err(SchemaError::NotAMapping { found: "string" }),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(text)?;
        let value = serde_json::to_value(table)?;
        Self::from_value(&value)
    }

    /// Load a schema file, choosing the parser by extension (`.json` or `.toml`)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("toml") => Self::from_toml_str(&text),
            other => Err(SchemaError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    #[must_use]
    pub const fn root(&self) -> &InternalNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut InternalNode {
        &mut self.root
    }

    #[must_use]
    pub fn into_root(self) -> InternalNode {
        self.root
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        self.root.to_value()
    }

    /// Every attribute key in the tree, in first-seen depth-first order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut keys = Vec::new();
        collect_keys(&self.root, &mut seen, &mut keys);
        keys
    }

    /// Nodes whose sibling branches are not structurally equivalent
    #[must_use]
    pub fn divergent_nodes(&self) -> Vec<DivergentNode> {
        let mut found = Vec::new();
        collect_divergent(&self.root, "", &mut found);
        found
    }
}

fn collect_keys(node: &InternalNode, seen: &mut BTreeSet<String>, keys: &mut Vec<String>) {
    for entry in node.entries() {
        if seen.insert(entry.key().to_string()) {
            keys.push(entry.key().to_string());
        }
        for branch in entry.branches().iter() {
            if let SchemaNode::Internal(child) = branch.node() {
                collect_keys(child, seen, keys);
            }
        }
    }
}

fn collect_divergent(node: &InternalNode, path: &str, found: &mut Vec<DivergentNode>) {
    for entry in node.entries() {
        if !entry.branches().is_uniform() {
            found.push(DivergentNode {
                path: path.to_string(),
                key: entry.key().to_string(),
            });
        }

        for branch in entry.branches().iter() {
            if let SchemaNode::Internal(child) = branch.node() {
                let child_path = join_path(&join_path(path, entry.key()), branch.label().as_str());
                collect_divergent(child, &child_path, found);
            }
        }
    }
}

impl BranchMap {
    /// Whether every branch leads to a subtree of the same shape
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        let mut signatures = self.iter().map(|b| shape_signature(b.node()));
        match signatures.next() {
            Some(first) => signatures.all(|sig| sig == first),
            None => true,
        }
    }
}

/// Keys-only outline of a subtree; labels and templates are ignored.
fn shape_signature(node: &SchemaNode) -> String {
    match node {
        SchemaNode::Leaf(_) => "$".to_string(),
        SchemaNode::Internal(internal) => {
            let parts: Vec<String> = internal
                .entries()
                .iter()
                .map(|entry| {
                    let children: BTreeSet<String> = entry
                        .branches()
                        .iter()
                        .map(|b| shape_signature(b.node()))
                        .collect();
                    let children: Vec<String> = children.into_iter().collect();
                    format!("{}:[{}]", entry.key(), children.join(","))
                })
                .collect();
            format!("{{{}}}", parts.join(";"))
        }
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Value> for Schema {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(&value)
    }
}

impl From<InternalNode> for Schema {
    fn from(root: InternalNode) -> Self {
        Self::new(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn drone_schema() -> Value {
        json!({
            "sensor": {
                "lidar": {"altitude": {">100": "{ts}_high.parquet", "<=100": "{ts}_low.parquet"}},
                "thermal": {"quality": {"raw": "{ts}_raw.tiff", "processed": "{ts}_cal.tiff"}},
                "rgb": "{ts}_rgb.jpg"
            }
        })
    }

    #[test]
    fn root_must_be_mapping() {
        assert!(matches!(
            Schema::from_value(&json!("{name}.json")),
            Err(SchemaError::NotAMapping { found: "string" })
        ));
        assert!(matches!(
            Schema::from_value(&json!([1, 2])),
            Err(SchemaError::NotAMapping { found: "array" })
        ));
    }

    #[test]
    fn keys_in_first_seen_order() {
        let schema = Schema::from_value(&drone_schema()).unwrap();
        assert_eq!(schema.keys(), vec!["sensor", "altitude", "quality"]);
    }

    #[test]
    fn reports_divergent_siblings() {
        let schema = Schema::from_value(&drone_schema()).unwrap();
        let divergent = schema.divergent_nodes();
        assert_eq!(
            divergent,
            vec![DivergentNode {
                path: String::new(),
                key: "sensor".to_string()
            }]
        );
    }

    #[test]
    fn uniform_siblings_are_not_reported() {
        let schema = Schema::from_value(&json!({
            "outcome": {
                "success": {"tool": {"code": "{s}.json", "search": "{s}.json"}},
                "failure": {"tool": {"code": "{s}.json"}}
            }
        }))
        .unwrap();
        assert!(schema.divergent_nodes().is_empty());
    }

    #[test]
    fn toml_schema_keeps_order() {
        let text = r#"
[metric]
">0.5" = "high/{name}.json"
"<=0.5" = "low/{name}.json"
"#;
        let schema = Schema::from_toml_str(text).unwrap();
        assert_eq!(
            schema.to_value(),
            json!({"metric": {">0.5": "high/{name}.json", "<=0.5": "low/{name}.json"}})
        );
    }

    #[test]
    fn deserializes_through_serde() {
        let schema: Schema = serde_json::from_value(drone_schema()).unwrap();
        assert_eq!(serde_json::to_value(&schema).unwrap(), drone_schema());

        let versions: Schema =
            serde_json::from_value(json!({"k": {"10-x.y.z": "a", "1.2.3-4": "b"}})).unwrap();
        let labels = versions.root().entry("k").unwrap().branches();
        assert!(labels.iter().all(|b| b.label().predicate().is_none()));

        let bad: std::result::Result<Schema, _> =
            serde_json::from_value(json!({"../k": {"a": "b"}}));
        assert!(bad.is_err());
    }
}
