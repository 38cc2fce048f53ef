use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute mapping routed through a schema.
///
/// Used both for full packets (routing) and partial intents (projection).
/// A `null` attribute counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Packet {
    attributes: Map<String, Value>,
}

impl Packet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set an attribute
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Attribute value, treating `null` as absent
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.values().all(Value::is_null)
    }

    /// Rendered attribute text, as it appears in filenames
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(render_value)
    }

    /// Build from an arbitrary JSON value; only objects are packets
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(attributes) => Some(Self { attributes }),
            _ => None,
        }
    }

    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl From<Map<String, Value>> for Packet {
    fn from(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Packet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Text form of an attribute value: strings unquoted, everything else as JSON
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
