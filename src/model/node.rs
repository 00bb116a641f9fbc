//! Node records as served by the repository

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::lenient::{null_as_default, strip_nulls};
use super::Profile;

/// Full node record (`getNode`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(alias = "_id")]
    pub id: String,

    #[serde(default, alias = "_label", deserialize_with = "null_as_default")]
    pub label: String,

    #[serde(default, alias = "_profile", deserialize_with = "null_as_default")]
    pub profile: String,

    #[serde(default, alias = "_parent_id")]
    pub parent: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Map<String, Value>,

    /// Top-level members some backends use instead of `fields` (e.g. `filepath`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>, profile: Profile) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            profile: profile.as_str().to_string(),
            parent: None,
            fields: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Replaces the fields map; non-object values are ignored
    pub fn with_fields(mut self, fields: Value) -> Self {
        if let Value::Object(map) = fields {
            self.fields = map;
        }
        self
    }

    pub fn is_child_of(&self, parent_id: &str) -> bool {
        self.parent.as_deref() == Some(parent_id)
    }

    /// Label, then `fields.name`, then the profile's default label
    pub fn display_label(&self, profile: Profile) -> String {
        if !self.label.is_empty() {
            return self.label.clone();
        }
        match self.fields.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => profile.default_label().to_string(),
        }
    }

    /// String member looked up in `fields` first, then at the top level
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .or_else(|| self.extra.get(key))
            .and_then(Value::as_str)
    }

    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            id: self.id.clone(),
            label: self.label.clone(),
            profile: self.profile.clone(),
            parent: self.parent.clone(),
        }
    }
}

/// Listing entry (`listNodes`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    #[serde(alias = "_id")]
    pub id: String,

    #[serde(default, alias = "_label", deserialize_with = "null_as_default")]
    pub label: String,

    #[serde(default, alias = "_profile", deserialize_with = "null_as_default")]
    pub profile: String,

    #[serde(default, alias = "_parent_id", skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Child listing entry (`listChildren`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    #[serde(alias = "_id")]
    pub id: String,

    #[serde(default, alias = "_profile", deserialize_with = "null_as_default")]
    pub profile: String,
}

/// Node together with its fields decoded against the profile schema
#[derive(Debug, Clone)]
pub struct TypedNode<F> {
    pub node: NodeRecord,
    pub fields: F,
}

impl<F> TypedNode<F>
where
    F: DeserializeOwned + Default,
{
    /// Decodes `fields` once; a map that does not fit the schema yields the default
    pub fn ingest(node: NodeRecord) -> Self {
        let fields = decode_fields(&node);
        Self { node, fields }
    }
}

impl<F> TypedNode<F> {
    pub fn id(&self) -> &str {
        &self.node.id
    }
}

pub fn decode_fields<F>(node: &NodeRecord) -> F
where
    F: DeserializeOwned + Default,
{
    match serde_json::from_value(Value::Object(strip_nulls(&node.fields))) {
        Ok(fields) => fields,
        Err(e) => {
            warn!(
                id = %node.id,
                profile = %node.profile,
                "fields do not match schema, using defaults: {}",
                e
            );
            F::default()
        }
    }
}

/// Filesystem/document identifier derived from a label
pub fn slugify(label: &str) -> String {
    label.replace(' ', "-")
}
