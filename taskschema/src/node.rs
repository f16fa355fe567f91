use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SchemaError;

/// Named schema fragments, addressed by `#/$defs/<Name>`.
pub type Definitions = IndexMap<String, SchemaNode>;

/// A node of the JSON Schema subset used by task input and output schemas.
///
/// Only the keywords the engine interprets get a field. Everything else
/// (`description`, `title`, `examples`, ...) is kept in [`SchemaNode::extra`]
/// in its original order so that a schema survives a round trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<TypeSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(rename = "anyOf", default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<SchemaNode>>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaNode>>,

    #[serde(rename = "allOf", default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(rename = "$defs", default, skip_serializing_if = "Option::is_none")]
    pub defs: Option<Definitions>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// The `type` keyword: a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    Single(String),
    Multiple(Vec<String>),
}

impl TypeSpec {
    /// The name used for classification. A list resolves to its first
    /// non-`null` entry, so `["string", "null"]` reads as `string`.
    pub fn primary(&self) -> Option<&str> {
        match self {
            TypeSpec::Single(name) => Some(name.as_str()),
            TypeSpec::Multiple(names) => names
                .iter()
                .find(|name| name.as_str() != "null")
                .or_else(|| names.first())
                .map(String::as_str),
        }
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        TypeSpec::Single(name.to_string())
    }
}

/// The `items` keyword: one schema for every element, or a tuple of
/// positional schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Tuple(Vec<SchemaNode>),
    Single(Box<SchemaNode>),
}

impl Items {
    /// The schema that stands for every element. Tuples are represented by
    /// their first position; an empty tuple has no concrete item schema.
    pub fn first(&self) -> Option<&SchemaNode> {
        match self {
            Items::Tuple(items) => items.first(),
            Items::Single(item) => Some(item),
        }
    }

    pub fn first_mut(&mut self) -> Option<&mut SchemaNode> {
        match self {
            Items::Tuple(items) => items.first_mut(),
            Items::Single(item) => Some(item),
        }
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Items::Tuple(_))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaNode> {
        let (tuple, single) = match self {
            Items::Tuple(items) => (items.as_slice(), None),
            Items::Single(item) => (&[][..], Some(item.as_ref())),
        };
        tuple.iter().chain(single)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionKind {
    AnyOf,
    OneOf,
    AllOf,
}

/// Structural reading of a node, in precedence order.
#[derive(Debug, Clone, Copy)]
pub enum NodeShape<'a> {
    Ref(&'a str),
    Union(UnionKind, &'a [SchemaNode]),
    Array(&'a Items),
    Object(&'a IndexMap<String, SchemaNode>),
    Enum(&'a [Value]),
    Leaf,
}

impl SchemaNode {
    pub fn typed(name: &str) -> Self {
        Self {
            node_type: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value, SchemaError> {
        Ok(serde_json::to_value(self)?)
    }

    /// The `type` name used for classification, if any.
    pub fn type_name(&self) -> Option<&str> {
        self.node_type.as_ref().and_then(TypeSpec::primary)
    }

    /// The non-empty union branches, checked in `anyOf`, `oneOf`, `allOf` order.
    pub fn union(&self) -> Option<(UnionKind, &[SchemaNode])> {
        [
            (UnionKind::AnyOf, &self.any_of),
            (UnionKind::OneOf, &self.one_of),
            (UnionKind::AllOf, &self.all_of),
        ]
        .into_iter()
        .find_map(|(kind, branches)| match branches {
            Some(branches) if !branches.is_empty() => Some((kind, branches.as_slice())),
            _ => None,
        })
    }

    pub fn shape(&self) -> NodeShape<'_> {
        if let Some(reference) = &self.reference {
            return NodeShape::Ref(reference);
        }
        if let Some((kind, branches)) = self.union() {
            return NodeShape::Union(kind, branches);
        }
        if let Some(items) = &self.items {
            return NodeShape::Array(items);
        }
        if let Some(properties) = &self.properties {
            return NodeShape::Object(properties);
        }
        if let Some(values) = &self.enum_values {
            return NodeShape::Enum(values);
        }
        NodeShape::Leaf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_keeps_unknown_keywords() {
        let raw = json!({
            "type": "object",
            "description": "A calendar event",
            "properties": {
                "title": {"type": "string", "examples": ["Standup"]},
                "attendees": {"type": "array", "items": {"$ref": "#/$defs/Person"}}
            },
            "required": ["title"],
            "$defs": {
                "Person": {"type": "object", "properties": {"name": {"type": "string"}}}
            }
        });

        let node = SchemaNode::from_value(raw.clone()).unwrap();
        assert_eq!(node.type_name(), Some("object"));
        assert_eq!(
            node.extra.get("description"),
            Some(&json!("A calendar event"))
        );
        assert_eq!(node.to_value().unwrap(), raw);
    }

    #[test]
    fn test_property_order_is_preserved() {
        let node = SchemaNode::from_value(json!({
            "properties": {"zeta": {}, "alpha": {}, "mid": {}}
        }))
        .unwrap();
        let keys: Vec<_> = node.properties.unwrap().into_keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_items_forms() {
        let single = SchemaNode::from_value(json!({"items": {"type": "string"}})).unwrap();
        assert!(matches!(single.items, Some(Items::Single(_))));

        let tuple = SchemaNode::from_value(json!({
            "items": [{"type": "integer"}, {"type": "string"}]
        }))
        .unwrap();
        let items = tuple.items.unwrap();
        assert!(items.is_tuple());
        assert_eq!(items.first().unwrap().type_name(), Some("integer"));
        assert_eq!(items.iter().count(), 2);
    }

    #[test]
    fn test_type_list_reads_first_non_null() {
        let node = SchemaNode::from_value(json!({"type": ["null", "integer"]})).unwrap();
        assert_eq!(node.type_name(), Some("integer"));

        let only_null = SchemaNode::from_value(json!({"type": ["null"]})).unwrap();
        assert_eq!(only_null.type_name(), Some("null"));
    }

    #[test]
    fn test_shape_precedence() {
        let node = SchemaNode::from_value(json!({
            "$ref": "#/$defs/Image",
            "anyOf": [{"type": "string"}]
        }))
        .unwrap();
        assert!(matches!(node.shape(), NodeShape::Ref("#/$defs/Image")));

        let union = SchemaNode::from_value(json!({
            "oneOf": [{"type": "string"}],
            "anyOf": [{"type": "integer"}]
        }))
        .unwrap();
        match union.shape() {
            NodeShape::Union(kind, branches) => {
                assert_eq!(kind, UnionKind::AnyOf);
                assert_eq!(branches[0].type_name(), Some("integer"));
            }
            other => panic!("unexpected shape {other:?}"),
        }

        let empty_union = SchemaNode::from_value(json!({"anyOf": [], "type": "string"})).unwrap();
        assert!(matches!(empty_union.shape(), NodeShape::Leaf));

        let enumerated = SchemaNode::from_value(json!({"enum": ["a", "b"]})).unwrap();
        assert!(matches!(enumerated.shape(), NodeShape::Enum(values) if values.len() == 2));
    }
}
