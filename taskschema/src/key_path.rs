//! Translation between value key paths (`items.0.name`) and schema key paths
//! (`properties.items.items.properties.name`).

use std::fmt;

use crate::{Items, SchemaError, SchemaNode};

const PROPERTIES: &str = "properties";
const ITEMS: &str = "items";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaPathSegment {
    Property(String),
    Items,
}

/// Address of a node inside a schema tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaPath {
    segments: Vec<SchemaPathSegment>,
}

impl SchemaPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Numeric segments address array elements and become `items`; every
    /// other segment is a property name. Tuple positions are not kept apart.
    pub fn from_value_path(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        let segments = path
            .split('.')
            .map(|segment| {
                if is_index(segment) {
                    SchemaPathSegment::Items
                } else {
                    SchemaPathSegment::Property(segment.to_string())
                }
            })
            .collect();
        Self { segments }
    }

    /// Parses the dotted form produced by [`SchemaPath`]'s `Display`.
    pub fn parse(path: &str) -> Result<Self, SchemaError> {
        let mut segments = Vec::new();
        if path.is_empty() {
            return Ok(Self { segments });
        }
        let mut parts = path.split('.');
        while let Some(part) = parts.next() {
            match part {
                ITEMS => segments.push(SchemaPathSegment::Items),
                PROPERTIES => match parts.next() {
                    Some(name) => segments.push(SchemaPathSegment::Property(name.to_string())),
                    None => return Err(SchemaError::InvalidSchemaPath(path.to_string())),
                },
                _ => return Err(SchemaError::InvalidSchemaPath(path.to_string())),
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[SchemaPathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn child(&self, segment: SchemaPathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self
            .segments
            .iter()
            .flat_map(|segment| match segment {
                SchemaPathSegment::Property(name) => vec![PROPERTIES, name.as_str()],
                SchemaPathSegment::Items => vec![ITEMS],
            })
            .collect();
        f.write_str(&parts.join("."))
    }
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|byte| byte.is_ascii_digit())
}

/// `a.0.b` becomes `properties.a.items.properties.b`. An empty path is the
/// root and translates to the empty string, not `items`.
pub fn value_path_to_schema_path(path: &str) -> String {
    SchemaPath::from_value_path(path).to_string()
}

impl SchemaNode {
    pub fn node_at(&self, path: &SchemaPath) -> Option<&SchemaNode> {
        path.segments().iter().try_fold(self, |node, segment| match segment {
            SchemaPathSegment::Property(name) => node.properties.as_ref()?.get(name),
            SchemaPathSegment::Items => node.items.as_ref()?.first(),
        })
    }

    pub fn node_at_mut(&mut self, path: &SchemaPath) -> Option<&mut SchemaNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| match segment {
                SchemaPathSegment::Property(name) => node.properties.as_mut()?.get_mut(name),
                SchemaPathSegment::Items => node.items.as_mut()?.first_mut(),
            })
    }

    /// Walks to `path`, creating empty nodes for every missing step.
    pub fn node_at_or_insert(&mut self, path: &SchemaPath) -> &mut SchemaNode {
        path.segments()
            .iter()
            .fold(self, |node, segment| match segment {
                SchemaPathSegment::Property(name) => node
                    .properties
                    .get_or_insert_with(Default::default)
                    .entry(name.clone())
                    .or_default(),
                SchemaPathSegment::Items => {
                    let items = node
                        .items
                        .get_or_insert_with(|| Items::Single(Box::default()));
                    match items {
                        Items::Tuple(tuple) => {
                            if tuple.is_empty() {
                                tuple.push(SchemaNode::default());
                            }
                            &mut tuple[0]
                        }
                        Items::Single(item) => item.as_mut(),
                    }
                }
            })
    }
}

/// Every path, root included, whose node declares a `type` or a `$ref`.
/// Only `properties` and `items` are followed.
pub fn typed_paths(schema: &SchemaNode) -> Vec<SchemaPath> {
    let mut paths = Vec::new();
    collect_typed_paths(schema, SchemaPath::root(), &mut paths);
    paths
}

fn collect_typed_paths(node: &SchemaNode, path: SchemaPath, paths: &mut Vec<SchemaPath>) {
    if node.node_type.is_some() || node.reference.is_some() {
        paths.push(path.clone());
    }
    for (name, property) in node.properties.iter().flatten() {
        collect_typed_paths(
            property,
            path.child(SchemaPathSegment::Property(name.clone())),
            paths,
        );
    }
    if let Some(item) = node.items.as_ref().and_then(Items::first) {
        collect_typed_paths(item, path.child(SchemaPathSegment::Items), paths);
    }
}
