use std::sync::LazyLock;

use indexmap::IndexMap;
use serde_json::json;

use crate::{Definitions, FieldType, SchemaError, SchemaNode};

/// Prefix of every reference the engine writes.
pub const DEFS_REF_PREFIX: &str = "#/$defs/";

/// File references the playground knows how to render without a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownRef {
    Image,
    Audio,
    File,
}

impl WellKnownRef {
    pub const ALL: [WellKnownRef; 3] = [WellKnownRef::Image, WellKnownRef::Audio, WellKnownRef::File];

    pub fn name(&self) -> &'static str {
        match self {
            WellKnownRef::Image => "Image",
            WellKnownRef::Audio => "Audio",
            WellKnownRef::File => "File",
        }
    }

    pub fn reference(&self) -> String {
        format!("{}{}", DEFS_REF_PREFIX, self.name())
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            WellKnownRef::Image => FieldType::Image,
            WellKnownRef::Audio => FieldType::Audio,
            WellKnownRef::File => FieldType::Document,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.name() == name)
    }

    /// Reads the reference name out of a full `$ref` pointer.
    pub fn from_reference(reference: &str) -> Option<Self> {
        ref_name(reference).ok().and_then(Self::from_name)
    }

    pub fn from_field_type(field_type: FieldType) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|known| known.field_type() == field_type)
    }

    /// Canonical definition emitted into `$defs` for this reference.
    pub fn definition(&self) -> &'static SchemaNode {
        &FILE_DEFINITION
    }
}

// Image, Audio and File share the same file object layout.
static FILE_DEFINITION: LazyLock<SchemaNode> = LazyLock::new(|| {
    let mut properties = IndexMap::new();
    properties.insert(
        "content_type".to_string(),
        described(
            "The content type of the file",
            Some(json!(["image/png", "image/jpeg", "audio/wav", "application/pdf"])),
        ),
    );
    properties.insert(
        "data".to_string(),
        described("The base64 encoded data of the file", None),
    );
    properties.insert("url".to_string(), described("The URL of the file", None));

    SchemaNode {
        properties: Some(properties),
        ..SchemaNode::typed("object")
    }
});

fn described(description: &str, examples: Option<serde_json::Value>) -> SchemaNode {
    let mut node = SchemaNode::typed("string");
    node.extra
        .insert("description".to_string(), json!(description));
    if let Some(examples) = examples {
        node.extra.insert("examples".to_string(), examples);
    }
    node
}

/// Extracts the definition name from a pointer such as `#/$defs/CalendarEvent`.
pub fn ref_name(reference: &str) -> Result<&str, SchemaError> {
    match reference.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(SchemaError::InvalidReference(reference.to_string())),
    }
}

pub fn resolve<'a>(reference: &str, defs: &'a Definitions) -> Result<&'a SchemaNode, SchemaError> {
    let name = ref_name(reference)?;
    defs.get(name)
        .ok_or_else(|| SchemaError::MissingDefinition(name.to_string()))
}

/// Like [`resolve`], but well-known file references fall back to their
/// canonical definition when `defs` does not carry them.
pub fn resolve_or_builtin<'a>(
    reference: &str,
    defs: Option<&'a Definitions>,
) -> Result<&'a SchemaNode, SchemaError> {
    let name = ref_name(reference)?;
    if let Some(node) = defs.and_then(|defs| defs.get(name)) {
        return Ok(node);
    }
    WellKnownRef::from_name(name)
        .map(|known| known.definition())
        .ok_or_else(|| SchemaError::MissingDefinition(name.to_string()))
}
