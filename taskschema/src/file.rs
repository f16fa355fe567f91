//! Recognition of file-backed fields (images, audio, documents).

use serde_json::Value;

use crate::{FieldType, SchemaNode, WellKnownRef};

/// A node is a file schema when it points at a well-known file reference or
/// declares the file object layout inline: a `content_type` property next to
/// `data` or `url`.
pub fn is_file_schema(node: &SchemaNode) -> bool {
    if let Some(reference) = &node.reference {
        return WellKnownRef::from_reference(reference).is_some();
    }
    node.properties.as_ref().is_some_and(|properties| {
        properties.contains_key("content_type")
            && (properties.contains_key("data") || properties.contains_key("url"))
    })
}

/// Picks image, audio or document for a file schema. The reference name is
/// authoritative; inline file objects are typed by the value's `content_type`.
pub fn extract_file_field_type(node: &SchemaNode, value: Option<&Value>) -> FieldType {
    if let Some(known) = node
        .reference
        .as_deref()
        .and_then(WellKnownRef::from_reference)
    {
        return known.field_type();
    }

    let content_type = value
        .and_then(|value| value.get("content_type"))
        .and_then(Value::as_str);
    match content_type {
        Some(content_type) if content_type.starts_with("image/") => FieldType::Image,
        Some(content_type) if content_type.starts_with("audio/") => FieldType::Audio,
        _ => FieldType::Document,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inline_file() -> SchemaNode {
        SchemaNode::from_value(json!({
            "type": "object",
            "properties": {
                "content_type": {"type": "string"},
                "url": {"type": "string"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_is_file_schema() {
        assert!(is_file_schema(&SchemaNode::reference("#/$defs/Audio")));
        assert!(!is_file_schema(&SchemaNode::reference("#/$defs/Person")));
        assert!(is_file_schema(&inline_file()));

        let not_a_file = SchemaNode::from_value(json!({
            "properties": {"content_type": {"type": "string"}}
        }))
        .unwrap();
        assert!(!is_file_schema(&not_a_file));
        assert!(!is_file_schema(&SchemaNode::typed("string")));
    }

    #[test]
    fn test_reference_decides() {
        let node = SchemaNode::reference("#/$defs/Image");
        let value = json!({"content_type": "audio/wav"});
        assert_eq!(extract_file_field_type(&node, Some(&value)), FieldType::Image);
        assert_eq!(
            extract_file_field_type(&SchemaNode::reference("#/$defs/File"), None),
            FieldType::Document
        );
    }

    #[test]
    fn test_content_type_decides_inline() {
        let node = inline_file();
        let image = json!({"content_type": "image/png", "url": "https://x/y.png"});
        let audio = json!({"content_type": "audio/mpeg"});
        let pdf = json!({"content_type": "application/pdf"});
        assert_eq!(extract_file_field_type(&node, Some(&image)), FieldType::Image);
        assert_eq!(extract_file_field_type(&node, Some(&audio)), FieldType::Audio);
        assert_eq!(extract_file_field_type(&node, Some(&pdf)), FieldType::Document);
        assert_eq!(extract_file_field_type(&node, None), FieldType::Document);
    }
}
