use serde_json::Value;

use crate::{
    Definitions, FieldType, SchemaNode, WellKnownRef, extract_file_field_type, is_file_schema,
    ref_name,
};

/// Maps a schema node, and optionally the value it currently holds, to the
/// field type the playground renders it as.
///
/// Format hints are checked first, then file layouts, then references, then
/// the plain `type` keyword. When the node has no `type` the value decides,
/// even if it carries `properties`, `items` or a union, and an unset value
/// reads as a string.
pub fn classify(
    node: Option<&SchemaNode>,
    defs: Option<&Definitions>,
    value: Option<&Value>,
) -> FieldType {
    let mut visiting = Vec::new();
    classify_node(node, defs, value, &mut visiting)
}

fn classify_node(
    node: Option<&SchemaNode>,
    defs: Option<&Definitions>,
    value: Option<&Value>,
    visiting: &mut Vec<String>,
) -> FieldType {
    let Some(node) = node else {
        return classify_value(value, false);
    };

    if let Some(field_type) = classify_format(node) {
        return field_type;
    }

    if is_file_schema(node) {
        return extract_file_field_type(node, value);
    }

    if let Some(reference) = &node.reference {
        if let Some(field_type) = classify_reference(reference, defs, value, visiting) {
            return field_type;
        }
    }

    if let Some(type_name) = node.type_name() {
        return from_type_name(type_name);
    }

    classify_value(value, true)
}

fn classify_format(node: &SchemaNode) -> Option<FieldType> {
    let format = node.format.as_deref()?;
    let type_name = node.type_name();

    if type_name == Some("string") && format == "date-time" {
        return Some(FieldType::DateTime);
    }
    if !matches!(type_name, None | Some("string")) {
        return None;
    }
    match format {
        "date" => Some(FieldType::Date),
        "timezone" => Some(FieldType::Timezone),
        "time" => Some(FieldType::Time),
        "html" => Some(FieldType::Html),
        _ => None,
    }
}

// None means the reference could not be followed and classification should
// continue with the node's own keywords.
fn classify_reference(
    reference: &str,
    defs: Option<&Definitions>,
    value: Option<&Value>,
    visiting: &mut Vec<String>,
) -> Option<FieldType> {
    let name = match ref_name(reference) {
        Ok(name) => name,
        Err(err) => {
            tracing::warn!("Cannot classify reference: {}", err);
            return Some(FieldType::String);
        }
    };

    if let Some(known) = WellKnownRef::from_name(name) {
        return Some(known.field_type());
    }

    let defs = defs?;
    let Some(target) = defs.get(name) else {
        tracing::warn!("Definition {} not found", name);
        return Some(FieldType::String);
    };

    if visiting.iter().any(|seen| seen == name) {
        tracing::warn!("Reference cycle through definition {}", name);
        return Some(FieldType::Unknown);
    }

    visiting.push(name.to_string());
    let field_type = classify_node(Some(target), Some(defs), value, visiting);
    visiting.pop();
    Some(field_type)
}

fn from_type_name(type_name: &str) -> FieldType {
    match type_name {
        "string" => FieldType::String,
        "integer" => FieldType::Integer,
        "number" => FieldType::Number,
        "boolean" => FieldType::Boolean,
        "array" => FieldType::Array,
        "object" => FieldType::Object,
        "null" => FieldType::Null,
        _ => FieldType::Unknown,
    }
}

fn classify_value(value: Option<&Value>, has_node: bool) -> FieldType {
    match value {
        None if has_node => FieldType::String,
        None => FieldType::Undefined,
        Some(Value::Null) if has_node => FieldType::String,
        Some(Value::Null) => FieldType::Null,
        Some(Value::String(_)) => FieldType::String,
        Some(Value::Number(_)) => FieldType::Number,
        Some(Value::Bool(_)) => FieldType::Boolean,
        Some(Value::Array(_)) => FieldType::Array,
        Some(Value::Object(_)) => FieldType::Object,
    }
}
