use crate::{
    Definitions, FieldType, Items, SchemaNode, SchemaPath, WellKnownRef, typed_paths,
};

/// Changes the declared type of the field at the value `key_path`.
///
/// `string` and the file types replace the node with a bare `type` or
/// `$ref`; any other type clears both keywords and leaves the node untyped.
/// `$defs` is rebuilt afterwards.
pub fn set_field_type(schema: &SchemaNode, key_path: &str, field_type: FieldType) -> SchemaNode {
    let mut result = schema.clone();
    let path = SchemaPath::from_value_path(key_path);

    match (field_type, WellKnownRef::from_field_type(field_type)) {
        (FieldType::String, _) => {
            *result.node_at_or_insert(&path) = SchemaNode::typed("string");
        }
        (_, Some(known)) => {
            *result.node_at_or_insert(&path) = SchemaNode::reference(known.reference());
        }
        (_, None) => {
            if let Some(node) = result.node_at_mut(&path) {
                node.reference = None;
                node.node_type = None;
            }
        }
    }

    tracing::debug!("Set {} to {} at {}", key_path, field_type, path);
    result.defs = generate_defs(&result);
    result
}

/// Canonical definitions for the well-known file references used anywhere in
/// the tree. Existing `$defs` are not scanned and not kept.
pub fn generate_defs(schema: &SchemaNode) -> Option<Definitions> {
    let mut used = Vec::new();
    collect_well_known_refs(schema, &mut used);

    let defs: Definitions = WellKnownRef::ALL
        .into_iter()
        .filter(|known| used.contains(known))
        .map(|known| (known.name().to_string(), known.definition().clone()))
        .collect();
    (!defs.is_empty()).then_some(defs)
}

fn collect_well_known_refs(node: &SchemaNode, used: &mut Vec<WellKnownRef>) {
    if let Some(known) = node
        .reference
        .as_deref()
        .and_then(WellKnownRef::from_reference)
    {
        if !used.contains(&known) {
            used.push(known);
        }
    }

    let branches = [&node.any_of, &node.one_of, &node.all_of]
        .into_iter()
        .flatten()
        .flatten();
    let properties = node.properties.iter().flat_map(|properties| properties.values());
    let items = node.items.iter().flat_map(Items::iter);

    for child in branches.chain(properties).chain(items) {
        collect_well_known_refs(child, used);
    }
}

/// Copies the `type` / `$ref` choice of every typed field of `typed` onto the
/// same field of `schema`, for fields that still exist there. The root is
/// left alone. `$defs` is rebuilt afterwards.
pub fn carry_field_types(schema: &SchemaNode, typed: &SchemaNode) -> SchemaNode {
    let mut result = schema.clone();

    for path in typed_paths(typed) {
        if path.is_root() {
            continue;
        }
        let (Some(source), Some(target)) = (typed.node_at(&path), result.node_at_mut(&path)) else {
            continue;
        };
        if source.node_type.is_some() {
            target.node_type = source.node_type.clone();
            target.reference = None;
        } else {
            target.reference = source.reference.clone();
            target.node_type = None;
        }
    }

    result.defs = generate_defs(&result);
    result
}
