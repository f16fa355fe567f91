//! Additive merge of two schema revisions.
//!
//! Successive extraction passes refine a schema; merging keeps everything
//! the old revision knew while letting the new one win on conflicts.

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::{Definitions, Items, SchemaNode};

/// Merges `new` onto `old`. When either side is absent the other one is
/// returned as is, borrowed rather than copied.
pub fn merge_schemas<'a>(
    old: Option<&'a SchemaNode>,
    new: Option<&'a SchemaNode>,
) -> Option<Cow<'a, SchemaNode>> {
    match (old, new) {
        (old, None) => old.map(Cow::Borrowed),
        (None, Some(new)) => Some(Cow::Borrowed(new)),
        (Some(old), Some(new)) => Some(Cow::Owned(merge(old, new))),
    }
}

/// Overlays `new` on `old` keyword by keyword, then recursively merges
/// `required`, `$defs`, `items` and `properties`.
pub fn merge(old: &SchemaNode, new: &SchemaNode) -> SchemaNode {
    let mut result = old.clone();

    overlay(&mut result.reference, &new.reference);
    overlay(&mut result.node_type, &new.node_type);
    overlay(&mut result.format, &new.format);
    overlay(&mut result.enum_values, &new.enum_values);
    overlay(&mut result.any_of, &new.any_of);
    overlay(&mut result.one_of, &new.one_of);
    overlay(&mut result.all_of, &new.all_of);
    for (key, value) in &new.extra {
        result.extra.insert(key.clone(), value.clone());
    }

    result.defs = merge_defs(old, new);
    result.properties = merge_properties(old, new);
    result.items = merge_items(old, new);
    result.required = merge_required(old, new);
    result
}

fn overlay<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if let Some(source) = source {
        *target = Some(source.clone());
    }
}

/// Union of both `required` lists in first-seen order; `None` when empty.
pub fn merge_required(old: &SchemaNode, new: &SchemaNode) -> Option<Vec<String>> {
    let mut merged: Vec<String> = Vec::new();
    for name in old.required.iter().chain(new.required.iter()).flatten() {
        if !merged.contains(name) {
            merged.push(name.clone());
        }
    }
    (!merged.is_empty()).then_some(merged)
}

/// Definitions of both sides, `new` replacing `old` by name; `None` when empty.
pub fn merge_defs(old: &SchemaNode, new: &SchemaNode) -> Option<Definitions> {
    let mut merged = old.defs.clone().unwrap_or_default();
    for (name, definition) in new.defs.iter().flatten() {
        merged.insert(name.clone(), definition.clone());
    }
    (!merged.is_empty()).then_some(merged)
}

pub fn merge_items(old: &SchemaNode, new: &SchemaNode) -> Option<Items> {
    let (old_items, new_items) = match (&old.items, &new.items) {
        (Some(old_items), Some(new_items)) => (old_items, new_items),
        (old_items, new_items) => return new_items.clone().or_else(|| old_items.clone()),
    };

    match (old_items, new_items) {
        (Items::Tuple(old_tuple), Items::Tuple(new_tuple)) => Some(Items::Tuple(
            new_tuple
                .iter()
                .enumerate()
                .map(|(index, item)| match old_tuple.get(index) {
                    Some(old_item) => merge(old_item, item),
                    None => item.clone(),
                })
                .collect(),
        )),
        (Items::Single(old_item), Items::Single(new_item)) => {
            Some(Items::Single(Box::new(merge(old_item, new_item))))
        }
        (_, new_items) => Some(new_items.clone()),
    }
}

/// Old properties in their order, each merged with its new counterpart,
/// followed by properties only the new side declares.
pub fn merge_properties(
    old: &SchemaNode,
    new: &SchemaNode,
) -> Option<IndexMap<String, SchemaNode>> {
    let (old_properties, new_properties) = match (&old.properties, &new.properties) {
        (Some(old_properties), Some(new_properties)) => (old_properties, new_properties),
        (old_properties, new_properties) => {
            return new_properties.clone().or_else(|| old_properties.clone());
        }
    };

    let mut merged = old_properties.clone();
    for (key, new_value) in new_properties {
        let value = match old_properties.get(key) {
            Some(old_value) => merge(old_value, new_value),
            None => new_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    Some(merged)
}
