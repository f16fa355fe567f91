use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FieldType, SchemaNode, SynthesisMode, Synthesizer, merge, set_field_type};

/// Identifies one schema revision of one task within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskSchemaKey {
    pub tenant: String,
    pub task_id: String,
    pub schema_id: u32,
}

impl TaskSchemaKey {
    pub fn new(tenant: impl Into<String>, task_id: impl Into<String>, schema_id: u32) -> Self {
        Self {
            tenant: tenant.into(),
            task_id: task_id.into(),
            schema_id,
        }
    }
}

/// Working schemas of the tasks currently open, keyed by task schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    schemas: HashMap<TaskSchemaKey, SchemaNode>,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TaskSchemaKey) -> Option<&SchemaNode> {
        self.schemas.get(key)
    }

    pub fn insert(&mut self, key: TaskSchemaKey, schema: SchemaNode) -> Option<SchemaNode> {
        self.schemas.insert(key, schema)
    }

    pub fn remove(&mut self, key: &TaskSchemaKey) -> Option<SchemaNode> {
        self.schemas.remove(key)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Folds a freshly extracted schema into the stored one.
    pub fn merge_extracted(&mut self, key: TaskSchemaKey, extracted: &SchemaNode) -> &SchemaNode {
        let merged = match self.schemas.get(&key) {
            Some(current) => merge(current, extracted),
            None => extracted.clone(),
        };
        tracing::debug!(
            "Merged extracted schema into {}/{}#{}",
            key.tenant,
            key.task_id,
            key.schema_id
        );
        let slot = self.schemas.entry(key).or_default();
        *slot = merged;
        slot
    }

    pub fn set_field_type(
        &mut self,
        key: &TaskSchemaKey,
        key_path: &str,
        field_type: FieldType,
    ) -> Option<&SchemaNode> {
        let schema = self.schemas.get_mut(key)?;
        *schema = set_field_type(schema, key_path, field_type);
        Some(schema)
    }

    /// Value for the stored schema; unresolved references become `null`.
    pub fn synthesize(&self, key: &TaskSchemaKey, mode: SynthesisMode) -> Option<Value> {
        let schema = self.schemas.get(key)?;
        Synthesizer::new(schema.defs.as_ref(), mode)
            .lenient(true)
            .synthesize(schema)
            .inspect_err(|err| tracing::warn!("Failed to synthesize value: {}", err))
            .ok()
    }
}
