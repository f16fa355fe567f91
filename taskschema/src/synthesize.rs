use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{
    Definitions, FieldType, Items, NodeShape, SchemaError, SchemaNode, classify,
    resolve_or_builtin,
};

const EXAMPLE_STRING: &str = "this is a string";
const EXAMPLE_TIMEZONE: &str = "Europe/London";
const EXAMPLE_TIME: &str = "12:00:00";
const EXAMPLE_HTML: &str = "<p>this is a html</p>";
const EXAMPLE_DATE: &str = "2024-01-01";
const EXAMPLE_DATE_TIME: &str = "2024-01-01T12:00:00+00:00";

/// What kind of value to produce for each leaf of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisMode {
    /// `null` everywhere.
    Nothing,
    /// The zero value of each field.
    Void,
    /// The field type name, used as a placeholder.
    #[default]
    Type,
    /// A fixed illustrative value per field type.
    Example,
}

impl SynthesisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisMode::Nothing => "nothing",
            SynthesisMode::Void => "void",
            SynthesisMode::Type => "type",
            SynthesisMode::Example => "example",
        }
    }
}

impl fmt::Display for SynthesisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SynthesisMode {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nothing" => Ok(SynthesisMode::Nothing),
            "void" => Ok(SynthesisMode::Void),
            "type" => Ok(SynthesisMode::Type),
            "example" => Ok(SynthesisMode::Example),
            other => Err(SchemaError::UnknownSynthesisMode(other.to_string())),
        }
    }
}

/// Walks a schema and produces one representative value for it.
///
/// Unions always contribute their first branch and arrays a single element.
/// A reference that is already being expanded higher up the same branch
/// produces `null`, so recursive definitions terminate.
#[derive(Debug, Clone)]
pub struct Synthesizer<'a> {
    defs: Option<&'a Definitions>,
    mode: SynthesisMode,
    today: NaiveDate,
    lenient: bool,
}

impl<'a> Synthesizer<'a> {
    pub fn new(defs: Option<&'a Definitions>, mode: SynthesisMode) -> Self {
        Self {
            defs,
            mode,
            today: chrono::Local::now().date_naive(),
            lenient: false,
        }
    }

    /// Date used for `date` fields in void mode.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// When set, a reference that cannot be resolved yields `null` for its
    /// node instead of failing the whole document.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn mode(&self) -> SynthesisMode {
        self.mode
    }

    pub fn synthesize(&self, node: &'a SchemaNode) -> Result<Value, SchemaError> {
        let mut expanding = Vec::new();
        self.node_value(node, &mut expanding)
    }

    fn node_value(
        &self,
        node: &'a SchemaNode,
        expanding: &mut Vec<&'a str>,
    ) -> Result<Value, SchemaError> {
        match node.shape() {
            NodeShape::Ref(reference) => self.ref_value(reference, expanding),
            NodeShape::Union(_, branches) => match branches.first() {
                Some(branch) => self.node_value(branch, expanding),
                None => self.leaf_value(node),
            },
            NodeShape::Array(items) => self.array_value(items, expanding),
            NodeShape::Object(properties) => {
                let mut object = Map::new();
                for (key, property) in properties {
                    object.insert(key.clone(), self.node_value(property, expanding)?);
                }
                Ok(Value::Object(object))
            }
            NodeShape::Enum(values) if self.mode == SynthesisMode::Type => {
                Ok(Value::String(enum_label(values)))
            }
            NodeShape::Enum(_) | NodeShape::Leaf => self.leaf_value(node),
        }
    }

    fn ref_value(
        &self,
        reference: &'a str,
        expanding: &mut Vec<&'a str>,
    ) -> Result<Value, SchemaError> {
        if expanding.contains(&reference) {
            tracing::debug!("Stopping recursive expansion of {}", reference);
            return Ok(Value::Null);
        }

        let target = match resolve_or_builtin(reference, self.defs) {
            Ok(target) => target,
            Err(err @ SchemaError::MissingDefinition(_)) if self.lenient => {
                tracing::warn!("Substituting null for {}: {}", reference, err);
                return Ok(Value::Null);
            }
            Err(err) => return Err(err),
        };

        expanding.push(reference);
        let value = self.node_value(target, expanding);
        expanding.pop();
        value
    }

    fn array_value(
        &self,
        items: &'a Items,
        expanding: &mut Vec<&'a str>,
    ) -> Result<Value, SchemaError> {
        match items.first() {
            Some(item) => Ok(Value::Array(vec![self.node_value(item, expanding)?])),
            None if self.mode == SynthesisMode::Type => {
                Ok(Value::String(FieldType::Array.to_string()))
            }
            None => Ok(Value::Array(Vec::new())),
        }
    }

    fn leaf_value(&self, node: &SchemaNode) -> Result<Value, SchemaError> {
        let field_type = classify(Some(node), self.defs, None);
        Ok(match self.mode {
            SynthesisMode::Nothing => Value::Null,
            SynthesisMode::Type => Value::String(field_type.to_string()),
            SynthesisMode::Void => self.void_value(field_type),
            SynthesisMode::Example => example_value(field_type),
        })
    }

    fn void_value(&self, field_type: FieldType) -> Value {
        match field_type {
            field_type if field_type.is_string_like() => json!(""),
            FieldType::Integer | FieldType::Number => json!(0),
            FieldType::Boolean => json!(false),
            FieldType::Date => json!(self.today.format("%Y-%m-%d").to_string()),
            _ => Value::Null,
        }
    }
}

fn example_value(field_type: FieldType) -> Value {
    match field_type {
        FieldType::String => json!(EXAMPLE_STRING),
        FieldType::Timezone => json!(EXAMPLE_TIMEZONE),
        FieldType::Time => json!(EXAMPLE_TIME),
        FieldType::Html => json!(EXAMPLE_HTML),
        FieldType::Integer => json!(123),
        FieldType::Number => json!(123.456),
        FieldType::Boolean => json!(true),
        FieldType::Date => json!(EXAMPLE_DATE),
        FieldType::DateTime => json!(EXAMPLE_DATE_TIME),
        _ => Value::Null,
    }
}

fn enum_label(values: &[Value]) -> String {
    if values.is_empty() {
        return FieldType::String.to_string();
    }
    values
        .iter()
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Produces a value for `node` in the given mode. Fails only when a
/// reference cannot be resolved.
pub fn synthesize(
    node: &SchemaNode,
    defs: Option<&Definitions>,
    mode: SynthesisMode,
) -> Result<Value, SchemaError> {
    Synthesizer::new(defs, mode).synthesize(node)
}

/// Initial value for a task input or output editor, using the schema's own
/// `$defs`. Only object and array schemas produce a value: `properties`
/// give an object even when the node also carries a union or `$ref`, and
/// `items` give a one-element array (`[]` without an item schema).
pub fn init_value_from_schema(schema: Option<&SchemaNode>, mode: SynthesisMode) -> Option<Value> {
    let schema = schema?;
    let synthesizer = Synthesizer::new(schema.defs.as_ref(), mode).lenient(true);

    let value = if let Some(properties) = &schema.properties {
        properties
            .iter()
            .map(|(key, property)| {
                synthesizer
                    .synthesize(property)
                    .map(|value| (key.clone(), value))
            })
            .collect::<Result<Map<String, Value>, SchemaError>>()
            .map(Value::Object)
    } else if let Some(items) = &schema.items {
        match items.first() {
            Some(item) => synthesizer.synthesize(item).map(|value| Value::Array(vec![value])),
            None => Ok(Value::Array(Vec::new())),
        }
    } else {
        return None;
    };

    value
        .inspect_err(|err| tracing::warn!("Failed to initialize value from schema: {}", err))
        .ok()
}

/// Clears a previously produced output while keeping its keys: strings
/// become empty, numbers zero, booleans false, arrays empty.
pub fn reset_value(value: &Value) -> Option<Value> {
    let Value::Object(object) = value else {
        return None;
    };

    let reset = object
        .iter()
        .map(|(key, field)| {
            let cleared = match field {
                Value::String(_) => json!(""),
                Value::Number(_) => json!(0),
                Value::Bool(_) => json!(false),
                Value::Array(_) => json!([]),
                Value::Object(_) => reset_value(field).unwrap_or(Value::Null),
                Value::Null => Value::Null,
            };
            (key.clone(), cleared)
        })
        .collect();
    Some(Value::Object(reset))
}
