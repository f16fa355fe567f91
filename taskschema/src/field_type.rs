use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// Semantic kind of a schema node, as the playground renders and initializes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Date,
    DateTime,
    Timezone,
    Time,
    Html,
    Image,
    Audio,
    Document,
    Null,
    Undefined,
    Unknown,
}

impl FieldType {
    pub const ALL: [FieldType; 17] = [
        FieldType::String,
        FieldType::Integer,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Array,
        FieldType::Object,
        FieldType::Date,
        FieldType::DateTime,
        FieldType::Timezone,
        FieldType::Time,
        FieldType::Html,
        FieldType::Image,
        FieldType::Audio,
        FieldType::Document,
        FieldType::Null,
        FieldType::Undefined,
        FieldType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Date => "date",
            FieldType::DateTime => "date-time",
            FieldType::Timezone => "timezone",
            FieldType::Time => "time",
            FieldType::Html => "html",
            FieldType::Image => "image",
            FieldType::Audio => "audio",
            FieldType::Document => "document",
            FieldType::Null => "null",
            FieldType::Undefined => "undefined",
            FieldType::Unknown => "unknown",
        }
    }

    /// Image, audio and document fields are backed by a file object.
    pub fn is_file(&self) -> bool {
        matches!(
            self,
            FieldType::Image | FieldType::Audio | FieldType::Document
        )
    }

    /// Kinds edited as free text, whose zero value is the empty string.
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            FieldType::String | FieldType::Timezone | FieldType::Time | FieldType::Html
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|field_type| field_type.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownFieldType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_serde() {
        for field_type in FieldType::ALL {
            let serialized = serde_json::to_value(field_type).unwrap();
            assert_eq!(serialized, serde_json::json!(field_type.as_str()));
            assert_eq!(field_type.as_str().parse::<FieldType>().unwrap(), field_type);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = "datetime".parse::<FieldType>().unwrap_err();
        assert!(matches!(err, SchemaError::UnknownFieldType(name) if name == "datetime"));
    }

    #[test]
    fn test_groups() {
        assert!(FieldType::Audio.is_file());
        assert!(!FieldType::String.is_file());
        assert!(FieldType::Html.is_string_like());
        assert!(!FieldType::Date.is_string_like());
    }
}
