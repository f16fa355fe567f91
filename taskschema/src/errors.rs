#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Definition not found: {0}")]
    MissingDefinition(String),
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
    #[error("Invalid schema path: {0}")]
    InvalidSchemaPath(String),
    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),
    #[error("Unknown synthesis mode: {0}")]
    UnknownSynthesisMode(String),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

