//! Error types for the feature model
//!
//! Covers invalid input shapes detected while building model objects:
//! - configuration identifiers and property values
//! - extension names and JSON payloads

use fm_artifact::{ArtifactError, ArtifactIdError};

/// Model construction errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Configuration PID is empty
    #[error("configuration pid must not be empty")]
    EmptyPid,

    /// Factory PID or instance name is empty or contains the separator
    #[error("invalid factory configuration: factory pid '{factory_pid}', name '{name}'")]
    InvalidFactoryPid { factory_pid: String, name: String },

    /// Array property mixes value types
    #[error("configuration array must be homogeneous: {0}")]
    HeterogeneousArray(String),

    /// Value cannot be represented as a configuration value
    #[error("unsupported configuration value: {0}")]
    UnsupportedValue(String),

    /// Extension name is empty
    #[error("extension name must not be empty")]
    EmptyExtensionName,

    /// Extension with the same name already present
    #[error("duplicate extension: '{0}'")]
    DuplicateExtension(String),

    /// JSON extension payload is not an object or array
    #[error("JSON extension content must be an object or array, got {0}")]
    JsonNotStructured(&'static str),

    /// JSON extension text failed to parse
    #[error("invalid JSON extension content: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Invalid artifact coordinate
    #[error(transparent)]
    ArtifactId(#[from] ArtifactIdError),

    /// Invalid artifact metadata
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Human-readable kind of a JSON value
#[must_use]
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
