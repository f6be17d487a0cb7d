//! Merge error types
//!
//! Every conflict the merge engine cannot resolve from the supplied rules is
//! reported here; nothing is resolved silently.

use fm_artifact::{ArtifactId, ArtifactIdError};
use fm_model::{ExtensionType, ModelError};
use std::fmt;

/// Merge errors
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Two versions of the same artifact and no override rule matched
    #[error(
        "artifact clash between '{existing}' and '{incoming}': no override rule matches; \
         add a rule of the form '{rule_hint}'"
    )]
    ArtifactClash {
        existing: ArtifactId,
        incoming: ArtifactId,
        rule_hint: String,
    },

    /// Configuration PID present on both sides under `FAIL_ON_CLASH`
    #[error("configuration clash for '{pid}': already provided by [{existing}], also provided by '{feature}'")]
    ConfigurationClash {
        pid: String,
        existing: OriginList,
        feature: ArtifactId,
    },

    /// Same configuration property with different values under `FAIL_ON_PROPERTY_CLASH`
    #[error("configuration property clash for '{pid}' key '{key}': '{existing}' vs '{incoming}' from '{feature}'")]
    ConfigurationPropertyClash {
        pid: String,
        key: String,
        existing: String,
        incoming: String,
        feature: ArtifactId,
    },

    /// Variable or framework property with different values and no override
    #[error("{kind} clash for '{key}': '{existing}' vs '{incoming}' from '{feature}'")]
    PropertyClash {
        kind: PropertyKind,
        key: String,
        existing: String,
        incoming: String,
        feature: ArtifactId,
    },

    /// Same extension name with different payload kinds
    #[error("extension '{name}' type mismatch: target is {existing}, source is {incoming}")]
    ExtensionTypeMismatch {
        name: String,
        existing: ExtensionType,
        incoming: ExtensionType,
    },

    /// JSON values of different shapes at the same position
    #[error("JSON type mismatch in extension '{extension}' at '{path}': {existing} vs {incoming}")]
    JsonTypeMismatch {
        extension: String,
        path: String,
        existing: &'static str,
        incoming: &'static str,
    },

    /// `${name}` with no override and no variable
    #[error("undefined variable '{name}' in '{value}'")]
    UndefinedVariable { name: String, value: String },

    /// Override rule string could not be parsed
    #[error("invalid artifact override rule '{0}': expected group:artifact[:type[:classifier]]:POLICY")]
    InvalidOverrideRule(String),

    /// Unknown configuration merge policy keyword
    #[error("invalid configuration merge policy '{0}'")]
    InvalidConfigurationPolicy(String),

    /// Configuration PID pattern could not be compiled
    #[error("invalid configuration pattern '{pattern}': {source}")]
    InvalidConfigurationPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Failure reported by a pluggable handler
    #[error("handler '{handler}' failed: {message}")]
    Handler { handler: String, message: String },

    /// Model construction error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Invalid coordinate
    #[error(transparent)]
    ArtifactId(#[from] ArtifactIdError),
}

impl MergeError {
    /// Create handler failure
    #[inline]
    #[must_use]
    pub fn handler(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            handler: handler.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for merge operations
pub type MergeResult<T> = Result<T, MergeError>;

/// Which property table a clash occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Variable,
    FrameworkProperty,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Variable => "variable",
            Self::FrameworkProperty => "framework property",
        })
    }
}

/// Comma-separated list of feature ids for error messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginList(pub Vec<ArtifactId>);

impl fmt::Display for OriginList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}
