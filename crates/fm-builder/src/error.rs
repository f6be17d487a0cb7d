//! Error types for feature assembly
//!
//! Covers:
//! - Resolution failures (missing or `final` prototypes)
//! - Structural failures (cycles, removals of absent elements)
//! - Merge conflicts and invalid settings, wrapped from lower layers

use fm_artifact::{ArtifactId, ArtifactIdError};
use fm_merge::MergeError;
use fm_model::ModelError;

/// Assembly error
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Provider has no feature for the id
    #[error("unable to find feature {0}")]
    MissingFeature(ArtifactId),

    /// A `final` feature referenced as prototype
    #[error("feature {prototype} is final and cannot be used as prototype of {feature}")]
    FinalPrototype {
        prototype: ArtifactId,
        feature: ArtifactId,
    },

    /// Prototype chain leads back to a feature still being assembled
    #[error("prototype cycle: {}", render_path(.path))]
    Cycle { path: Vec<ArtifactId> },

    /// Prototype removal names something the prototype does not have
    #[error("cannot remove {kind} {element} from prototype of {feature}: not present")]
    MissingRemoval {
        kind: &'static str,
        element: String,
        feature: ArtifactId,
    },

    /// Merge conflict
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Invalid model content
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Malformed artifact id
    #[error(transparent)]
    ArtifactId(#[from] ArtifactIdError),

    /// Unreadable YAML settings
    #[error("invalid settings: {0}")]
    SettingsYaml(#[from] serde_yaml::Error),

    /// Unreadable JSON settings
    #[error("invalid settings: {0}")]
    SettingsJson(#[from] serde_json::Error),
}

impl BuildError {
    /// Removal of an absent element
    pub(crate) fn missing_removal(
        kind: &'static str,
        element: impl ToString,
        feature: &ArtifactId,
    ) -> Self {
        Self::MissingRemoval {
            kind,
            element: element.to_string(),
            feature: feature.clone(),
        }
    }

    /// Check if the error is a merge conflict
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Merge(_))
    }
}

fn render_path(path: &[ArtifactId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for assembly
pub type BuildResult<T> = Result<T, BuildError>;
