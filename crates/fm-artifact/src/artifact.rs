//! Artifacts referenced by a feature
//!
//! An [`Artifact`] is an [`ArtifactId`] plus metadata. The metadata keys with
//! merge semantics (start order, aliases, feature origins) are typed fields;
//! everything else lives in an ordered string map.

use crate::id::{ArtifactId, ArtifactIdError};
use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

/// Metadata key for the bundle start order
pub const KEY_START_ORDER: &str = "start-order";

/// Metadata key for comma-separated alias ids
pub const KEY_ALIAS: &str = "alias";

/// Metadata key for comma-separated feature origins
pub const KEY_FEATURE_ORIGINS: &str = "feature-origins";

/// Artifact with metadata
///
/// # Identity
/// Equality and hashing use the id only; metadata, aliases, start order
/// and origins are not part of identity.
#[derive(Debug, Clone)]
pub struct Artifact {
    id: ArtifactId,
    start_order: u32,
    aliases: Vec<ArtifactId>,
    feature_origins: Vec<ArtifactId>,
    metadata: IndexMap<String, String>,
}

impl Artifact {
    /// Create artifact with empty metadata
    #[inline]
    #[must_use]
    pub fn new(id: ArtifactId) -> Self {
        Self {
            id,
            start_order: 0,
            aliases: Vec::new(),
            feature_origins: Vec::new(),
            metadata: IndexMap::new(),
        }
    }

    /// Create artifact from a reader-supplied metadata map
    ///
    /// The keys `start-order`, `alias` and `feature-origins` are parsed into
    /// their typed fields; all other entries are kept verbatim in order.
    /// Alias entries may omit the version (`group:artifact`), in which case
    /// the artifact's own version is used.
    ///
    /// # Errors
    /// Returns error if the start order is not a non-negative integer or an
    /// alias/origin entry is not a valid coordinate.
    pub fn from_metadata<I, K, V>(id: ArtifactId, entries: I) -> Result<Self, ArtifactError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut artifact = Self::new(id);
        for (key, value) in entries {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                KEY_START_ORDER => {
                    artifact.start_order = value
                        .trim()
                        .parse()
                        .map_err(|_| ArtifactError::InvalidStartOrder(value.clone()))?;
                }
                KEY_ALIAS => {
                    for alias in split_list(&value) {
                        artifact.add_alias(artifact.parse_alias(alias)?);
                    }
                }
                KEY_FEATURE_ORIGINS => {
                    for origin in split_list(&value) {
                        artifact.add_feature_origin(ArtifactId::parse(origin)?);
                    }
                }
                _ => {
                    artifact.metadata.insert(key, value);
                }
            }
        }
        Ok(artifact)
    }

    fn parse_alias(&self, alias: &str) -> Result<ArtifactId, ArtifactIdError> {
        if alias.matches(':').count() == 1 {
            ArtifactId::from_mvn_id(&format!("{alias}:{}", self.id.version()))
        } else {
            ArtifactId::parse(alias)
        }
    }

    /// Artifact coordinate
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    /// Detached copy under a new id with identical metadata
    #[inline]
    #[must_use]
    pub fn copy(&self, id: ArtifactId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// Start order (`0` means unset)
    #[inline]
    #[must_use]
    pub fn start_order(&self) -> u32 {
        self.start_order
    }

    /// Set start order (`0` clears it)
    #[inline]
    pub fn set_start_order(&mut self, start_order: u32) {
        self.start_order = start_order;
    }

    /// Builder-style start order
    #[inline]
    #[must_use]
    pub fn with_start_order(mut self, start_order: u32) -> Self {
        self.start_order = start_order;
        self
    }

    /// Aliases that make other coordinates equivalent to this one
    #[inline]
    #[must_use]
    pub fn aliases(&self) -> &[ArtifactId] {
        &self.aliases
    }

    /// Add alias (no-op if already present)
    pub fn add_alias(&mut self, alias: ArtifactId) {
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
    }

    /// Builder-style alias
    #[inline]
    #[must_use]
    pub fn with_alias(mut self, alias: ArtifactId) -> Self {
        self.add_alias(alias);
        self
    }

    /// Own id followed by all aliases
    pub fn ids(&self) -> impl Iterator<Item = &ArtifactId> {
        std::iter::once(&self.id).chain(self.aliases.iter())
    }

    /// Whether `other` denotes the same artifact, ignoring versions
    ///
    /// True if this artifact's id or any alias is the same as `other`'s
    /// id, or any of `other`'s aliases is the same as this artifact's id.
    #[must_use]
    pub fn is_same_artifact(&self, other: &Self) -> bool {
        self.ids().any(|id| id.is_same(&other.id))
            || other.aliases.iter().any(|alias| alias.is_same(&self.id))
    }

    /// Features that contributed this artifact, in merge order
    #[inline]
    #[must_use]
    pub fn feature_origins(&self) -> &[ArtifactId] {
        &self.feature_origins
    }

    /// Append a feature origin (no-op if already recorded)
    pub fn add_feature_origin(&mut self, origin: ArtifactId) {
        if !self.feature_origins.contains(&origin) {
            self.feature_origins.push(origin);
        }
    }

    /// Replace all feature origins
    pub fn set_feature_origins(&mut self, origins: impl IntoIterator<Item = ArtifactId>) {
        self.feature_origins.clear();
        for origin in origins {
            self.add_feature_origin(origin);
        }
    }

    /// Builder-style feature origin
    #[inline]
    #[must_use]
    pub fn with_feature_origin(mut self, origin: ArtifactId) -> Self {
        self.add_feature_origin(origin);
        self
    }

    /// Free-form metadata (recognized keys excluded)
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &IndexMap<String, String> {
        &self.metadata
    }

    /// Mutable free-form metadata
    #[inline]
    pub fn metadata_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.metadata
    }

    /// Full metadata as a string map, recognized keys included
    ///
    /// Inverse of [`Artifact::from_metadata`]; unset typed fields are
    /// omitted.
    #[must_use]
    pub fn metadata_view(&self) -> IndexMap<String, String> {
        let mut view = self.metadata.clone();
        if self.start_order > 0 {
            view.insert(KEY_START_ORDER.to_string(), self.start_order.to_string());
        }
        if !self.aliases.is_empty() {
            view.insert(KEY_ALIAS.to_string(), join_ids(&self.aliases));
        }
        if !self.feature_origins.is_empty() {
            view.insert(
                KEY_FEATURE_ORIGINS.to_string(),
                join_ids(&self.feature_origins),
            );
        }
        view
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn join_ids(ids: &[ArtifactId]) -> String {
    ids.iter()
        .map(ArtifactId::to_mvn_id)
        .collect::<Vec<_>>()
        .join(",")
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Artifact {}

impl Hash for Artifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<ArtifactId> for Artifact {
    fn from(id: ArtifactId) -> Self {
        Self::new(id)
    }
}

/// Errors related to artifact metadata
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactError {
    /// Start order is not a non-negative integer
    #[error("invalid start order: '{0}'")]
    InvalidStartOrder(String),

    /// Invalid coordinate in alias or origin metadata
    #[error(transparent)]
    InvalidId(#[from] ArtifactIdError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ArtifactId {
        ArtifactId::parse(s).unwrap()
    }

    #[test]
    fn artifact_equality_ignores_metadata() {
        let a = Artifact::new(id("g:a:1")).with_start_order(5);
        let b = Artifact::new(id("g:a:1"));
        assert_eq!(a, b);
        assert_ne!(a, Artifact::new(id("g:a:2")));
    }

    #[test]
    fn artifact_from_metadata_recognized_keys() {
        let artifact = Artifact::from_metadata(
            id("g:a:1.0"),
            [
                ("start-order", "20"),
                ("alias", "g:old, x:y:2.0"),
                ("feature-origins", "g:f1:1,g:f2:1"),
                ("custom", "value"),
            ],
        )
        .unwrap();

        assert_eq!(artifact.start_order(), 20);
        assert_eq!(artifact.aliases(), &[id("g:old:1.0"), id("x:y:2.0")]);
        assert_eq!(artifact.feature_origins(), &[id("g:f1:1"), id("g:f2:1")]);
        assert_eq!(artifact.metadata().get("custom").map(String::as_str), Some("value"));
        assert!(!artifact.metadata().contains_key("start-order"));
    }

    #[test]
    fn artifact_from_metadata_rejects_bad_start_order() {
        let result = Artifact::from_metadata(id("g:a:1"), [("start-order", "-1")]);
        assert!(matches!(result, Err(ArtifactError::InvalidStartOrder(_))));
    }

    #[test]
    fn artifact_metadata_view_round_trip() {
        let original = Artifact::new(id("g:a:1"))
            .with_start_order(3)
            .with_alias(id("g:b:1"))
            .with_feature_origin(id("g:f:1"));
        let view = original.metadata_view();
        let back = Artifact::from_metadata(id("g:a:1"), view).unwrap();
        assert_eq!(back.start_order(), 3);
        assert_eq!(back.aliases(), original.aliases());
        assert_eq!(back.feature_origins(), original.feature_origins());
    }

    #[test]
    fn artifact_is_same_through_aliases() {
        let a = Artifact::new(id("g:new:2")).with_alias(id("g:old:1"));
        let b = Artifact::new(id("g:old:1.5"));
        assert!(a.is_same_artifact(&b));
        assert!(b.is_same_artifact(&a));
        assert!(!a.is_same_artifact(&Artifact::new(id("g:other:1"))));
    }

    #[test]
    fn artifact_copy_keeps_metadata() {
        let mut a = Artifact::new(id("g:a:1")).with_start_order(7);
        a.metadata_mut().insert("k".into(), "v".into());
        let copy = a.copy(id("g:a:2"));
        assert_eq!(copy.id(), &id("g:a:2"));
        assert_eq!(copy.start_order(), 7);
        assert_eq!(copy.metadata().get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn artifact_feature_origins_deduplicate() {
        let mut a = Artifact::new(id("g:a:1"));
        a.add_feature_origin(id("g:f:1"));
        a.add_feature_origin(id("g:f:1"));
        a.add_feature_origin(id("g:e:1"));
        assert_eq!(a.feature_origins(), &[id("g:f:1"), id("g:e:1")]);
    }
}
