//! Feature lookup
//!
//! The assembler never reads features on its own; every prototype is
//! fetched through a [`FeatureProvider`] supplied by the caller.

use fm_artifact::ArtifactId;
use fm_model::Feature;
use std::collections::HashMap;

pub use fm_merge::ArtifactProvider;

/// Resolves features by id
pub trait FeatureProvider: Send + Sync {
    /// Feature with exactly this id, if known
    fn provide(&self, id: &ArtifactId) -> Option<Feature>;
}

impl<F> FeatureProvider for F
where
    F: Fn(&ArtifactId) -> Option<Feature> + Send + Sync,
{
    fn provide(&self, id: &ArtifactId) -> Option<Feature> {
        self(id)
    }
}

/// In-memory provider backed by a map
#[derive(Debug, Clone, Default)]
pub struct MapFeatureProvider {
    features: HashMap<ArtifactId, Feature>,
}

impl MapFeatureProvider {
    /// Create empty provider
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature under its own id, replacing any previous one
    pub fn insert(&mut self, feature: Feature) -> Option<Feature> {
        self.features.insert(feature.id().clone(), feature)
    }

    /// With feature
    #[must_use]
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.insert(feature);
        self
    }

    /// Number of known features
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FeatureProvider for MapFeatureProvider {
    fn provide(&self, id: &ArtifactId) -> Option<Feature> {
        self.features.get(id).cloned()
    }
}

impl From<HashMap<ArtifactId, Feature>> for MapFeatureProvider {
    fn from(features: HashMap<ArtifactId, Feature>) -> Self {
        Self { features }
    }
}

impl FromIterator<Feature> for MapFeatureProvider {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut provider = Self::new();
        for feature in iter {
            provider.insert(feature);
        }
        provider
    }
}

/// Features at hand first, then a fallback provider
pub(crate) struct LocalFirst<'a> {
    local: &'a [Feature],
    fallback: &'a dyn FeatureProvider,
}

impl<'a> LocalFirst<'a> {
    pub(crate) fn new(local: &'a [Feature], fallback: &'a dyn FeatureProvider) -> Self {
        Self { local, fallback }
    }
}

impl FeatureProvider for LocalFirst<'_> {
    fn provide(&self, id: &ArtifactId) -> Option<Feature> {
        self.local
            .iter()
            .find(|feature| feature.id() == id)
            .cloned()
            .or_else(|| self.fallback.provide(id))
    }
}
