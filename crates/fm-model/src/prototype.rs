//! Prototype references
//!
//! A feature may name a prototype feature it extends, together with the
//! entries to strip from the prototype before its own content is layered
//! on top.

use crate::requirement::{Capability, Requirement};
use fm_artifact::ArtifactId;
use indexmap::IndexMap;

/// Prototype reference with removal instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prototype {
    id: ArtifactId,
    bundle_removals: Vec<ArtifactId>,
    configuration_removals: Vec<String>,
    framework_property_removals: Vec<String>,
    extension_removals: Vec<String>,
    artifact_extension_removals: IndexMap<String, Vec<ArtifactId>>,
    requirement_removals: Vec<Requirement>,
    capability_removals: Vec<Capability>,
}

impl Prototype {
    /// Reference a prototype without removals
    #[must_use]
    pub fn new(id: ArtifactId) -> Self {
        Self {
            id,
            bundle_removals: Vec::new(),
            configuration_removals: Vec::new(),
            framework_property_removals: Vec::new(),
            extension_removals: Vec::new(),
            artifact_extension_removals: IndexMap::new(),
            requirement_removals: Vec::new(),
            capability_removals: Vec::new(),
        }
    }

    /// Prototype feature id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    /// Bundles to remove, matched ignoring version
    #[inline]
    #[must_use]
    pub fn bundle_removals(&self) -> &[ArtifactId] {
        &self.bundle_removals
    }

    /// Configuration removals
    ///
    /// A plain PID removes the configuration; `pid@key` removes only that
    /// property.
    #[inline]
    #[must_use]
    pub fn configuration_removals(&self) -> &[String] {
        &self.configuration_removals
    }

    /// Framework property keys to remove
    #[inline]
    #[must_use]
    pub fn framework_property_removals(&self) -> &[String] {
        &self.framework_property_removals
    }

    /// Extension names to remove entirely
    #[inline]
    #[must_use]
    pub fn extension_removals(&self) -> &[String] {
        &self.extension_removals
    }

    /// Artifacts to remove from named artifact extensions
    #[inline]
    #[must_use]
    pub fn artifact_extension_removals(&self) -> &IndexMap<String, Vec<ArtifactId>> {
        &self.artifact_extension_removals
    }

    /// Requirements to remove
    #[inline]
    #[must_use]
    pub fn requirement_removals(&self) -> &[Requirement] {
        &self.requirement_removals
    }

    /// Capabilities to remove
    #[inline]
    #[must_use]
    pub fn capability_removals(&self) -> &[Capability] {
        &self.capability_removals
    }

    /// Remove a bundle
    #[must_use]
    pub fn with_bundle_removal(mut self, id: ArtifactId) -> Self {
        self.bundle_removals.push(id);
        self
    }

    /// Remove a configuration (`pid`) or one of its properties (`pid@key`)
    #[must_use]
    pub fn with_configuration_removal(mut self, entry: impl Into<String>) -> Self {
        self.configuration_removals.push(entry.into());
        self
    }

    /// Remove a framework property
    #[must_use]
    pub fn with_framework_property_removal(mut self, key: impl Into<String>) -> Self {
        self.framework_property_removals.push(key.into());
        self
    }

    /// Remove an extension
    #[must_use]
    pub fn with_extension_removal(mut self, name: impl Into<String>) -> Self {
        self.extension_removals.push(name.into());
        self
    }

    /// Remove an artifact from an artifacts extension
    #[must_use]
    pub fn with_artifact_extension_removal(
        mut self,
        extension: impl Into<String>,
        id: ArtifactId,
    ) -> Self {
        self.artifact_extension_removals
            .entry(extension.into())
            .or_default()
            .push(id);
        self
    }

    /// Remove a requirement
    #[must_use]
    pub fn with_requirement_removal(mut self, requirement: Requirement) -> Self {
        self.requirement_removals.push(requirement);
        self
    }

    /// Remove a capability
    #[must_use]
    pub fn with_capability_removal(mut self, capability: Capability) -> Self {
        self.capability_removals.push(capability);
        self
    }
}

/// Split a configuration removal into PID and optional property key
///
/// ```rust
/// use fm_model::split_configuration_removal;
///
/// assert_eq!(split_configuration_removal("a.b"), ("a.b", None));
/// assert_eq!(split_configuration_removal("a.b@key"), ("a.b", Some("key")));
/// ```
#[must_use]
pub fn split_configuration_removal(entry: &str) -> (&str, Option<&str>) {
    match entry.split_once('@') {
        Some((pid, key)) if !key.is_empty() => (pid, Some(key)),
        Some((pid, _)) => (pid, None),
        None => (entry, None),
    }
}
