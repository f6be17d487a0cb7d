//! The feature aggregate
//!
//! A [`Feature`] is the declarative description of part of an application:
//! bundles, configurations, framework properties, variables, requirements,
//! capabilities, extensions and an optional prototype reference.
//!
//! # Lifecycle
//!
//! Features read from a source start out with `assembled == false`. The
//! builder produces a new feature with `assembled == true`, no prototype,
//! and provenance recorded on every contained entry.

use crate::configuration::ConfigurationCollection;
use crate::extension::Extensions;
use crate::properties::PropertyMap;
use crate::prototype::Prototype;
use crate::requirement::{add_unique, Capability, Requirement};
use fm_artifact::{ArtifactCollection, ArtifactId};

/// Feature description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    id: ArtifactId,

    title: Option<String>,
    description: Option<String>,
    vendor: Option<String>,
    license: Option<String>,
    doc_url: Option<String>,
    scm_info: Option<String>,
    categories: Vec<String>,

    bundles: ArtifactCollection,
    configurations: ConfigurationCollection,
    framework_properties: PropertyMap,
    variables: PropertyMap,
    requirements: Vec<Requirement>,
    capabilities: Vec<Capability>,
    extensions: Extensions,
    prototype: Option<Prototype>,

    is_final: bool,
    complete: bool,
    assembled: bool,
}

impl Feature {
    /// Create an empty, unassembled feature
    #[must_use]
    pub fn new(id: ArtifactId) -> Self {
        Self {
            id,
            title: None,
            description: None,
            vendor: None,
            license: None,
            doc_url: None,
            scm_info: None,
            categories: Vec::new(),
            bundles: ArtifactCollection::new(),
            configurations: ConfigurationCollection::new(),
            framework_properties: PropertyMap::new(),
            variables: PropertyMap::new(),
            requirements: Vec::new(),
            capabilities: Vec::new(),
            extensions: Extensions::new(),
            prototype: None,
            is_final: false,
            complete: false,
            assembled: false,
        }
    }

    /// Detached deep copy under a new id
    #[must_use]
    pub fn copy_with_id(&self, id: ArtifactId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// Feature id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    /// Title
    #[inline]
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set title
    #[inline]
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    /// Description
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Set description
    #[inline]
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Vendor
    #[inline]
    #[must_use]
    pub fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref()
    }

    /// Set vendor
    #[inline]
    pub fn set_vendor(&mut self, vendor: Option<String>) {
        self.vendor = vendor;
    }

    /// License
    #[inline]
    #[must_use]
    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    /// Set license
    #[inline]
    pub fn set_license(&mut self, license: Option<String>) {
        self.license = license;
    }

    /// Documentation URL
    #[inline]
    #[must_use]
    pub fn doc_url(&self) -> Option<&str> {
        self.doc_url.as_deref()
    }

    /// Set documentation URL
    #[inline]
    pub fn set_doc_url(&mut self, doc_url: Option<String>) {
        self.doc_url = doc_url;
    }

    /// Source control information
    #[inline]
    #[must_use]
    pub fn scm_info(&self) -> Option<&str> {
        self.scm_info.as_deref()
    }

    /// Set source control information
    #[inline]
    pub fn set_scm_info(&mut self, scm_info: Option<String>) {
        self.scm_info = scm_info;
    }

    /// Categories
    #[inline]
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Mutable categories
    #[inline]
    pub fn categories_mut(&mut self) -> &mut Vec<String> {
        &mut self.categories
    }

    /// Builder-style title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder-style description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Bundles in start-relevant order
    #[inline]
    #[must_use]
    pub fn bundles(&self) -> &ArtifactCollection {
        &self.bundles
    }

    /// Mutable bundles
    #[inline]
    pub fn bundles_mut(&mut self) -> &mut ArtifactCollection {
        &mut self.bundles
    }

    /// Configurations
    #[inline]
    #[must_use]
    pub fn configurations(&self) -> &ConfigurationCollection {
        &self.configurations
    }

    /// Mutable configurations
    #[inline]
    pub fn configurations_mut(&mut self) -> &mut ConfigurationCollection {
        &mut self.configurations
    }

    /// Framework properties
    #[inline]
    #[must_use]
    pub fn framework_properties(&self) -> &PropertyMap {
        &self.framework_properties
    }

    /// Mutable framework properties
    #[inline]
    pub fn framework_properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.framework_properties
    }

    /// Variables
    #[inline]
    #[must_use]
    pub fn variables(&self) -> &PropertyMap {
        &self.variables
    }

    /// Mutable variables
    #[inline]
    pub fn variables_mut(&mut self) -> &mut PropertyMap {
        &mut self.variables
    }

    /// Requirements
    #[inline]
    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Add requirement unless an equal one exists
    pub fn add_requirement(&mut self, requirement: Requirement) -> bool {
        add_unique(&mut self.requirements, requirement)
    }

    /// Remove all requirements equal to `requirement`
    pub fn remove_requirement(&mut self, requirement: &Requirement) -> bool {
        let before = self.requirements.len();
        self.requirements.retain(|r| r != requirement);
        self.requirements.len() != before
    }

    /// Capabilities
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Add capability unless an equal one exists
    pub fn add_capability(&mut self, capability: Capability) -> bool {
        add_unique(&mut self.capabilities, capability)
    }

    /// Remove all capabilities equal to `capability`
    pub fn remove_capability(&mut self, capability: &Capability) -> bool {
        let before = self.capabilities.len();
        self.capabilities.retain(|c| c != capability);
        self.capabilities.len() != before
    }

    /// Extensions
    #[inline]
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable extensions
    #[inline]
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Prototype reference
    #[inline]
    #[must_use]
    pub fn prototype(&self) -> Option<&Prototype> {
        self.prototype.as_ref()
    }

    /// Set or clear the prototype reference
    #[inline]
    pub fn set_prototype(&mut self, prototype: Option<Prototype>) {
        self.prototype = prototype;
    }

    /// Builder-style prototype
    #[must_use]
    pub fn with_prototype(mut self, prototype: Prototype) -> Self {
        self.prototype = Some(prototype);
        self
    }

    /// Whether the feature may not be used as a prototype
    #[inline]
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Mark as final
    #[inline]
    pub fn set_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }

    /// Whether all dependencies are contained in the feature
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Mark as complete
    #[inline]
    pub fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    /// Whether the feature is the output of assembly
    #[inline]
    #[must_use]
    pub fn is_assembled(&self) -> bool {
        self.assembled
    }

    /// Mark as assembled
    #[inline]
    pub fn set_assembled(&mut self, assembled: bool) {
        self.assembled = assembled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Configuration;
    use crate::extension::{Extension, ExtensionState};
    use fm_artifact::Artifact;

    fn id(s: &str) -> ArtifactId {
        ArtifactId::parse(s).unwrap()
    }

    #[test]
    fn new_feature_is_empty_and_unassembled() {
        let f = Feature::new(id("g:f:1"));
        assert!(f.bundles().is_empty());
        assert!(f.configurations().is_empty());
        assert!(!f.is_assembled());
        assert!(!f.is_final());
        assert!(!f.is_complete());
        assert!(f.prototype().is_none());
    }

    #[test]
    fn copy_with_id_is_detached() {
        let mut f = Feature::new(id("g:f:1")).with_title("base");
        f.bundles_mut().add(Artifact::new(id("g:b:1")));
        f.configurations_mut()
            .add(Configuration::new("pid").unwrap().with_property("k", "v"));
        f.extensions_mut()
            .add(Extension::text("notes", ExtensionState::Optional, "x").unwrap())
            .unwrap();

        let mut copy = f.copy_with_id(id("g:f2:1"));
        copy.bundles_mut().add(Artifact::new(id("g:c:1")));
        copy.configurations_mut()
            .get_mut("pid")
            .unwrap()
            .set_property("k", "changed");

        assert_eq!(copy.id(), &id("g:f2:1"));
        assert_eq!(copy.title(), Some("base"));
        assert_eq!(f.bundles().len(), 1);
        assert_eq!(
            f.configurations().get("pid").unwrap().property("k").unwrap().as_str(),
            Some("v")
        );
    }

    #[test]
    fn requirements_are_a_set() {
        let mut f = Feature::new(id("g:f:1"));
        let req = Requirement::new("osgi.service");
        assert!(f.add_requirement(req.clone()));
        assert!(!f.add_requirement(req.clone()));
        assert!(f.remove_requirement(&req));
        assert!(f.requirements().is_empty());
    }
}
