//! Requirements and capabilities
//!
//! Both are namespace-scoped records with typed attributes and string
//! directives. Two records are equal if all three parts are equal.

use indexmap::IndexMap;

/// Namespace-scoped record shared by requirements and capabilities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    namespace: String,
    attributes: IndexMap<String, serde_json::Value>,
    directives: IndexMap<String, String>,
}

/// Requirement declared by a feature
pub type Requirement = Descriptor;

/// Capability provided by a feature
pub type Capability = Descriptor;

impl Descriptor {
    /// Create record with no attributes or directives
    #[inline]
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            attributes: IndexMap::new(),
            directives: IndexMap::new(),
        }
    }

    /// Namespace
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Attributes
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, serde_json::Value> {
        &self.attributes
    }

    /// Directives
    #[inline]
    #[must_use]
    pub fn directives(&self) -> &IndexMap<String, String> {
        &self.directives
    }

    /// Builder-style attribute
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder-style directive
    #[must_use]
    pub fn with_directive(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.directives.insert(key.into(), value.into());
        self
    }
}

/// Append `item` unless an equal record is already present
pub(crate) fn add_unique(list: &mut Vec<Descriptor>, item: Descriptor) -> bool {
    if list.contains(&item) {
        return false;
    }
    list.push(item);
    true
}
