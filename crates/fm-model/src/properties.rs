//! Framework properties and variables
//!
//! Both are ordered string maps whose entries additionally carry free-form
//! metadata and the features they came from.

use fm_artifact::ArtifactId;
use indexmap::IndexMap;

/// Single property entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Property {
    value: String,
    metadata: IndexMap<String, serde_json::Value>,
    feature_origins: Vec<ArtifactId>,
}

impl Property {
    /// Create entry without metadata
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Property value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace value, keeping metadata and origins
    #[inline]
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Free-form metadata
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &IndexMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Mutable metadata
    #[inline]
    pub fn metadata_mut(&mut self) -> &mut IndexMap<String, serde_json::Value> {
        &mut self.metadata
    }

    /// Features that contributed this entry
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

    /// Builder-style feature origin
    #[inline]
    #[must_use]
    pub fn with_feature_origin(mut self, origin: ArtifactId) -> Self {
        self.add_feature_origin(origin);
        self
    }
}

/// Ordered property map
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyMap {
    entries: IndexMap<String, Property>,
}

impl PropertyMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(Property::value)
    }

    /// Full entry by key
    #[inline]
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&Property> {
        self.entries.get(key)
    }

    /// Mutable entry by key
    #[inline]
    pub fn entry_mut(&mut self, key: &str) -> Option<&mut Property> {
        self.entries.get_mut(key)
    }

    /// Set value, returning the previous one
    ///
    /// An existing entry keeps its metadata and origins and its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.get_mut(&key) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
            None => {
                self.entries.insert(key, Property::new(value));
                None
            }
        }
    }

    /// Set full entry, replacing any existing one in place
    pub fn insert_property(&mut self, key: impl Into<String>, property: Property) -> Option<Property> {
        self.entries.insert(key.into(), property)
    }

    /// Builder-style value
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Remove entry, preserving the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<Property> {
        self.entries.shift_remove(key)
    }

    /// Whether the key is present
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Key/value pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p.value()))
    }

    /// Key/entry pairs in order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    /// Mutable key/entry pairs in order
    pub fn entries_mut(&mut self) -> impl Iterator<Item = (&str, &mut Property)> {
        self.entries.iter_mut().map(|(k, p)| (k.as_str(), p))
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_keeps_position_and_metadata() {
        let mut map = PropertyMap::new().with("a", "1").with("b", "2");
        map.entry_mut("a")
            .unwrap()
            .metadata_mut()
            .insert("doc".into(), serde_json::json!("first"));

        assert_eq!(map.insert("a", "3"), Some("1".to_string()));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some("3"));
        assert_eq!(
            map.entry("a").unwrap().metadata().get("doc"),
            Some(&serde_json::json!("first"))
        );
    }

    #[test]
    fn remove_preserves_order() {
        let mut map: PropertyMap = [("x", "1"), ("y", "2"), ("z", "3")].into_iter().collect();
        assert!(map.remove("y").is_some());
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("x", "1"), ("z", "3")]);
    }
}
