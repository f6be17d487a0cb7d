//! Feature extensions
//!
//! An [`Extension`] is a named payload of one of three kinds: an artifact
//! list, free text, or a JSON document. The payload kind is fixed by the
//! [`ExtensionContent`] variant, so reading artifacts from a text extension
//! is not expressible.

use crate::error::{json_kind, ModelError, ModelResult};
use fm_artifact::ArtifactCollection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a launcher must treat an extension
///
/// Ordered by strength: `Transient < Optional < Required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionState {
    /// Dropped once assembly is done
    Transient,
    /// May be ignored by a launcher that does not understand it
    Optional,
    /// Must be understood by the launcher
    Required,
}

impl fmt::Display for ExtensionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transient => "transient",
            Self::Optional => "optional",
            Self::Required => "required",
        })
    }
}

/// Payload kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionType {
    Artifacts,
    Text,
    Json,
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Artifacts => "artifacts",
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// Parsed JSON document with its textual form
///
/// The value is always an object or array; the text is kept in sync on
/// every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonContent {
    value: serde_json::Value,
    text: String,
}

impl JsonContent {
    /// Wrap a structured value
    ///
    /// # Errors
    /// Returns error if the value is not an object or array.
    pub fn from_value(value: serde_json::Value) -> ModelResult<Self> {
        if !(value.is_object() || value.is_array()) {
            return Err(ModelError::JsonNotStructured(json_kind(&value)));
        }
        let text = value.to_string();
        Ok(Self { value, text })
    }

    /// Parse from text
    ///
    /// # Errors
    /// Returns error if the text is not valid JSON or not an object or
    /// array.
    pub fn from_text(text: &str) -> ModelResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parsed value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Textual form
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the value
    ///
    /// # Errors
    /// Returns error if the value is not an object or array.
    pub fn set_value(&mut self, value: serde_json::Value) -> ModelResult<()> {
        *self = Self::from_value(value)?;
        Ok(())
    }

    /// Take the parsed value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.value
    }
}

/// Extension payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionContent {
    Artifacts(ArtifactCollection),
    Text(String),
    Json(JsonContent),
}

impl ExtensionContent {
    /// Payload kind
    #[inline]
    #[must_use]
    pub fn extension_type(&self) -> ExtensionType {
        match self {
            Self::Artifacts(_) => ExtensionType::Artifacts,
            Self::Text(_) => ExtensionType::Text,
            Self::Json(_) => ExtensionType::Json,
        }
    }
}

/// Named feature extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    name: String,
    state: ExtensionState,
    content: ExtensionContent,
}

impl Extension {
    /// Create extension
    ///
    /// # Errors
    /// Returns error if the name is empty.
    pub fn new(
        name: impl Into<String>,
        state: ExtensionState,
        content: ExtensionContent,
    ) -> ModelResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::EmptyExtensionName);
        }
        Ok(Self {
            name,
            state,
            content,
        })
    }

    /// Create empty artifacts extension
    ///
    /// # Errors
    /// Returns error if the name is empty.
    pub fn artifacts(name: impl Into<String>, state: ExtensionState) -> ModelResult<Self> {
        Self::new(name, state, ExtensionContent::Artifacts(ArtifactCollection::new()))
    }

    /// Create text extension
    ///
    /// # Errors
    /// Returns error if the name is empty.
    pub fn text(
        name: impl Into<String>,
        state: ExtensionState,
        text: impl Into<String>,
    ) -> ModelResult<Self> {
        Self::new(name, state, ExtensionContent::Text(text.into()))
    }

    /// Create JSON extension from a structured value
    ///
    /// # Errors
    /// Returns error if the name is empty or the value is not an object or
    /// array.
    pub fn json(
        name: impl Into<String>,
        state: ExtensionState,
        value: serde_json::Value,
    ) -> ModelResult<Self> {
        Self::new(name, state, ExtensionContent::Json(JsonContent::from_value(value)?))
    }

    /// Extension name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension state
    #[inline]
    #[must_use]
    pub fn state(&self) -> ExtensionState {
        self.state
    }

    /// Change state
    #[inline]
    pub fn set_state(&mut self, state: ExtensionState) {
        self.state = state;
    }

    /// Payload kind
    #[inline]
    #[must_use]
    pub fn extension_type(&self) -> ExtensionType {
        self.content.extension_type()
    }

    /// Payload
    #[inline]
    #[must_use]
    pub fn content(&self) -> &ExtensionContent {
        &self.content
    }

    /// Mutable payload
    #[inline]
    pub fn content_mut(&mut self) -> &mut ExtensionContent {
        &mut self.content
    }

    /// Artifact payload, if this is an artifacts extension
    #[must_use]
    pub fn artifacts_content(&self) -> Option<&ArtifactCollection> {
        match &self.content {
            ExtensionContent::Artifacts(a) => Some(a),
            _ => None,
        }
    }

    /// Mutable artifact payload, if this is an artifacts extension
    pub fn artifacts_content_mut(&mut self) -> Option<&mut ArtifactCollection> {
        match &mut self.content {
            ExtensionContent::Artifacts(a) => Some(a),
            _ => None,
        }
    }
}

/// Name-unique ordered list of extensions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    entries: Vec<Extension>,
}

impl Extensions {
    /// Create empty list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append extension
    ///
    /// # Errors
    /// Returns error if an extension with the same name exists.
    pub fn add(&mut self, extension: Extension) -> ModelResult<()> {
        if self.contains(extension.name()) {
            return Err(ModelError::DuplicateExtension(extension.name));
        }
        self.entries.push(extension);
        Ok(())
    }

    /// Insert or replace by name, keeping the position of a replaced entry
    pub fn put(&mut self, extension: Extension) -> Option<Extension> {
        match self.position(extension.name()) {
            Some(pos) => Some(std::mem::replace(&mut self.entries[pos], extension)),
            None => {
                self.entries.push(extension);
                None
            }
        }
    }

    /// Insert at position (clamped to the end)
    ///
    /// Returns `false` if an extension with the same name exists.
    pub fn insert(&mut self, index: usize, extension: Extension) -> bool {
        if self.contains(extension.name()) {
            return false;
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, extension);
        true
    }

    /// Extension by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Extension> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Mutable extension by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Extension> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    /// Whether an extension with this name exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Position by name
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Remove by name
    pub fn remove(&mut self, name: &str) -> Option<Extension> {
        let pos = self.position(name)?;
        Some(self.entries.remove(pos))
    }

    /// Keep only extensions matching the predicate
    pub fn retain(&mut self, f: impl FnMut(&Extension) -> bool) {
        self.entries.retain(f);
    }

    /// Extensions in order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Extension> {
        self.entries.iter()
    }

    /// Mutable extensions in order
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Extension> {
        self.entries.iter_mut()
    }

    /// Names in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Extension::name).collect()
    }

    /// Number of extensions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Extensions {
    type Item = &'a Extension;
    type IntoIter = std::slice::Iter<'a, Extension>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_ordering() {
        assert!(ExtensionState::Required > ExtensionState::Optional);
        assert!(ExtensionState::Optional > ExtensionState::Transient);
        assert_eq!(
            ExtensionState::Transient.max(ExtensionState::Required),
            ExtensionState::Required
        );
    }

    #[test]
    fn json_content_requires_structure() {
        assert!(JsonContent::from_value(json!({"a": 1})).is_ok());
        assert!(JsonContent::from_value(json!([1, 2])).is_ok());
        assert!(matches!(
            JsonContent::from_value(json!(5)),
            Err(ModelError::JsonNotStructured("number"))
        ));
        assert!(matches!(
            JsonContent::from_text("{oops"),
            Err(ModelError::InvalidJson(_))
        ));
    }

    #[test]
    fn json_content_text_tracks_value() {
        let mut content = JsonContent::from_text(r#"{"a":1}"#).unwrap();
        content.set_value(json!([true])).unwrap();
        assert_eq!(content.text(), "[true]");
        assert!(content.set_value(json!("x")).is_err());
        assert_eq!(content.value(), &json!([true]));
    }

    #[test]
    fn extensions_unique_by_name() {
        let mut list = Extensions::new();
        list.add(Extension::text("notes", ExtensionState::Optional, "a").unwrap())
            .unwrap();
        let err = list
            .add(Extension::text("notes", ExtensionState::Optional, "b").unwrap())
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateExtension(name) if name == "notes"));

        let old = list.put(Extension::text("notes", ExtensionState::Required, "c").unwrap());
        assert!(old.is_some());
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("notes").unwrap().state(), ExtensionState::Required);
    }

    #[test]
    fn artifacts_accessor_matches_variant() {
        let ext = Extension::artifacts("content-packages", ExtensionState::Required).unwrap();
        assert_eq!(ext.extension_type(), ExtensionType::Artifacts);
        assert!(ext.artifacts_content().is_some());

        let text = Extension::text("notes", ExtensionState::Optional, "").unwrap();
        assert!(text.artifacts_content().is_none());
    }

    #[test]
    fn extension_rejects_empty_name() {
        assert!(matches!(
            Extension::text(" ", ExtensionState::Optional, "x"),
            Err(ModelError::EmptyExtensionName)
        ));
    }
}
