//! Variable and framework property merge

use crate::error::{MergeError, MergeResult, PropertyKind};
use fm_artifact::ArtifactId;
use fm_model::{Property, PropertyMap};
use indexmap::IndexMap;

/// Merge `source` into `target`, failing on differing values
///
/// An entry whose key appears in `overrides` takes the override value
/// whenever it is merged, which also resolves any clash for that key.
/// Equal values merge silently; metadata entries from the source are added
/// and provenance is united.
///
/// # Errors
/// Returns [`MergeError::PropertyClash`] when a key has two different
/// values and no override.
pub fn merge_properties(
    kind: PropertyKind,
    target: &mut PropertyMap,
    source: &PropertyMap,
    origin: &ArtifactId,
    overrides: &IndexMap<String, String>,
) -> MergeResult<()> {
    for (key, property) in source.entries() {
        let incoming = with_origin(property, origin);
        let override_value = overrides.get(key);

        match target.entry_mut(key) {
            None => {
                let mut entry = incoming;
                if let Some(value) = override_value {
                    entry.set_value(value.clone());
                }
                target.insert_property(key, entry);
            }
            Some(existing) => {
                match override_value {
                    Some(value) => existing.set_value(value.clone()),
                    None if existing.value() != incoming.value() => {
                        return Err(MergeError::PropertyClash {
                            kind,
                            key: key.to_string(),
                            existing: existing.value().to_string(),
                            incoming: incoming.value().to_string(),
                            feature: origin.clone(),
                        });
                    }
                    None => {}
                }
                absorb(existing, &incoming);
            }
        }
    }
    Ok(())
}

/// Layer `source` over `target`, source values winning
pub fn overlay_properties(target: &mut PropertyMap, source: &PropertyMap, origin: &ArtifactId) {
    for (key, property) in source.entries() {
        let incoming = with_origin(property, origin);
        match target.entry_mut(key) {
            None => {
                target.insert_property(key, incoming);
            }
            Some(existing) => {
                existing.set_value(incoming.value());
                absorb(existing, &incoming);
            }
        }
    }
}

fn with_origin(property: &Property, origin: &ArtifactId) -> Property {
    let mut property = property.clone();
    if property.feature_origins().is_empty() {
        property.add_feature_origin(origin.clone());
    }
    property
}

fn absorb(existing: &mut Property, incoming: &Property) {
    for (k, v) in incoming.metadata() {
        existing.metadata_mut().insert(k.clone(), v.clone());
    }
    for origin in incoming.feature_origins() {
        existing.add_feature_origin(origin.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ArtifactId {
        ArtifactId::parse(s).unwrap()
    }

    #[test]
    fn equal_values_merge_and_unite_origins() {
        let mut target = PropertyMap::new();
        merge_properties(
            PropertyKind::Variable,
            &mut target,
            &PropertyMap::new().with("k", "v"),
            &id("g:a:1"),
            &IndexMap::new(),
        )
        .unwrap();
        merge_properties(
            PropertyKind::Variable,
            &mut target,
            &PropertyMap::new().with("k", "v"),
            &id("g:b:1"),
            &IndexMap::new(),
        )
        .unwrap();

        let entry = target.entry("k").unwrap();
        assert_eq!(entry.value(), "v");
        assert_eq!(entry.feature_origins(), &[id("g:a:1"), id("g:b:1")]);
    }

    #[test]
    fn differing_values_clash_without_override() {
        let mut target = PropertyMap::new().with("k", "a");
        let err = merge_properties(
            PropertyKind::FrameworkProperty,
            &mut target,
            &PropertyMap::new().with("k", "b"),
            &id("g:f:1"),
            &IndexMap::new(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("framework property clash for 'k'"));
    }

    #[test]
    fn override_resolves_clash() {
        let mut target = PropertyMap::new().with("k", "a");
        let overrides: IndexMap<String, String> = [("k".to_string(), "o".to_string())].into();
        merge_properties(
            PropertyKind::Variable,
            &mut target,
            &PropertyMap::new().with("k", "b"),
            &id("g:f:1"),
            &overrides,
        )
        .unwrap();
        assert_eq!(target.get("k"), Some("o"));
    }

    #[test]
    fn overlay_source_wins() {
        let mut target = PropertyMap::new().with("k", "a").with("keep", "1");
        overlay_properties(&mut target, &PropertyMap::new().with("k", "b"), &id("g:f:1"));
        assert_eq!(target.get("k"), Some("b"));
        assert_eq!(target.get("keep"), Some("1"));
    }
}
