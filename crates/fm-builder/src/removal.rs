//! Prototype removals
//!
//! Applied to the assembled prototype before the inheriting feature is
//! layered on top. Removing something the prototype does not have is an
//! error, except for framework properties and whole extensions.

use crate::error::{BuildError, BuildResult};
use fm_artifact::{Artifact, ArtifactCollection, ArtifactId};
use fm_model::{split_configuration_removal, Feature, Prototype};

/// Strip everything `prototype` lists for removal from `base`
///
/// `feature` is the inheriting feature, for error reporting. Removing a
/// bundle also removes every configuration that names it as its origin.
///
/// # Errors
/// Returns [`BuildError::MissingRemoval`] for a bundle, configuration,
/// configuration property, extension artifact, requirement or capability
/// that is not present.
pub fn apply_removals(
    base: &mut Feature,
    prototype: &Prototype,
    feature: &ArtifactId,
) -> BuildResult<()> {
    for id in prototype.bundle_removals() {
        let removed = remove_artifact(base.bundles_mut(), id);
        if removed.is_empty() {
            return Err(BuildError::missing_removal("bundle", id, feature));
        }
        let removed: Vec<&ArtifactId> = removed.iter().map(Artifact::id).collect();
        base.configurations_mut().retain(|configuration| {
            configuration
                .artifact_origin()
                .map_or(true, |origin| !removed.contains(&origin))
        });
        tracing::debug!(bundle = %id, %feature, "removed prototype bundle");
    }

    for entry in prototype.configuration_removals() {
        match split_configuration_removal(entry) {
            (pid, None) => {
                if base.configurations_mut().remove(pid).is_none() {
                    return Err(BuildError::missing_removal("configuration", pid, feature));
                }
            }
            (pid, Some(key)) => {
                let removed = base
                    .configurations_mut()
                    .get_mut(pid)
                    .and_then(|configuration| configuration.remove_property(key));
                if removed.is_none() {
                    return Err(BuildError::missing_removal(
                        "configuration property",
                        entry,
                        feature,
                    ));
                }
            }
        }
        tracing::debug!(configuration = %entry, %feature, "removed prototype configuration");
    }

    for key in prototype.framework_property_removals() {
        if base.framework_properties_mut().remove(key).is_none() {
            tracing::trace!(%key, %feature, "framework property to remove not present");
        }
    }

    for name in prototype.extension_removals() {
        if base.extensions_mut().remove(name).is_none() {
            tracing::trace!(extension = %name, %feature, "extension to remove not present");
        }
    }

    for (name, ids) in prototype.artifact_extension_removals() {
        let artifacts = base
            .extensions_mut()
            .get_mut(name)
            .and_then(|extension| extension.artifacts_content_mut())
            .ok_or_else(|| BuildError::missing_removal("artifacts extension", name, feature))?;
        for id in ids {
            if remove_artifact(artifacts, id).is_empty() {
                return Err(BuildError::missing_removal(
                    "extension artifact",
                    format!("{id} in {name}"),
                    feature,
                ));
            }
        }
    }

    for requirement in prototype.requirement_removals() {
        if !base.remove_requirement(requirement) {
            return Err(BuildError::missing_removal(
                "requirement",
                requirement.namespace(),
                feature,
            ));
        }
    }

    for capability in prototype.capability_removals() {
        if !base.remove_capability(capability) {
            return Err(BuildError::missing_removal(
                "capability",
                capability.namespace(),
                feature,
            ));
        }
    }
    Ok(())
}

// Exact id first; otherwise every version of the same artifact.
fn remove_artifact(collection: &mut ArtifactCollection, id: &ArtifactId) -> Vec<Artifact> {
    match collection.remove_exact(id) {
        Some(artifact) => vec![artifact],
        None => collection.remove_same(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_model::{Capability, Configuration, Extension, ExtensionState, Requirement};

    fn id(s: &str) -> ArtifactId {
        ArtifactId::parse(s).unwrap()
    }

    fn base() -> Feature {
        let mut f = Feature::new(id("g:proto:1"));
        f.bundles_mut().add(Artifact::new(id("g:b:1")));
        f.bundles_mut().add(Artifact::new(id("g:keep:1")));
        f.configurations_mut().add(
            Configuration::new("b.config")
                .unwrap()
                .with_artifact_origin(id("g:b:1")),
        );
        f.configurations_mut()
            .add(Configuration::new("other").unwrap().with_property("k", "v"));
        f.framework_properties_mut().insert("fw", "1");
        f.add_requirement(Requirement::new("osgi.ee"));
        let mut ext = Extension::artifacts("content", ExtensionState::Required).unwrap();
        ext.artifacts_content_mut()
            .unwrap()
            .add(Artifact::new(id("g:pkg:zip:1")));
        f.extensions_mut().add(ext).unwrap();
        f
    }

    #[test]
    fn bundle_removal_cascades_to_its_configurations() {
        let mut f = base();
        let proto = Prototype::new(id("g:proto:1")).with_bundle_removal(id("g:b:1"));
        apply_removals(&mut f, &proto, &id("g:f:1")).unwrap();

        assert_eq!(f.bundles().ids(), vec![id("g:keep:1")]);
        assert_eq!(f.configurations().pids(), vec!["other"]);
    }

    #[test]
    fn bundle_removal_falls_back_to_other_versions() {
        let mut f = base();
        let proto = Prototype::new(id("g:proto:1")).with_bundle_removal(id("g:b:9"));
        apply_removals(&mut f, &proto, &id("g:f:1")).unwrap();
        assert!(!f.bundles().contains_same(&id("g:b:9")));
    }

    #[test]
    fn missing_bundle_is_fatal() {
        let mut f = base();
        let proto = Prototype::new(id("g:proto:1")).with_bundle_removal(id("g:absent:1"));
        let err = apply_removals(&mut f, &proto, &id("g:f:1")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot remove bundle g:absent:1 from prototype of g:f:1: not present"
        );
    }

    #[test]
    fn configuration_and_property_removals() {
        let mut f = base();
        let proto = Prototype::new(id("g:proto:1")).with_configuration_removal("other@k");
        apply_removals(&mut f, &proto, &id("g:f:1")).unwrap();
        assert!(f.configurations().get("other").unwrap().properties().is_empty());

        let proto = Prototype::new(id("g:proto:1")).with_configuration_removal("other@k");
        assert!(apply_removals(&mut f, &proto, &id("g:f:1")).is_err());

        let proto = Prototype::new(id("g:proto:1")).with_configuration_removal("missing");
        assert!(apply_removals(&mut f, &proto, &id("g:f:1")).is_err());
    }

    #[test]
    fn framework_property_and_extension_removals_tolerate_absence() {
        let mut f = base();
        let proto = Prototype::new(id("g:proto:1"))
            .with_framework_property_removal("fw")
            .with_framework_property_removal("absent")
            .with_extension_removal("absent");
        apply_removals(&mut f, &proto, &id("g:f:1")).unwrap();
        assert!(f.framework_properties().is_empty());
        assert!(f.extensions().contains("content"));
    }

    #[test]
    fn extension_artifact_and_requirement_removals() {
        let mut f = base();
        let proto = Prototype::new(id("g:proto:1"))
            .with_artifact_extension_removal("content", id("g:pkg:zip:1"))
            .with_requirement_removal(Requirement::new("osgi.ee"));
        apply_removals(&mut f, &proto, &id("g:f:1")).unwrap();
        assert!(f.extensions().get("content").unwrap().artifacts_content().unwrap().is_empty());
        assert!(f.requirements().is_empty());

        let proto = Prototype::new(id("g:proto:1"))
            .with_requirement_removal(Requirement::new("osgi.ee"));
        assert!(apply_removals(&mut f, &proto, &id("g:f:1")).is_err());
    }

    #[test]
    fn capability_removal_requires_presence() {
        let mut f = base();
        f.add_capability(Capability::new("osgi.service").with_attribute("objectClass", "Foo"));
        f.add_capability(Capability::new("osgi.contract"));

        let proto = Prototype::new(id("g:proto:1"))
            .with_capability_removal(Capability::new("osgi.contract"));
        apply_removals(&mut f, &proto, &id("g:f:1")).unwrap();
        assert_eq!(f.capabilities().len(), 1);
        assert_eq!(f.capabilities()[0].namespace(), "osgi.service");

        // attributes are part of the identity
        let proto = Prototype::new(id("g:proto:1"))
            .with_capability_removal(Capability::new("osgi.service"));
        let err = apply_removals(&mut f, &proto, &id("g:f:1")).unwrap_err();
        assert!(matches!(
            err,
            BuildError::MissingRemoval { kind: "capability", ref element, .. } if element == "osgi.service"
        ));
        assert_eq!(f.capabilities().len(), 1);
    }
}
