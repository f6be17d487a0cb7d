//! Feature assembly
//!
//! Two entry points:
//!
//! - [`assemble`] resolves a feature's prototype chain into a single,
//!   self-contained feature.
//! - [`assemble_many`] deduplicates a set of independent features,
//!   assembles each and merges them into one aggregate.
//!
//! Prototypes are resolved depth first. The assembled prototype, minus
//! its removals, is merged into an empty result and the feature's own
//! content is layered over it.

use crate::context::BuilderContext;
use crate::dedup::deduplicate;
use crate::error::{BuildError, BuildResult};
use crate::provider::{FeatureProvider, LocalFirst};
use crate::removal::apply_removals;
use crate::trail::AssemblyTrail;
use fm_artifact::{Artifact, ArtifactCollection, ArtifactId};
use fm_merge::{merge_feature, post_process_extensions, substitute_feature, MergeMode};
use fm_model::{Extension, ExtensionState, Feature, Prototype};

/// Name of the transient extension listing the features of an aggregate
pub const ASSEMBLED_FEATURES: &str = "assembled-features";

/// Resolve the prototype chain of `feature`
///
/// An already assembled feature is returned unchanged.
///
/// # Errors
/// Returns error if a prototype is missing, `final` or part of a cycle,
/// if a removal names an absent element, or on any merge conflict.
pub fn assemble(feature: &Feature, context: &BuilderContext) -> BuildResult<Feature> {
    if feature.is_assembled() {
        tracing::debug!(feature = %feature.id(), "feature already assembled");
        return Ok(feature.clone());
    }
    tracing::info!(feature = %feature.id(), "assembling feature");

    let mut trail = AssemblyTrail::new();
    let mut result = assemble_with(feature, context, context.provider(), &mut trail)?;
    finish(&mut result, context)?;
    Ok(result)
}

/// Aggregate independent features into a new feature `id`
///
/// Only the highest version of each feature takes part. Prototypes are
/// looked up among the participants first, then through the context's
/// provider. A feature that another participant uses as a prototype is
/// not merged a second time.
/// The ids of the merged features are listed in the transient
/// [`ASSEMBLED_FEATURES`] extension. The aggregate is complete only if
/// every merged feature is.
///
/// # Errors
/// Returns the first assembly or merge failure.
pub fn assemble_many(
    id: ArtifactId,
    context: &BuilderContext,
    features: &[Feature],
) -> BuildResult<Feature> {
    tracing::info!(aggregate = %id, count = features.len(), "assembling features");

    let survivors = deduplicate(features);
    let provider = LocalFirst::new(&survivors, context.provider());
    let mut trail = AssemblyTrail::new();
    let mut assembled = Vec::with_capacity(survivors.len());
    for feature in &survivors {
        assembled.push(assemble_with(feature, context, &provider, &mut trail)?);
    }

    let mut result = Feature::new(id);
    let mut contributors = ArtifactCollection::new();
    let mut complete = true;
    for feature in &assembled {
        if trail.is_included(feature.id()) {
            tracing::debug!(feature = %feature.id(), "skipping feature included by another");
            continue;
        }
        merge_feature(&mut result, feature, context.merge_context(), MergeMode::Aggregate)?;
        complete &= feature.is_complete();
        contributors.add(Artifact::new(feature.id().clone()));
    }

    let mut record = Extension::artifacts(ASSEMBLED_FEATURES, ExtensionState::Transient)?;
    if let Some(artifacts) = record.artifacts_content_mut() {
        *artifacts = contributors;
    }
    result.extensions_mut().put(record);
    result.set_complete(complete);
    result.set_final(false);
    result.set_assembled(true);

    finish(&mut result, context)?;
    Ok(result)
}

fn assemble_with(
    feature: &Feature,
    context: &BuilderContext,
    provider: &dyn FeatureProvider,
    trail: &mut AssemblyTrail,
) -> BuildResult<Feature> {
    if feature.is_assembled() {
        return Ok(feature.clone());
    }
    trail.enter(feature.id())?;

    let merge = context.merge_context();
    let mut result = Feature::new(feature.id().clone());

    if let Some(prototype) = feature.prototype() {
        let base = resolve_prototype(feature, prototype, context, provider, trail)?;
        merge_feature(&mut result, &base, merge, MergeMode::Aggregate)?;
        inherit_metadata(&mut result, &base);
    }

    let mut own = feature.clone();
    own.set_prototype(None);
    merge_feature(&mut result, &own, merge, MergeMode::Layer)?;
    inherit_metadata(&mut result, feature);

    stamp_origins(&mut result, feature.id());
    result.set_final(feature.is_final());
    result.set_complete(feature.is_complete());
    result.set_assembled(true);

    trail.leave();
    Ok(result)
}

fn resolve_prototype(
    feature: &Feature,
    prototype: &Prototype,
    context: &BuilderContext,
    provider: &dyn FeatureProvider,
    trail: &mut AssemblyTrail,
) -> BuildResult<Feature> {
    let id = prototype.id();
    tracing::debug!(feature = %feature.id(), prototype = %id, "resolving prototype");
    trail.include(id);

    let base = provider
        .provide(id)
        .ok_or_else(|| BuildError::MissingFeature(id.clone()))?;
    if base.is_final() {
        return Err(BuildError::FinalPrototype {
            prototype: id.clone(),
            feature: feature.id().clone(),
        });
    }

    let mut base = assemble_with(&base, context, provider, trail)?;
    apply_removals(&mut base, prototype, feature.id())?;
    Ok(base)
}

// Present values of `from` replace those of `result`.
fn inherit_metadata(result: &mut Feature, from: &Feature) {
    let text = |value: Option<&str>| value.map(str::to_owned);
    if from.title().is_some() {
        result.set_title(text(from.title()));
    }
    if from.description().is_some() {
        result.set_description(text(from.description()));
    }
    if from.vendor().is_some() {
        result.set_vendor(text(from.vendor()));
    }
    if from.license().is_some() {
        result.set_license(text(from.license()));
    }
    if from.doc_url().is_some() {
        result.set_doc_url(text(from.doc_url()));
    }
    if from.scm_info().is_some() {
        result.set_scm_info(text(from.scm_info()));
    }
    if !from.categories().is_empty() {
        *result.categories_mut() = from.categories().to_vec();
    }
}

fn stamp_origins(feature: &mut Feature, origin: &ArtifactId) {
    let stamp = |artifacts: &mut ArtifactCollection| {
        for artifact in artifacts.iter_mut() {
            if artifact.feature_origins().is_empty() {
                artifact.add_feature_origin(origin.clone());
            }
        }
    };
    stamp(feature.bundles_mut());
    for extension in feature.extensions_mut().iter_mut() {
        if let Some(artifacts) = extension.artifacts_content_mut() {
            stamp(artifacts);
        }
    }
    for configuration in feature.configurations_mut().iter_mut() {
        if configuration.feature_origins().is_empty() {
            configuration.add_feature_origin(origin.clone());
        }
    }
}

fn finish(feature: &mut Feature, context: &BuilderContext) -> BuildResult<()> {
    post_process_extensions(feature, context.merge_context())?;
    if context.substitutes_variables() {
        substitute_feature(feature, context.merge_context().variable_overrides())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MapFeatureProvider;

    fn id(s: &str) -> ArtifactId {
        ArtifactId::parse(s).unwrap()
    }

    #[test]
    fn feature_without_prototype_is_stamped_and_flagged() {
        let mut f = Feature::new(id("g:f:1")).with_title("plain");
        f.bundles_mut().add(Artifact::new(id("g:b:1")));
        f.set_complete(true);

        let ctx = BuilderContext::new(MapFeatureProvider::new());
        let result = assemble(&f, &ctx).unwrap();

        assert!(result.is_assembled());
        assert!(result.is_complete());
        assert_eq!(result.title(), Some("plain"));
        let bundle = result.bundles().get_exact(&id("g:b:1")).unwrap();
        assert_eq!(bundle.feature_origins(), &[id("g:f:1")]);
    }

    #[test]
    fn metadata_falls_back_to_prototype() {
        let proto = Feature::new(id("g:proto:1"))
            .with_title("proto title")
            .with_description("proto description");
        let f = Feature::new(id("g:f:1"))
            .with_title("own title")
            .with_prototype(Prototype::new(id("g:proto:1")));

        let ctx = BuilderContext::new(MapFeatureProvider::new().with_feature(proto));
        let result = assemble(&f, &ctx).unwrap();

        assert_eq!(result.title(), Some("own title"));
        assert_eq!(result.description(), Some("proto description"));
        assert!(result.prototype().is_none());
    }

    #[test]
    fn missing_prototype_is_fatal() {
        let f = Feature::new(id("g:f:1")).with_prototype(Prototype::new(id("g:gone:1")));
        let ctx = BuilderContext::new(MapFeatureProvider::new());
        let err = assemble(&f, &ctx).unwrap_err();
        assert!(matches!(err, BuildError::MissingFeature(ref missing) if *missing == id("g:gone:1")));
    }

    #[test]
    fn self_prototype_is_a_cycle() {
        let f = Feature::new(id("g:f:1")).with_prototype(Prototype::new(id("g:f:1")));
        let ctx = BuilderContext::new(MapFeatureProvider::new().with_feature(f.clone()));
        let err = assemble(&f, &ctx).unwrap_err();
        assert!(matches!(err, BuildError::Cycle { ref path } if path.len() == 2));
    }
}
