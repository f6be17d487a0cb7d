//! Whole-feature merge
//!
//! Drives the individual merges for every part of a feature. Two modes
//! exist:
//!
//! - [`MergeMode::Aggregate`] merges independent features; every conflict
//!   is resolved by the context's rules or fails.
//! - [`MergeMode::Layer`] puts a feature's own content over its assembled
//!   prototype: artifact versions are kept side by side, the feature's
//!   configurations replace the prototype's, and its properties win.

use crate::artifacts::merge_artifacts;
use crate::configurations::{merge_configurations, ConfigurationOverrides, ConfigurationPolicy};
use crate::context::MergeContext;
use crate::error::{MergeResult, PropertyKind};
use crate::extensions::merge_extensions;
use crate::properties::{merge_properties, overlay_properties};
use crate::rule::{OverridePolicy, OverrideRule};
use fm_model::Feature;

/// How conflicts between the two sides are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Independent features; conflicts need explicit rules
    Aggregate,
    /// Feature content over its prototype; the feature wins
    Layer,
}

/// Merge all content of `source` into `target`
///
/// Bundles, configurations, framework properties, variables,
/// requirements, capabilities and extensions are merged in that order.
///
/// # Errors
/// Returns the first conflict that the mode and context cannot resolve.
pub fn merge_feature(
    target: &mut Feature,
    source: &Feature,
    context: &MergeContext,
    mode: MergeMode,
) -> MergeResult<()> {
    let origin = source.id();
    tracing::debug!(into = %target.id(), from = %origin, ?mode, "merging feature");

    match mode {
        MergeMode::Aggregate => {
            let rules = context.artifact_overrides();
            merge_artifacts(target.bundles_mut(), source.bundles(), origin, rules)?;
            merge_configurations(
                target.configurations_mut(),
                source.configurations(),
                origin,
                context.configuration_overrides(),
            )?;
            merge_properties(
                PropertyKind::FrameworkProperty,
                target.framework_properties_mut(),
                source.framework_properties(),
                origin,
                context.framework_property_overrides(),
            )?;
            merge_properties(
                PropertyKind::Variable,
                target.variables_mut(),
                source.variables(),
                origin,
                context.variable_overrides(),
            )?;
            merge_descriptors(target, source);
            merge_extensions(target, source, context, rules)?;
        }
        MergeMode::Layer => {
            let rules = [OverrideRule::catch_all(OverridePolicy::All)];
            merge_artifacts(target.bundles_mut(), source.bundles(), origin, &rules)?;
            merge_configurations(
                target.configurations_mut(),
                source.configurations(),
                origin,
                &ConfigurationOverrides::uniform(ConfigurationPolicy::UseLatest)?,
            )?;
            overlay_properties(
                target.framework_properties_mut(),
                source.framework_properties(),
                origin,
            );
            overlay_properties(target.variables_mut(), source.variables(), origin);
            merge_descriptors(target, source);
            merge_extensions(target, source, context, &rules)?;
        }
    }
    Ok(())
}

fn merge_descriptors(target: &mut Feature, source: &Feature) {
    for requirement in source.requirements() {
        target.add_requirement(requirement.clone());
    }
    for capability in source.capabilities() {
        target.add_capability(capability.clone());
    }
}
