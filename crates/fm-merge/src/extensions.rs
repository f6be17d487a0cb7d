//! Extension merge and post-processing

use crate::artifacts::merge_artifacts;
use crate::context::MergeContext;
use crate::error::{MergeError, MergeResult};
use crate::json::merge_json;
use crate::rule::OverrideRule;
use fm_artifact::{ArtifactCollection, ArtifactId};
use fm_model::{Extension, ExtensionContent, Feature};

/// Merge every extension of `source` into `target`
///
/// For each source extension the registered merge handlers are asked in
/// registration order; the first that accepts it owns the whole merge,
/// including the case where the target has no such extension. Otherwise a
/// missing extension is copied and a present one is merged by kind.
///
/// # Errors
/// Returns error on a kind mismatch, a JSON shape mismatch, an artifact
/// clash, or a handler failure.
pub fn merge_extensions(
    target: &mut Feature,
    source: &Feature,
    context: &MergeContext,
    rules: &[OverrideRule],
) -> MergeResult<()> {
    for extension in source.extensions() {
        let handler = context
            .merge_handlers()
            .iter()
            .find(|h| h.handler().can_merge(extension));

        if let Some(registered) = handler {
            tracing::debug!(
                extension = extension.name(),
                handler = registered.id(),
                "delegating extension merge"
            );
            let position = target.extensions().position(extension.name());
            let previous = target.extensions_mut().remove(extension.name());
            let mut target_extension = previous.clone();
            let outcome = registered.handler().merge(
                &context.handler_context(registered.id()),
                target,
                source,
                &mut target_extension,
                extension,
            );
            // a failed handler leaves the target's extension as it was
            let kept = if outcome.is_ok() { target_extension } else { previous };
            if let Some(merged) = kept {
                reinsert(target, merged, position);
            }
            outcome?;
            continue;
        }

        match target.extensions_mut().get_mut(extension.name()) {
            Some(existing) => merge_extension(existing, extension, source.id(), rules)?,
            None => {
                let copy = copy_extension(extension, source.id(), rules)?;
                target.extensions_mut().put(copy);
            }
        }
    }
    Ok(())
}

fn reinsert(target: &mut Feature, extension: Extension, position: Option<usize>) {
    let extensions = target.extensions_mut();
    match position {
        Some(index) if !extensions.contains(extension.name()) => {
            extensions.insert(index, extension);
        }
        _ => {
            extensions.put(extension);
        }
    }
}

fn copy_extension(
    extension: &Extension,
    origin: &ArtifactId,
    rules: &[OverrideRule],
) -> MergeResult<Extension> {
    let mut copy = extension.clone();
    if let ExtensionContent::Artifacts(artifacts) = extension.content() {
        let mut stamped = ArtifactCollection::new();
        merge_artifacts(&mut stamped, artifacts, origin, rules)?;
        *copy.content_mut() = ExtensionContent::Artifacts(stamped);
    }
    Ok(copy)
}

/// Merge two extensions of the same name
///
/// Text is joined with a newline, JSON is deep-merged and artifacts are
/// merged under `rules`. The resulting state is the stronger of the two.
///
/// # Errors
/// Returns [`MergeError::ExtensionTypeMismatch`] if the kinds differ.
pub fn merge_extension(
    existing: &mut Extension,
    incoming: &Extension,
    origin: &ArtifactId,
    rules: &[OverrideRule],
) -> MergeResult<()> {
    let mismatch = || MergeError::ExtensionTypeMismatch {
        name: incoming.name().to_string(),
        existing: existing.extension_type(),
        incoming: incoming.extension_type(),
    };
    if existing.extension_type() != incoming.extension_type() {
        return Err(mismatch());
    }

    let state = existing.state().max(incoming.state());
    let name = incoming.name().to_string();
    match (existing.content_mut(), incoming.content()) {
        (ExtensionContent::Text(text), ExtensionContent::Text(more)) => {
            text.push('\n');
            text.push_str(more);
        }
        (ExtensionContent::Json(json), ExtensionContent::Json(more)) => {
            let merged = merge_json(&name, json.value(), more.value())?;
            json.set_value(merged)?;
        }
        (ExtensionContent::Artifacts(artifacts), ExtensionContent::Artifacts(more)) => {
            merge_artifacts(artifacts, more, origin, rules)?;
        }
        // kinds checked above
        _ => {}
    }
    existing.set_state(state);
    Ok(())
}

/// Run every post-process handler once per extension of `feature`
///
/// Extensions are visited in order; for each, handlers run in
/// registration order.
///
/// # Errors
/// Returns the first handler failure.
pub fn post_process_extensions(feature: &mut Feature, context: &MergeContext) -> MergeResult<()> {
    if context.post_process_handlers().is_empty() {
        return Ok(());
    }
    let extensions: Vec<Extension> = feature.extensions().iter().cloned().collect();
    for extension in &extensions {
        for registered in context.post_process_handlers() {
            registered.handler().post_process(
                &context.handler_context(registered.id()),
                feature,
                extension,
            )?;
        }
    }
    Ok(())
}
