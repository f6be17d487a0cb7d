//! Artifact collection merge
//!
//! Merges a source [`ArtifactCollection`] into a target one. Artifacts are
//! matched by identity ignoring version, aliases included; genuine version
//! clashes are resolved by the first matching [`OverrideRule`].
//!
//! # Ordering
//! Survivors of a clash replace the clashing target entries at the position
//! of the first of them, target-derived survivors first, then
//! source-derived ones. The same order applies to the `ALL` policy and to
//! the side-by-side case where one feature contributes several versions.

use crate::error::{MergeError, MergeResult};
use crate::rule::{find_rule, OverrideRule, Selection};
use fm_artifact::{Artifact, ArtifactCollection, ArtifactId};
use std::collections::HashSet;

/// Merge `source` into `target`
///
/// `origin` is the feature `source` belongs to; artifacts that carry no
/// provenance yet are attributed to it.
///
/// # Errors
/// Returns [`MergeError::ArtifactClash`] when two different versions of
/// the same artifact meet and no rule in `rules` matches either side.
pub fn merge_artifacts(
    target: &mut ArtifactCollection,
    source: &ArtifactCollection,
    origin: &ArtifactId,
    rules: &[OverrideRule],
) -> MergeResult<()> {
    let mut contributed: HashSet<ArtifactId> = HashSet::new();

    for artifact in source {
        let mut incoming = artifact.clone();
        if incoming.feature_origins().is_empty() {
            incoming.add_feature_origin(origin.clone());
        }

        let matches: Vec<usize> = target
            .iter()
            .enumerate()
            .filter(|(_, existing)| existing.is_same_artifact(&incoming))
            .map(|(i, _)| i)
            .collect();

        let Some(&insert_at) = matches.first() else {
            contributed.insert(incoming.id().clone());
            target.add(incoming);
            continue;
        };

        let mut from_existing = Vec::new();
        let mut from_incoming = Vec::new();
        for &index in &matches {
            let existing = &target.as_slice()[index];
            let same_source =
                contributed.contains(existing.id()) || existing.feature_origins().contains(origin);
            resolve(
                existing,
                &incoming,
                same_source,
                rules,
                &mut from_existing,
                &mut from_incoming,
            )?;
        }

        let mut survivors = Vec::with_capacity(from_existing.len() + from_incoming.len());
        for artifact in from_existing.into_iter().chain(from_incoming) {
            push_unique(&mut survivors, artifact);
        }

        for &index in matches.iter().rev() {
            target.remove_at(index);
        }
        let mut position = insert_at;
        for survivor in survivors {
            if survivor.id() == incoming.id() {
                contributed.insert(survivor.id().clone());
            }
            if target.insert(position, survivor) {
                position += 1;
            }
        }
    }
    Ok(())
}

fn resolve(
    existing: &Artifact,
    incoming: &Artifact,
    same_source: bool,
    rules: &[OverrideRule],
    from_existing: &mut Vec<Artifact>,
    from_incoming: &mut Vec<Artifact>,
) -> MergeResult<()> {
    if existing.id() == incoming.id() {
        push_unique(from_existing, combine(existing, existing, incoming));
        return Ok(());
    }

    if same_source {
        tracing::trace!(
            existing = %existing.id(),
            incoming = %incoming.id(),
            "keeping versions from the same feature side by side"
        );
        push_unique(from_existing, existing.clone());
        push_unique(from_incoming, incoming.clone());
        return Ok(());
    }

    let rule = find_rule(rules, existing.id(), incoming.id()).ok_or_else(|| {
        MergeError::ArtifactClash {
            existing: existing.id().clone(),
            incoming: incoming.id().clone(),
            rule_hint: OverrideRule::hint_for(incoming.id()),
        }
    })?;

    let selection = rule.policy().select(existing, incoming);
    tracing::trace!(
        existing = %existing.id(),
        incoming = %incoming.id(),
        rule = %rule,
        ?selection,
        "resolved artifact clash"
    );

    match selection {
        Selection::Both => {
            push_unique(from_existing, existing.clone());
            push_unique(from_incoming, incoming.clone());
        }
        Selection::Existing => push_unique(from_existing, combine(existing, existing, incoming)),
        Selection::Incoming => push_unique(from_incoming, combine(incoming, existing, incoming)),
        Selection::Synthesized(version) => {
            let id = incoming.id().change_version(version)?;
            push_unique(from_incoming, combine(&incoming.copy(id), existing, incoming));
        }
    }
    Ok(())
}

/// Single survivor carrying the provenance and start order of both sides
fn combine(chosen: &Artifact, existing: &Artifact, incoming: &Artifact) -> Artifact {
    let mut result = chosen.clone();
    result.set_start_order(min_start_order(existing.start_order(), incoming.start_order()));
    result.set_feature_origins(
        existing
            .feature_origins()
            .iter()
            .chain(incoming.feature_origins())
            .cloned(),
    );
    result
}

/// Smaller non-zero start order (`0` means unset)
#[inline]
#[must_use]
pub fn min_start_order(a: u32, b: u32) -> u32 {
    match (a, b) {
        (0, x) | (x, 0) => x,
        (a, b) => a.min(b),
    }
}

fn push_unique(list: &mut Vec<Artifact>, artifact: Artifact) {
    match list.iter_mut().find(|a| a.id() == artifact.id()) {
        Some(present) => {
            present.set_start_order(min_start_order(present.start_order(), artifact.start_order()));
            for origin in artifact.feature_origins() {
                present.add_feature_origin(origin.clone());
            }
        }
        None => list.push(artifact),
    }
}
