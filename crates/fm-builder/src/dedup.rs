//! Feature deduplication

use fm_artifact::compare_versions;
use fm_model::Feature;
use std::cmp::Ordering;

/// Keep only the highest version of every feature
///
/// Features are the same when their ids match ignoring the version. The
/// survivor of each group takes the position where the group was first
/// seen; between equal versions the earlier feature is kept.
#[must_use]
pub fn deduplicate(features: &[Feature]) -> Vec<Feature> {
    let mut survivors: Vec<&Feature> = Vec::with_capacity(features.len());

    for feature in features {
        let Some(slot) = survivors
            .iter_mut()
            .find(|kept| kept.id().is_same(feature.id()))
        else {
            survivors.push(feature);
            continue;
        };

        let (kept, dropped) =
            if compare_versions(feature.id().version(), slot.id().version()) == Ordering::Greater {
                (feature, *slot)
            } else {
                (*slot, feature)
            };
        tracing::debug!(kept = %kept.id(), dropped = %dropped.id(), "dropping lower feature version");
        *slot = kept;
    }

    survivors.into_iter().cloned().collect()
}
