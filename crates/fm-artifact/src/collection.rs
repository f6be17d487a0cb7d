//! Ordered artifact collections
//!
//! Provides [`ArtifactCollection`], the insertion-ordered, exact-id
//! deduplicated list used for feature bundles and artifact extensions.

use crate::artifact::Artifact;
use crate::id::ArtifactId;

/// Ordered list of artifacts without duplicate ids
///
/// Insertion order is significant: it drives bundle start ordering
/// downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactCollection {
    artifacts: Vec<Artifact>,
}

impl ArtifactCollection {
    /// Create empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append artifact
    ///
    /// Returns `false` (and leaves the collection untouched) if an artifact
    /// with the exact same id is already present.
    pub fn add(&mut self, artifact: Artifact) -> bool {
        if self.contains_exact(artifact.id()) {
            return false;
        }
        self.artifacts.push(artifact);
        true
    }

    /// Insert artifact at position (clamped to the end)
    ///
    /// Returns `false` if the exact id is already present.
    pub fn insert(&mut self, index: usize, artifact: Artifact) -> bool {
        if self.contains_exact(artifact.id()) {
            return false;
        }
        let index = index.min(self.artifacts.len());
        self.artifacts.insert(index, artifact);
        true
    }

    /// Artifact with exactly this id
    #[must_use]
    pub fn get_exact(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id() == id)
    }

    /// Mutable artifact with exactly this id
    pub fn get_exact_mut(&mut self, id: &ArtifactId) -> Option<&mut Artifact> {
        self.artifacts.iter_mut().find(|a| a.id() == id)
    }

    /// First artifact that is the same as `id` ignoring version
    #[must_use]
    pub fn get_same(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id().is_same(id))
    }

    /// All artifacts that are the same as `id` ignoring version
    #[must_use]
    pub fn all_same(&self, id: &ArtifactId) -> Vec<&Artifact> {
        self.artifacts.iter().filter(|a| a.id().is_same(id)).collect()
    }

    /// Whether an artifact with exactly this id is present
    #[inline]
    #[must_use]
    pub fn contains_exact(&self, id: &ArtifactId) -> bool {
        self.artifacts.iter().any(|a| a.id() == id)
    }

    /// Whether an artifact with the same id ignoring version is present
    #[inline]
    #[must_use]
    pub fn contains_same(&self, id: &ArtifactId) -> bool {
        self.artifacts.iter().any(|a| a.id().is_same(id))
    }

    /// Remove the artifact with exactly this id
    pub fn remove_exact(&mut self, id: &ArtifactId) -> Option<Artifact> {
        let pos = self.position_exact(id)?;
        Some(self.artifacts.remove(pos))
    }

    /// Remove all artifacts that are the same ignoring version
    ///
    /// Returns the removed artifacts in collection order.
    pub fn remove_same(&mut self, id: &ArtifactId) -> Vec<Artifact> {
        let (removed, kept): (Vec<Artifact>, Vec<Artifact>) = std::mem::take(&mut self.artifacts)
            .into_iter()
            .partition(|a| a.id().is_same(id));
        self.artifacts = kept;
        removed
    }

    /// Remove the artifact at `index`
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn remove_at(&mut self, index: usize) -> Artifact {
        self.artifacts.remove(index)
    }

    /// Position of the artifact with exactly this id
    #[must_use]
    pub fn position_exact(&self, id: &ArtifactId) -> Option<usize> {
        self.artifacts.iter().position(|a| a.id() == id)
    }

    /// Keep only artifacts matching the predicate
    pub fn retain(&mut self, f: impl FnMut(&Artifact) -> bool) {
        self.artifacts.retain(f);
    }

    /// Artifacts in order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Artifact> {
        self.artifacts.iter()
    }

    /// Mutable artifacts in order
    ///
    /// Ids cannot be changed through [`Artifact`], so uniqueness holds.
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Artifact> {
        self.artifacts.iter_mut()
    }

    /// Artifacts as a slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Number of artifacts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the collection is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Ids in order
    #[must_use]
    pub fn ids(&self) -> Vec<ArtifactId> {
        self.artifacts.iter().map(|a| a.id().clone()).collect()
    }
}

impl<'a> IntoIterator for &'a ArtifactCollection {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}

impl IntoIterator for ArtifactCollection {
    type Item = Artifact;
    type IntoIter = std::vec::IntoIter<Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.into_iter()
    }
}

impl FromIterator<Artifact> for ArtifactCollection {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        let mut collection = Self::new();
        for artifact in iter {
            collection.add(artifact);
        }
        collection
    }
}

impl Extend<Artifact> for ArtifactCollection {
    fn extend<I: IntoIterator<Item = Artifact>>(&mut self, iter: I) {
        for artifact in iter {
            self.add(artifact);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(s: &str) -> Artifact {
        Artifact::new(ArtifactId::parse(s).unwrap())
    }

    fn id(s: &str) -> ArtifactId {
        ArtifactId::parse(s).unwrap()
    }

    #[test]
    fn collection_add_is_noop_for_duplicate_id() {
        let mut c = ArtifactCollection::new();
        assert!(c.add(artifact("g:a:1").with_start_order(1)));
        assert!(!c.add(artifact("g:a:1").with_start_order(2)));
        assert_eq!(c.len(), 1);
        assert_eq!(c.get_exact(&id("g:a:1")).unwrap().start_order(), 1);
    }

    #[test]
    fn collection_preserves_insertion_order() {
        let c: ArtifactCollection = ["g:c:1", "g:a:1", "g:b:1"]
            .into_iter()
            .map(artifact)
            .collect();
        assert_eq!(c.ids(), vec![id("g:c:1"), id("g:a:1"), id("g:b:1")]);
    }

    #[test]
    fn collection_same_lookup_ignores_version() {
        let mut c = ArtifactCollection::new();
        c.add(artifact("g:a:1"));
        c.add(artifact("g:a:2"));
        c.add(artifact("g:b:1"));

        assert_eq!(c.get_same(&id("g:a:9")).unwrap().id(), &id("g:a:1"));
        assert_eq!(c.all_same(&id("g:a:9")).len(), 2);
        assert!(c.contains_same(&id("g:b:5")));
        assert!(!c.contains_exact(&id("g:b:5")));
    }

    #[test]
    fn collection_remove_same_and_exact() {
        let mut c: ArtifactCollection = ["g:a:1", "g:b:1", "g:a:2"]
            .into_iter()
            .map(artifact)
            .collect();

        let removed = c.remove_same(&id("g:a:0"));
        assert_eq!(removed.len(), 2);
        assert_eq!(c.ids(), vec![id("g:b:1")]);

        assert!(c.remove_exact(&id("g:b:2")).is_none());
        assert!(c.remove_exact(&id("g:b:1")).is_some());
        assert!(c.is_empty());
    }

    #[test]
    fn collection_insert_at_position() {
        let mut c: ArtifactCollection = ["g:a:1", "g:c:1"].into_iter().map(artifact).collect();
        assert!(c.insert(1, artifact("g:b:1")));
        assert!(c.insert(99, artifact("g:d:1")));
        assert_eq!(
            c.ids(),
            vec![id("g:a:1"), id("g:b:1"), id("g:c:1"), id("g:d:1")]
        );
    }
}
