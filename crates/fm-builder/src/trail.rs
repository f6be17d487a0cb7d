//! Assembly bookkeeping
//!
//! Tracks the chain of features currently being assembled, for cycle
//! detection, and every prototype id dereferenced during one top-level
//! call. A trail is never shared between calls.

use crate::error::{BuildError, BuildResult};
use fm_artifact::ArtifactId;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub(crate) struct AssemblyTrail {
    path: Vec<ArtifactId>,
    included: HashSet<ArtifactId>,
}

impl AssemblyTrail {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start assembling `id`
    ///
    /// # Errors
    /// Returns [`BuildError::Cycle`] if `id` is already on the path.
    pub(crate) fn enter(&mut self, id: &ArtifactId) -> BuildResult<()> {
        if self.path.contains(id) {
            let mut path = self.path.clone();
            path.push(id.clone());
            return Err(BuildError::Cycle { path });
        }
        self.path.push(id.clone());
        Ok(())
    }

    /// Finish the innermost feature
    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }

    /// Record a dereferenced prototype
    pub(crate) fn include(&mut self, id: &ArtifactId) {
        self.included.insert(id.clone());
    }

    pub(crate) fn is_included(&self, id: &ArtifactId) -> bool {
        self.included.contains(id)
    }
}
