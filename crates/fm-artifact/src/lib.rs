//! Feature Model Artifacts
//!
//! Maven-coordinate identified artifacts with OSGi-aware version ordering.
//!
//! # Core Concepts
//!
//! - [`ArtifactId`]: Immutable `group:artifact[:type[:classifier]]:version` coordinate
//! - [`Version`]: OSGi `major.minor.micro.qualifier` version
//! - [`Artifact`]: Coordinate plus start order, aliases, provenance and metadata
//! - [`ArtifactCollection`]: Insertion-ordered, id-unique artifact list
//!
//! # Example
//!
//! ```rust
//! use fm_artifact::{Artifact, ArtifactCollection, ArtifactId};
//!
//! let id = ArtifactId::parse("org.example:lib:1.0").unwrap();
//! assert_eq!(id.to_mvn_url(), "mvn:org.example/lib/1.0");
//!
//! let mut bundles = ArtifactCollection::new();
//! bundles.add(Artifact::new(id.clone()).with_start_order(20));
//! assert!(bundles.contains_same(&id.change_version("2.0").unwrap()));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifact;
mod collection;
mod id;
mod version;

pub use artifact::{Artifact, ArtifactError, KEY_ALIAS, KEY_FEATURE_ORIGINS, KEY_START_ORDER};
pub use collection::ArtifactCollection;
pub use id::{ArtifactId, ArtifactIdError, DEFAULT_TYPE};
pub use version::{compare_versions, Version, VersionError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn aliased_artifact_found_by_same_lookup() {
        let bundle = Artifact::new(ArtifactId::parse("org.new:api:2.0").unwrap())
            .with_alias(ArtifactId::parse("org.old:api:1.0").unwrap());
        let probe = Artifact::new(ArtifactId::parse("org.old:api:1.5").unwrap());

        let mut bundles = ArtifactCollection::new();
        bundles.add(bundle);

        let matches: Vec<_> = bundles
            .iter()
            .filter(|a| a.is_same_artifact(&probe))
            .collect();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn highest_version_selection() {
        let ids: Vec<ArtifactId> = ["g:a:1.0", "g:a:1.10", "g:a:1.9"]
            .iter()
            .map(|s| ArtifactId::parse(s).unwrap())
            .collect();
        let highest = ids.iter().max().unwrap();
        assert_eq!(highest.version(), "1.10");
    }
}
