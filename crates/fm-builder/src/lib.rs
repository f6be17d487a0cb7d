//! Feature Assembly
//!
//! Turns features that inherit from prototypes into self-contained
//! features, and aggregates independent features into one.
//!
//! # Example
//!
//! ```rust
//! use fm_artifact::{Artifact, ArtifactId};
//! use fm_builder::{assemble, BuilderContext, MapFeatureProvider};
//! use fm_model::{Feature, Prototype};
//!
//! let id = |s: &str| ArtifactId::parse(s).unwrap();
//!
//! let mut base = Feature::new(id("org.example:base:1"));
//! base.bundles_mut().add(Artifact::new(id("org.example:core:1")));
//!
//! let app = Feature::new(id("org.example:app:1"))
//!     .with_prototype(Prototype::new(id("org.example:base:1")));
//!
//! let context = BuilderContext::new(MapFeatureProvider::new().with_feature(base));
//! let assembled = assemble(&app, &context).unwrap();
//!
//! assert!(assembled.is_assembled());
//! assert_eq!(assembled.bundles().ids(), vec![id("org.example:core:1")]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod assembler;
mod context;
mod dedup;
mod error;
mod provider;
mod removal;
mod trail;

pub use assembler::{assemble, assemble_many, ASSEMBLED_FEATURES};
pub use context::{AssemblySettings, BuilderContext};
pub use dedup::deduplicate;
pub use error::{BuildError, BuildResult};
pub use provider::{ArtifactProvider, FeatureProvider, MapFeatureProvider};
pub use removal::apply_removals;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
