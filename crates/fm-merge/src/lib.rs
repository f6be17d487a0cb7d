//! Feature Merge Engine
//!
//! Policy-driven merging of every part of a feature.
//!
//! # Policies
//!
//! | Part                  | Clash resolution                                   |
//! |-----------------------|----------------------------------------------------|
//! | Bundles / artifacts   | [`OverrideRule`]: `ALL`, `HIGHEST`, `LATEST`, version |
//! | Configurations        | [`ConfigurationPolicy`] by PID pattern             |
//! | Properties, variables | Equal values or an override, else fatal            |
//! | Extensions            | Handler, else text join / JSON merge / artifacts   |
//!
//! Unresolvable conflicts are errors; nothing is picked silently.
//!
//! # Example
//!
//! ```rust
//! use fm_artifact::{Artifact, ArtifactCollection, ArtifactId};
//! use fm_merge::{merge_artifacts, OverrideRule};
//!
//! let id = |s: &str| ArtifactId::parse(s).unwrap();
//! let mut target: ArtifactCollection = [Artifact::new(id("g:a:1"))].into_iter().collect();
//! let source: ArtifactCollection = [Artifact::new(id("g:a:2"))].into_iter().collect();
//!
//! let rules = [OverrideRule::parse("g:a:HIGHEST").unwrap()];
//! merge_artifacts(&mut target, &source, &id("g:feature:1"), &rules).unwrap();
//! assert_eq!(target.ids(), vec![id("g:a:2")]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifacts;
mod configurations;
mod context;
mod error;
mod extensions;
mod feature;
mod handler;
mod json;
mod properties;
mod rule;
mod substitute;

pub use artifacts::{merge_artifacts, min_start_order};
pub use configurations::{merge_configurations, ConfigurationOverrides, ConfigurationPolicy};
pub use context::MergeContext;
pub use error::{MergeError, MergeResult, OriginList, PropertyKind};
pub use extensions::{merge_extension, merge_extensions, post_process_extensions};
pub use feature::{merge_feature, MergeMode};
pub use handler::{
    ArtifactProvider, HandlerContext, MergeHandler, PostProcessHandler, Registered, ALL_HANDLERS,
};
pub use json::merge_json;
pub use properties::{merge_properties, overlay_properties};
pub use rule::{find_rule, OverridePolicy, OverrideRule, Selection, WILDCARD};
pub use substitute::{substitute, substitute_feature};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
