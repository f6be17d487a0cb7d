//! Feature Model
//!
//! The feature aggregate and the entries it is made of.
//!
//! # Core Concepts
//!
//! - [`Feature`]: Bundles, configurations, properties, extensions and flags
//! - [`Configuration`]: PID plus typed, ordered property dictionary
//! - [`Extension`]: Named artifacts, text or JSON payload
//! - [`Prototype`]: Reference to a base feature plus removal instructions
//! - [`PropertyMap`]: Framework properties and variables with metadata
//!
//! # Example
//!
//! ```rust
//! use fm_artifact::{Artifact, ArtifactId};
//! use fm_model::{Configuration, Feature};
//!
//! let mut feature = Feature::new(ArtifactId::parse("org.example:app:1.0").unwrap());
//! feature
//!     .bundles_mut()
//!     .add(Artifact::new(ArtifactId::parse("org.example:core:1.0").unwrap()));
//! feature
//!     .configurations_mut()
//!     .add(Configuration::new("org.example.Service").unwrap().with_property("port", 8080_i64));
//! feature.variables_mut().insert("env", "dev");
//!
//! assert_eq!(feature.bundles().len(), 1);
//! assert_eq!(feature.variables().get("env"), Some("dev"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod configuration;
mod error;
mod extension;
mod feature;
mod properties;
mod prototype;
mod requirement;

pub use configuration::{ConfigValue, Configuration, ConfigurationCollection, FACTORY_SEPARATOR};
pub use error::{json_kind, ModelError, ModelResult};
pub use extension::{Extension, ExtensionContent, ExtensionState, ExtensionType, Extensions, JsonContent};
pub use feature::Feature;
pub use properties::{Property, PropertyMap};
pub use prototype::{split_configuration_removal, Prototype};
pub use requirement::{Capability, Descriptor, Requirement};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
