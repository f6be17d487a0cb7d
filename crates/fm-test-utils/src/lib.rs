//! Testing utilities for the feature model workspace
//!
//! Shared fixtures for features, artifacts and configurations, plus a
//! tracing subscriber for test output.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use fm_artifact::{Artifact, ArtifactId};
use fm_model::{Configuration, ConfigValue, Extension, ExtensionState, Feature, Prototype};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honouring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

pub fn id(s: &str) -> ArtifactId {
    ArtifactId::parse(s).unwrap()
}

pub fn artifact(s: &str) -> Artifact {
    Artifact::new(id(s))
}

pub fn feature(s: &str) -> Feature {
    Feature::new(id(s))
}

pub fn feature_with_bundles(s: &str, bundles: &[&str]) -> Feature {
    let mut f = feature(s);
    for bundle in bundles {
        f.bundles_mut().add(artifact(bundle));
    }
    f
}

pub fn configuration(pid: &str, properties: &[(&str, &str)]) -> Configuration {
    let mut config = Configuration::new(pid).unwrap();
    for (key, value) in properties {
        config.set_property(*key, *value);
    }
    config
}

pub fn string_value(s: &str) -> ConfigValue {
    ConfigValue::from(s)
}

pub fn text_extension(name: &str, text: &str) -> Extension {
    Extension::text(name, ExtensionState::Optional, text).unwrap()
}

pub fn json_extension(name: &str, value: serde_json::Value) -> Extension {
    Extension::json(name, ExtensionState::Optional, value).unwrap()
}

pub fn artifacts_extension(name: &str, state: ExtensionState, artifacts: &[&str]) -> Extension {
    let mut ext = Extension::artifacts(name, state).unwrap();
    let content = ext.artifacts_content_mut().unwrap();
    for a in artifacts {
        content.add(artifact(a));
    }
    ext
}

/// Feature that inherits from `prototype`
pub fn derived_feature(s: &str, prototype: &str) -> Feature {
    feature(s).with_prototype(Prototype::new(id(prototype)))
}

/// Lookup table of features by id, suitable for a map-backed provider
pub fn feature_map<I>(features: I) -> HashMap<ArtifactId, Feature>
where
    I: IntoIterator<Item = Feature>,
{
    features.into_iter().map(|f| (f.id().clone(), f)).collect()
}
