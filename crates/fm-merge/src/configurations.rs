//! Configuration collection merge
//!
//! Configurations are matched by PID. A clash is resolved by the
//! [`ConfigurationPolicy`] of the first PID pattern in
//! [`ConfigurationOverrides`] that matches; without one the merge fails.

use crate::error::{MergeError, MergeResult, OriginList};
use fm_artifact::ArtifactId;
use fm_model::{Configuration, ConfigurationCollection};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How to merge two configurations with the same PID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigurationPolicy {
    /// Any clash is fatal
    #[default]
    FailOnClash,
    /// Merge property by property; a key with two different values is fatal
    FailOnPropertyClash,
    /// Replace with the incoming configuration
    UseLatest,
    /// Keep the existing configuration
    UseFirst,
    /// Union of properties, incoming values win
    MergeLatest,
    /// Union of properties, existing values win
    MergeFirst,
}

impl ConfigurationPolicy {
    /// Keyword form
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FailOnClash => "FAIL_ON_CLASH",
            Self::FailOnPropertyClash => "FAIL_ON_PROPERTY_CLASH",
            Self::UseLatest => "USE_LATEST",
            Self::UseFirst => "USE_FIRST",
            Self::MergeLatest => "MERGE_LATEST",
            Self::MergeFirst => "MERGE_FIRST",
        }
    }
}

impl fmt::Display for ConfigurationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigurationPolicy {
    type Err = MergeError;

    fn from_str(s: &str) -> MergeResult<Self> {
        Ok(match s.trim() {
            "FAIL_ON_CLASH" => Self::FailOnClash,
            "FAIL_ON_PROPERTY_CLASH" => Self::FailOnPropertyClash,
            "USE_LATEST" => Self::UseLatest,
            "USE_FIRST" => Self::UseFirst,
            "MERGE_LATEST" => Self::MergeLatest,
            "MERGE_FIRST" => Self::MergeFirst,
            other => return Err(MergeError::InvalidConfigurationPolicy(other.to_string())),
        })
    }
}

/// Ordered PID patterns with their policies
///
/// Patterns are globs where `*` matches any run of characters.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationOverrides {
    entries: Vec<(String, Regex, ConfigurationPolicy)>,
}

impl ConfigurationOverrides {
    /// Create empty override list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Single catch-all pattern with the given policy
    ///
    /// # Errors
    /// Returns error if the pattern fails to compile.
    pub fn uniform(policy: ConfigurationPolicy) -> MergeResult<Self> {
        let mut overrides = Self::new();
        overrides.add("*", policy)?;
        Ok(overrides)
    }

    /// Append a PID pattern
    ///
    /// # Errors
    /// Returns error if the pattern fails to compile.
    pub fn add(&mut self, pattern: &str, policy: ConfigurationPolicy) -> MergeResult<()> {
        self.entries
            .push((pattern.to_string(), glob_regex(pattern)?, policy));
        Ok(())
    }

    /// Append a PID pattern with a policy keyword
    ///
    /// # Errors
    /// Returns error if the keyword is not a known policy or the pattern
    /// fails to compile.
    pub fn add_keyword(&mut self, pattern: &str, keyword: &str) -> MergeResult<()> {
        self.add(pattern, keyword.parse()?)
    }

    /// Policy of the first pattern matching `pid`
    #[must_use]
    pub fn policy_for(&self, pid: &str) -> Option<ConfigurationPolicy> {
        self.entries
            .iter()
            .find(|(_, regex, _)| regex.is_match(pid))
            .map(|(_, _, policy)| *policy)
    }

    /// Patterns and policies in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ConfigurationPolicy)> {
        self.entries.iter().map(|(p, _, policy)| (p.as_str(), *policy))
    }

    /// Whether no pattern is configured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn glob_regex(pattern: &str) -> MergeResult<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$")).map_err(|source| MergeError::InvalidConfigurationPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Merge `source` configurations into `target`
///
/// # Errors
/// Returns [`MergeError::ConfigurationClash`] for a PID clash under
/// `FAIL_ON_CLASH` (also the policy when no pattern matches), or
/// [`MergeError::ConfigurationPropertyClash`] under
/// `FAIL_ON_PROPERTY_CLASH` when one key has two different values.
pub fn merge_configurations(
    target: &mut ConfigurationCollection,
    source: &ConfigurationCollection,
    origin: &ArtifactId,
    overrides: &ConfigurationOverrides,
) -> MergeResult<()> {
    for configuration in source {
        let mut incoming = configuration.clone();
        if incoming.feature_origins().is_empty() {
            incoming.add_feature_origin(origin.clone());
        }

        let Some(existing) = target.get_mut(incoming.pid()) else {
            target.add(incoming);
            continue;
        };

        let policy = overrides.policy_for(incoming.pid()).unwrap_or_default();
        tracing::trace!(pid = incoming.pid(), %policy, feature = %origin, "configuration clash");

        match policy {
            ConfigurationPolicy::FailOnClash => {
                return Err(MergeError::ConfigurationClash {
                    pid: incoming.pid().to_string(),
                    existing: OriginList(existing.feature_origins().to_vec()),
                    feature: origin.clone(),
                });
            }
            ConfigurationPolicy::FailOnPropertyClash => {
                for (key, value) in incoming.properties() {
                    match existing.property(key) {
                        Some(current) if current != value => {
                            return Err(MergeError::ConfigurationPropertyClash {
                                pid: incoming.pid().to_string(),
                                key: key.clone(),
                                existing: current.to_string(),
                                incoming: value.to_string(),
                                feature: origin.clone(),
                            });
                        }
                        Some(_) => {}
                        None => {
                            existing.set_property(key.clone(), value.clone());
                        }
                    }
                }
                add_origins(existing, &incoming);
            }
            ConfigurationPolicy::UseLatest => *existing = incoming,
            ConfigurationPolicy::UseFirst => {}
            ConfigurationPolicy::MergeLatest => {
                for (key, value) in incoming.properties() {
                    existing.set_property(key.clone(), value.clone());
                }
                add_origins(existing, &incoming);
            }
            ConfigurationPolicy::MergeFirst => {
                for (key, value) in incoming.properties() {
                    if existing.property(key).is_none() {
                        existing.set_property(key.clone(), value.clone());
                    }
                }
                add_origins(existing, &incoming);
            }
        }
    }
    Ok(())
}

fn add_origins(existing: &mut Configuration, incoming: &Configuration) {
    for origin in incoming.feature_origins() {
        existing.add_feature_origin(origin.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_model::ConfigValue;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> ArtifactId {
        ArtifactId::parse(s).unwrap()
    }

    fn config(pid: &str, props: &[(&str, &str)]) -> Configuration {
        props.iter().fold(Configuration::new(pid).unwrap(), |c, (k, v)| {
            c.with_property(*k, *v)
        })
    }

    fn collection(configs: Vec<Configuration>) -> ConfigurationCollection {
        configs.into_iter().collect()
    }

    fn value<'a>(c: &'a ConfigurationCollection, pid: &str, key: &str) -> Option<&'a str> {
        c.get(pid)?.property(key).and_then(ConfigValue::as_str)
    }

    #[test]
    fn policy_keywords_round_trip() {
        for keyword in [
            "FAIL_ON_CLASH",
            "FAIL_ON_PROPERTY_CLASH",
            "USE_LATEST",
            "USE_FIRST",
            "MERGE_LATEST",
            "MERGE_FIRST",
        ] {
            let policy: ConfigurationPolicy = keyword.parse().unwrap();
            assert_eq!(policy.to_string(), keyword);
        }
        assert!("MERGE_SOMETIMES".parse::<ConfigurationPolicy>().is_err());
    }

    #[test]
    fn glob_patterns_match_pids() {
        let mut overrides = ConfigurationOverrides::new();
        overrides.add("org.apache.*", ConfigurationPolicy::MergeLatest).unwrap();
        overrides.add("*", ConfigurationPolicy::UseFirst).unwrap();

        assert_eq!(
            overrides.policy_for("org.apache.sling.Foo"),
            Some(ConfigurationPolicy::MergeLatest)
        );
        assert_eq!(overrides.policy_for("com.example"), Some(ConfigurationPolicy::UseFirst));
        assert_eq!(ConfigurationOverrides::new().policy_for("x"), None);
    }

    #[test]
    fn glob_escapes_regex_metacharacters() {
        let mut overrides = ConfigurationOverrides::new();
        overrides.add("a.b", ConfigurationPolicy::UseFirst).unwrap();
        assert_eq!(overrides.policy_for("axb"), None);
        assert_eq!(overrides.policy_for("a.b"), Some(ConfigurationPolicy::UseFirst));
    }

    #[test]
    fn new_pid_is_copied_with_origin() {
        let mut target = ConfigurationCollection::new();
        let source = collection(vec![config("p", &[("k", "v")])]);
        merge_configurations(&mut target, &source, &id("g:f:1"), &ConfigurationOverrides::new())
            .unwrap();
        assert_eq!(value(&target, "p", "k"), Some("v"));
        assert_eq!(target.get("p").unwrap().feature_origins(), &[id("g:f:1")]);
    }

    #[test]
    fn clash_is_fatal_by_default() {
        let mut target = collection(vec![config("p", &[("k", "v")])]);
        let source = collection(vec![config("p", &[("k", "v")])]);
        let err = merge_configurations(
            &mut target,
            &source,
            &id("g:f:1"),
            &ConfigurationOverrides::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::ConfigurationClash { ref pid, .. } if pid == "p"));
    }

    #[test]
    fn property_clash_fails_only_on_differing_key() {
        let overrides = ConfigurationOverrides::uniform(ConfigurationPolicy::FailOnPropertyClash).unwrap();

        let mut target = collection(vec![config("p", &[("same", "1"), ("other", "a")])]);
        let compatible = collection(vec![config("p", &[("same", "1"), ("extra", "x")])]);
        merge_configurations(&mut target, &compatible, &id("g:f:1"), &overrides).unwrap();
        assert_eq!(value(&target, "p", "extra"), Some("x"));

        let clashing = collection(vec![config("p", &[("same", "1"), ("other", "b")])]);
        let err = merge_configurations(&mut target, &clashing, &id("g:f:2"), &overrides)
            .unwrap_err();
        assert!(
            matches!(err, MergeError::ConfigurationPropertyClash { ref key, .. } if key == "other")
        );
    }

    #[test]
    fn use_latest_and_use_first() {
        let existing = || collection(vec![config("p", &[("k", "old"), ("only", "old")])]);
        let source = collection(vec![config("p", &[("k", "new")])]);

        let mut target = existing();
        merge_configurations(
            &mut target,
            &source,
            &id("g:f:1"),
            &ConfigurationOverrides::uniform(ConfigurationPolicy::UseLatest).unwrap(),
        )
        .unwrap();
        assert_eq!(value(&target, "p", "k"), Some("new"));
        assert_eq!(value(&target, "p", "only"), None);

        let mut target = existing();
        merge_configurations(
            &mut target,
            &source,
            &id("g:f:1"),
            &ConfigurationOverrides::uniform(ConfigurationPolicy::UseFirst).unwrap(),
        )
        .unwrap();
        assert_eq!(value(&target, "p", "k"), Some("old"));
    }

    #[test]
    fn merge_latest_and_merge_first() {
        let existing = || collection(vec![config("p", &[("k", "old"), ("a", "1")])]);
        let source = collection(vec![config("p", &[("k", "new"), ("b", "2")])]);

        let mut target = existing();
        merge_configurations(
            &mut target,
            &source,
            &id("g:f:1"),
            &ConfigurationOverrides::uniform(ConfigurationPolicy::MergeLatest).unwrap(),
        )
        .unwrap();
        assert_eq!(value(&target, "p", "k"), Some("new"));
        assert_eq!(value(&target, "p", "a"), Some("1"));
        assert_eq!(value(&target, "p", "b"), Some("2"));

        let mut target = existing();
        merge_configurations(
            &mut target,
            &source,
            &id("g:f:1"),
            &ConfigurationOverrides::uniform(ConfigurationPolicy::MergeFirst).unwrap(),
        )
        .unwrap();
        assert_eq!(value(&target, "p", "k"), Some("old"));
        assert_eq!(value(&target, "p", "b"), Some("2"));
    }
}
