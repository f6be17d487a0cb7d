//! OSGi configurations
//!
//! A [`Configuration`] is a PID plus an ordered property dictionary. Factory
//! configurations encode their instance name in the PID as
//! `factoryPid~name`.

use crate::error::{json_kind, ModelError, ModelResult};
use fm_artifact::ArtifactId;
use indexmap::IndexMap;
use std::fmt;

/// Separator between factory PID and instance name
pub const FACTORY_SEPARATOR: char = '~';

/// Typed configuration property value
///
/// Arrays are homogeneous; the element type is fixed by the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Boolean(bool),
    Long(i64),
    Double(f64),
    Strings(Vec<String>),
    Booleans(Vec<bool>),
    Longs(Vec<i64>),
    Doubles(Vec<f64>),
}

impl ConfigValue {
    /// Plain string content, if this is a string value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is an array variant
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Self::Strings(_) | Self::Booleans(_) | Self::Longs(_) | Self::Doubles(_)
        )
    }

    /// Convert to a JSON value
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::from(s.as_str()),
            Self::Boolean(b) => serde_json::Value::from(*b),
            Self::Long(n) => serde_json::Value::from(*n),
            Self::Double(d) => serde_json::Value::from(*d),
            Self::Strings(v) => serde_json::Value::from(v.clone()),
            Self::Booleans(v) => serde_json::Value::from(v.clone()),
            Self::Longs(v) => serde_json::Value::from(v.clone()),
            Self::Doubles(v) => serde_json::Value::from(v.clone()),
        }
    }
}

impl TryFrom<&serde_json::Value> for ConfigValue {
    type Error = ModelError;

    fn try_from(value: &serde_json::Value) -> ModelResult<Self> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Bool(b) => Ok(Self::Boolean(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Long(i)),
                None => n
                    .as_f64()
                    .map(Self::Double)
                    .ok_or_else(|| ModelError::UnsupportedValue(n.to_string())),
            },
            Value::Array(items) => array_value(items),
            other => Err(ModelError::UnsupportedValue(json_kind(other).to_string())),
        }
    }
}

fn array_value(items: &[serde_json::Value]) -> ModelResult<ConfigValue> {
    use serde_json::Value;

    let heterogeneous = || ModelError::HeterogeneousArray(Value::from(items.to_vec()).to_string());

    let Some(first) = items.first() else {
        return Ok(ConfigValue::Strings(Vec::new()));
    };
    match first {
        Value::String(_) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(ConfigValue::Strings)
            .ok_or_else(heterogeneous),
        Value::Bool(_) => items
            .iter()
            .map(Value::as_bool)
            .collect::<Option<Vec<_>>>()
            .map(ConfigValue::Booleans)
            .ok_or_else(heterogeneous),
        Value::Number(_) => {
            if let Some(longs) = items.iter().map(Value::as_i64).collect::<Option<Vec<_>>>() {
                return Ok(ConfigValue::Longs(longs));
            }
            items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<_>>>()
                .map(ConfigValue::Doubles)
                .ok_or_else(heterogeneous)
        }
        other => Err(ModelError::UnsupportedValue(format!(
            "array of {}",
            json_kind(other)
        ))),
    }
}

impl TryFrom<serde_json::Value> for ConfigValue {
    type Error = ModelError;

    fn try_from(value: serde_json::Value) -> ModelResult<Self> {
        Self::try_from(&value)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<f64> for ConfigValue {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(v: Vec<String>) -> Self {
        Self::Strings(v)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// OSGi configuration
///
/// # Identity
/// Equality uses the PID only.
#[derive(Debug, Clone)]
pub struct Configuration {
    pid: String,
    properties: IndexMap<String, ConfigValue>,
    feature_origins: Vec<ArtifactId>,
    artifact_origin: Option<ArtifactId>,
}

impl Configuration {
    /// Create configuration with empty properties
    ///
    /// # Errors
    /// Returns error if the PID is empty.
    pub fn new(pid: impl Into<String>) -> ModelResult<Self> {
        let pid = pid.into();
        if pid.trim().is_empty() {
            return Err(ModelError::EmptyPid);
        }
        Ok(Self {
            pid,
            properties: IndexMap::new(),
            feature_origins: Vec::new(),
            artifact_origin: None,
        })
    }

    /// Create factory configuration `factory_pid~name`
    ///
    /// # Errors
    /// Returns error if either part is empty or the factory PID contains
    /// the separator.
    pub fn factory(factory_pid: &str, name: &str) -> ModelResult<Self> {
        if factory_pid.is_empty() || name.is_empty() || factory_pid.contains(FACTORY_SEPARATOR) {
            return Err(ModelError::InvalidFactoryPid {
                factory_pid: factory_pid.to_string(),
                name: name.to_string(),
            });
        }
        Self::new(format!("{factory_pid}{FACTORY_SEPARATOR}{name}"))
    }

    /// Configuration PID
    #[inline]
    #[must_use]
    pub fn pid(&self) -> &str {
        &self.pid
    }

    /// Whether this is a factory configuration
    #[inline]
    #[must_use]
    pub fn is_factory(&self) -> bool {
        self.pid.contains(FACTORY_SEPARATOR)
    }

    /// Factory PID for factory configurations
    #[must_use]
    pub fn factory_pid(&self) -> Option<&str> {
        self.pid.split_once(FACTORY_SEPARATOR).map(|(f, _)| f)
    }

    /// Instance name for factory configurations
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.pid.split_once(FACTORY_SEPARATOR).map(|(_, n)| n)
    }

    /// Ordered property dictionary
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &IndexMap<String, ConfigValue> {
        &self.properties
    }

    /// Mutable property dictionary
    #[inline]
    pub fn properties_mut(&mut self) -> &mut IndexMap<String, ConfigValue> {
        &mut self.properties
    }

    /// Property value by key
    #[inline]
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&ConfigValue> {
        self.properties.get(key)
    }

    /// Set property, returning the previous value
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Builder-style property
    #[inline]
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Remove property, preserving the order of the rest
    pub fn remove_property(&mut self, key: &str) -> Option<ConfigValue> {
        self.properties.shift_remove(key)
    }

    /// Features that contributed this configuration, in merge order
    #[inline]
    #[must_use]
    pub fn feature_origins(&self) -> &[ArtifactId] {
        &self.feature_origins
    }

    /// Append a feature origin (no-op if already recorded)
    pub fn add_feature_origin(&mut self, origin: ArtifactId) {
        if !self.feature_origins.contains(&origin) {
            self.feature_origins.push(origin);
        }
    }

    /// Replace all feature origins
    pub fn set_feature_origins(&mut self, origins: impl IntoIterator<Item = ArtifactId>) {
        self.feature_origins.clear();
        for origin in origins {
            self.add_feature_origin(origin);
        }
    }

    /// Bundle that embedded this configuration, if any
    #[inline]
    #[must_use]
    pub fn artifact_origin(&self) -> Option<&ArtifactId> {
        self.artifact_origin.as_ref()
    }

    /// Set the embedding bundle
    #[inline]
    pub fn set_artifact_origin(&mut self, origin: Option<ArtifactId>) {
        self.artifact_origin = origin;
    }

    /// Builder-style embedding bundle
    #[inline]
    #[must_use]
    pub fn with_artifact_origin(mut self, origin: ArtifactId) -> Self {
        self.artifact_origin = Some(origin);
        self
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl Eq for Configuration {}

/// Ordered list of configurations with unique PIDs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationCollection {
    configurations: Vec<Configuration>,
}

impl ConfigurationCollection {
    /// Create empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append configuration
    ///
    /// Returns `false` if a configuration with the same PID is present.
    pub fn add(&mut self, configuration: Configuration) -> bool {
        if self.contains(configuration.pid()) {
            return false;
        }
        self.configurations.push(configuration);
        true
    }

    /// Configuration by PID
    #[must_use]
    pub fn get(&self, pid: &str) -> Option<&Configuration> {
        self.configurations.iter().find(|c| c.pid == pid)
    }

    /// Mutable configuration by PID
    pub fn get_mut(&mut self, pid: &str) -> Option<&mut Configuration> {
        self.configurations.iter_mut().find(|c| c.pid == pid)
    }

    /// Whether a configuration with this PID is present
    #[inline]
    #[must_use]
    pub fn contains(&self, pid: &str) -> bool {
        self.configurations.iter().any(|c| c.pid == pid)
    }

    /// Remove configuration by PID
    pub fn remove(&mut self, pid: &str) -> Option<Configuration> {
        let pos = self.configurations.iter().position(|c| c.pid == pid)?;
        Some(self.configurations.remove(pos))
    }

    /// Keep only configurations matching the predicate
    pub fn retain(&mut self, f: impl FnMut(&Configuration) -> bool) {
        self.configurations.retain(f);
    }

    /// All instances of a factory PID
    #[must_use]
    pub fn factory_configurations(&self, factory_pid: &str) -> Vec<&Configuration> {
        self.configurations
            .iter()
            .filter(|c| c.factory_pid() == Some(factory_pid))
            .collect()
    }

    /// Configurations in order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Configuration> {
        self.configurations.iter()
    }

    /// Mutable configurations in order
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Configuration> {
        self.configurations.iter_mut()
    }

    /// Number of configurations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    /// Whether the collection is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// PIDs in order
    #[must_use]
    pub fn pids(&self) -> Vec<&str> {
        self.configurations.iter().map(Configuration::pid).collect()
    }
}

impl<'a> IntoIterator for &'a ConfigurationCollection {
    type Item = &'a Configuration;
    type IntoIter = std::slice::Iter<'a, Configuration>;

    fn into_iter(self) -> Self::IntoIter {
        self.configurations.iter()
    }
}

impl FromIterator<Configuration> for ConfigurationCollection {
    fn from_iter<I: IntoIterator<Item = Configuration>>(iter: I) -> Self {
        let mut collection = Self::new();
        for configuration in iter {
            collection.add(configuration);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn config_value_from_json_scalars() {
        assert_eq!(ConfigValue::try_from(json!("x")).unwrap(), ConfigValue::from("x"));
        assert_eq!(ConfigValue::try_from(json!(true)).unwrap(), ConfigValue::Boolean(true));
        assert_eq!(ConfigValue::try_from(json!(42)).unwrap(), ConfigValue::Long(42));
        assert_eq!(ConfigValue::try_from(json!(1.5)).unwrap(), ConfigValue::Double(1.5));
    }

    #[test]
    fn config_value_from_json_arrays() {
        assert_eq!(
            ConfigValue::try_from(json!(["a", "b"])).unwrap(),
            ConfigValue::Strings(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            ConfigValue::try_from(json!([1, 2])).unwrap(),
            ConfigValue::Longs(vec![1, 2])
        );
        assert_eq!(
            ConfigValue::try_from(json!([1, 2.5])).unwrap(),
            ConfigValue::Doubles(vec![1.0, 2.5])
        );
    }

    #[test]
    fn config_value_rejects_mixed_and_nested() {
        assert!(matches!(
            ConfigValue::try_from(json!(["a", 1])),
            Err(ModelError::HeterogeneousArray(_))
        ));
        assert!(matches!(
            ConfigValue::try_from(json!({"a": 1})),
            Err(ModelError::UnsupportedValue(_))
        ));
        assert!(matches!(
            ConfigValue::try_from(json!([[1]])),
            Err(ModelError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn configuration_factory_pid_parts() {
        let config = Configuration::factory("org.example.Factory", "one").unwrap();
        assert_eq!(config.pid(), "org.example.Factory~one");
        assert!(config.is_factory());
        assert_eq!(config.factory_pid(), Some("org.example.Factory"));
        assert_eq!(config.name(), Some("one"));

        let plain = Configuration::new("org.example.Plain").unwrap();
        assert!(!plain.is_factory());
        assert_eq!(plain.factory_pid(), None);
    }

    #[test]
    fn configuration_rejects_empty_pid() {
        assert!(matches!(Configuration::new(""), Err(ModelError::EmptyPid)));
        assert!(Configuration::factory("a~b", "c").is_err());
        assert!(Configuration::factory("a", "").is_err());
    }

    #[test]
    fn configuration_properties_keep_order() {
        let mut config = Configuration::new("p")
            .unwrap()
            .with_property("z", "1")
            .with_property("a", 2_i64)
            .with_property("m", true);
        config.remove_property("a");
        let keys: Vec<&str> = config.properties().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "m"]);
    }

    #[test]
    fn collection_unique_by_pid() {
        let mut c = ConfigurationCollection::new();
        assert!(c.add(Configuration::new("a").unwrap().with_property("k", "1")));
        assert!(!c.add(Configuration::new("a").unwrap().with_property("k", "2")));
        assert_eq!(c.len(), 1);
        assert_eq!(c.get("a").unwrap().property("k"), Some(&ConfigValue::from("1")));
    }

    #[test]
    fn collection_factory_lookup() {
        let c: ConfigurationCollection = [
            Configuration::factory("f", "one").unwrap(),
            Configuration::new("plain").unwrap(),
            Configuration::factory("f", "two").unwrap(),
        ]
        .into_iter()
        .collect();
        let pids: Vec<&str> = c.factory_configurations("f").iter().map(|c| c.pid()).collect();
        assert_eq!(pids, vec!["f~one", "f~two"]);
    }
}
