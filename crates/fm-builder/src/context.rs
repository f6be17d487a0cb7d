//! Assembly context
//!
//! [`BuilderContext`] bundles the feature provider, the merge rules and
//! handlers, and the substitution switch. It is built in code with the
//! `with_*` methods, or from an [`AssemblySettings`] document.

use crate::error::BuildResult;
use crate::provider::FeatureProvider;
use fm_merge::{
    ArtifactProvider, ConfigurationPolicy, MergeContext, MergeHandler, OverrideRule,
    PostProcessHandler,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Context for one or more assembly calls
#[derive(Clone)]
pub struct BuilderContext {
    provider: Arc<dyn FeatureProvider>,
    merge: MergeContext,
    substitute_variables: bool,
}

impl BuilderContext {
    /// Create context resolving prototypes through `provider`
    #[must_use]
    pub fn new(provider: impl FeatureProvider + 'static) -> Self {
        Self::from_shared(Arc::new(provider))
    }

    /// Create context around a shared provider
    #[must_use]
    pub fn from_shared(provider: Arc<dyn FeatureProvider>) -> Self {
        Self {
            provider,
            merge: MergeContext::new(),
            substitute_variables: false,
        }
    }

    /// With merge context, replacing rules and handlers
    #[must_use]
    pub fn with_merge_context(mut self, merge: MergeContext) -> Self {
        self.merge = merge;
        self
    }

    /// With artifact override rule
    #[must_use]
    pub fn with_artifact_override(mut self, rule: OverrideRule) -> Self {
        self.merge.add_artifact_overrides([rule]);
        self
    }

    /// With configuration policy for PIDs matching `pattern`
    ///
    /// # Errors
    /// Returns error if the pattern does not form a valid expression.
    pub fn with_configuration_override(
        mut self,
        pattern: &str,
        policy: ConfigurationPolicy,
    ) -> BuildResult<Self> {
        self.merge.configuration_overrides_mut().add(pattern, policy)?;
        Ok(self)
    }

    /// With variable override
    #[must_use]
    pub fn with_variable_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.merge.variable_overrides_mut().insert(key.into(), value.into());
        self
    }

    /// With framework property override
    #[must_use]
    pub fn with_framework_property_override(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.merge
            .framework_property_overrides_mut()
            .insert(key.into(), value.into());
        self
    }

    /// With extension merge handler
    #[must_use]
    pub fn with_merge_handler(mut self, id: impl Into<String>, handler: Arc<dyn MergeHandler>) -> Self {
        self.merge = std::mem::take(&mut self.merge).with_merge_handler(id, handler);
        self
    }

    /// With post-process handler
    #[must_use]
    pub fn with_post_process_handler(
        mut self,
        id: impl Into<String>,
        handler: Arc<dyn PostProcessHandler>,
    ) -> Self {
        self.merge = std::mem::take(&mut self.merge).with_post_process_handler(id, handler);
        self
    }

    /// With artifact provider for handlers
    #[must_use]
    pub fn with_artifact_provider(mut self, provider: Arc<dyn ArtifactProvider>) -> Self {
        self.merge = std::mem::take(&mut self.merge).with_artifact_provider(provider);
        self
    }

    /// With variable substitution over assembled features
    #[inline]
    #[must_use]
    pub fn with_variable_substitution(mut self, enabled: bool) -> Self {
        self.substitute_variables = enabled;
        self
    }

    /// Apply a settings document on top of the current state
    ///
    /// Rules and policies are appended after existing ones, maps are
    /// overlaid key by key.
    ///
    /// # Errors
    /// Returns error if a configuration pattern is invalid.
    pub fn apply(&mut self, settings: &AssemblySettings) -> BuildResult<()> {
        self.merge
            .add_artifact_overrides(settings.artifact_overrides.iter().cloned());
        for (pattern, policy) in &settings.config_overrides {
            self.merge.configuration_overrides_mut().add(pattern, *policy)?;
        }
        self.merge
            .variable_overrides_mut()
            .extend(settings.variable_overrides.clone());
        self.merge
            .framework_property_overrides_mut()
            .extend(settings.framework_property_overrides.clone());
        for (handler, configuration) in &settings.handler_configuration {
            self.merge
                .handler_configuration_mut()
                .entry(handler.clone())
                .or_default()
                .extend(configuration.clone());
        }
        if let Some(enabled) = settings.substitute_variables {
            self.substitute_variables = enabled;
        }
        tracing::debug!(
            artifact_overrides = settings.artifact_overrides.len(),
            config_overrides = settings.config_overrides.len(),
            "applied assembly settings"
        );
        Ok(())
    }

    /// Feature provider
    #[inline]
    #[must_use]
    pub fn provider(&self) -> &dyn FeatureProvider {
        self.provider.as_ref()
    }

    /// Merge rules and handlers
    #[inline]
    #[must_use]
    pub fn merge_context(&self) -> &MergeContext {
        &self.merge
    }

    /// Mutable merge rules and handlers
    #[inline]
    pub fn merge_context_mut(&mut self) -> &mut MergeContext {
        &mut self.merge
    }

    /// Whether assembled features get variables substituted
    #[inline]
    #[must_use]
    pub fn substitutes_variables(&self) -> bool {
        self.substitute_variables
    }
}

impl fmt::Debug for BuilderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderContext")
            .field("merge", &self.merge)
            .field("substitute_variables", &self.substitute_variables)
            .finish_non_exhaustive()
    }
}

/// Serializable assembly settings
///
/// ```yaml
/// artifact_overrides: ["org.example:*:HIGHEST"]
/// config_overrides:
///   "org.apache.*": MERGE_LATEST
/// variable_overrides: { name: value }
/// handler_configuration:
///   all: { key: value }
/// substitute_variables: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblySettings {
    /// Artifact clash rules, in priority order
    pub artifact_overrides: Vec<OverrideRule>,
    /// Configuration policies by PID pattern
    pub config_overrides: IndexMap<String, ConfigurationPolicy>,
    /// Variable values that win over any feature's
    pub variable_overrides: IndexMap<String, String>,
    /// Framework property values that win over any feature's
    pub framework_property_overrides: IndexMap<String, String>,
    /// Handler configuration keyed by handler id or `all`
    pub handler_configuration: IndexMap<String, IndexMap<String, String>>,
    /// Substitute variables in assembled features; unset keeps the context's choice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitute_variables: Option<bool>,
}

impl AssemblySettings {
    /// Parse from YAML
    ///
    /// # Errors
    /// Returns error on malformed YAML, unknown keys, policies or rules.
    pub fn from_yaml(text: &str) -> BuildResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse from JSON
    ///
    /// # Errors
    /// Returns error on malformed JSON, unknown keys, policies or rules.
    pub fn from_json(text: &str) -> BuildResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
