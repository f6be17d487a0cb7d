//! Merge context
//!
//! Everything a merge needs besides the two features: override rules,
//! configuration policies, property overrides and handlers.

use crate::configurations::{ConfigurationOverrides, ConfigurationPolicy};
use crate::error::MergeResult;
use crate::handler::{ArtifactProvider, HandlerContext, MergeHandler, PostProcessHandler, Registered};
use crate::rule::OverrideRule;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Rules, overrides and handlers for merging features
///
/// Cloning is shallow for handlers and the artifact provider.
#[derive(Clone, Default)]
pub struct MergeContext {
    artifact_overrides: Vec<OverrideRule>,
    configuration_overrides: ConfigurationOverrides,
    variable_overrides: IndexMap<String, String>,
    framework_property_overrides: IndexMap<String, String>,
    merge_handlers: Vec<Registered<dyn MergeHandler>>,
    post_process_handlers: Vec<Registered<dyn PostProcessHandler>>,
    handler_configuration: IndexMap<String, IndexMap<String, String>>,
    artifact_provider: Option<Arc<dyn ArtifactProvider>>,
}

impl MergeContext {
    /// Create context with no rules, overrides or handlers
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an artifact override rule
    #[must_use]
    pub fn with_artifact_override(mut self, rule: OverrideRule) -> Self {
        self.artifact_overrides.push(rule);
        self
    }

    /// Append a configuration policy for a PID pattern
    ///
    /// # Errors
    /// Returns error if the pattern fails to compile.
    pub fn with_configuration_override(
        mut self,
        pattern: &str,
        policy: ConfigurationPolicy,
    ) -> MergeResult<Self> {
        self.configuration_overrides.add(pattern, policy)?;
        Ok(self)
    }

    /// Set a variable override
    #[must_use]
    pub fn with_variable_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variable_overrides.insert(key.into(), value.into());
        self
    }

    /// Set a framework property override
    #[must_use]
    pub fn with_framework_property_override(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.framework_property_overrides
            .insert(key.into(), value.into());
        self
    }

    /// Register a merge handler under `id`
    #[must_use]
    pub fn with_merge_handler(mut self, id: impl Into<String>, handler: Arc<dyn MergeHandler>) -> Self {
        self.merge_handlers.push(Registered::new(id, handler));
        self
    }

    /// Register a post-process handler under `id`
    #[must_use]
    pub fn with_post_process_handler(
        mut self,
        id: impl Into<String>,
        handler: Arc<dyn PostProcessHandler>,
    ) -> Self {
        self.post_process_handlers.push(Registered::new(id, handler));
        self
    }

    /// Set configuration for the handler registered as `id` (or `all`)
    #[must_use]
    pub fn with_handler_configuration(
        mut self,
        id: impl Into<String>,
        configuration: IndexMap<String, String>,
    ) -> Self {
        self.handler_configuration.insert(id.into(), configuration);
        self
    }

    /// Supply an artifact provider for handlers
    #[must_use]
    pub fn with_artifact_provider(mut self, provider: Arc<dyn ArtifactProvider>) -> Self {
        self.artifact_provider = Some(provider);
        self
    }

    /// Append artifact override rules
    pub fn add_artifact_overrides(&mut self, rules: impl IntoIterator<Item = OverrideRule>) {
        self.artifact_overrides.extend(rules);
    }

    /// Mutable configuration policies
    #[inline]
    pub fn configuration_overrides_mut(&mut self) -> &mut ConfigurationOverrides {
        &mut self.configuration_overrides
    }

    /// Mutable variable overrides
    #[inline]
    pub fn variable_overrides_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.variable_overrides
    }

    /// Mutable framework property overrides
    #[inline]
    pub fn framework_property_overrides_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.framework_property_overrides
    }

    /// Mutable handler configuration
    #[inline]
    pub fn handler_configuration_mut(&mut self) -> &mut IndexMap<String, IndexMap<String, String>> {
        &mut self.handler_configuration
    }

    /// Artifact override rules in order
    #[inline]
    #[must_use]
    pub fn artifact_overrides(&self) -> &[OverrideRule] {
        &self.artifact_overrides
    }

    /// Configuration policies
    #[inline]
    #[must_use]
    pub fn configuration_overrides(&self) -> &ConfigurationOverrides {
        &self.configuration_overrides
    }

    /// Variable overrides
    #[inline]
    #[must_use]
    pub fn variable_overrides(&self) -> &IndexMap<String, String> {
        &self.variable_overrides
    }

    /// Framework property overrides
    #[inline]
    #[must_use]
    pub fn framework_property_overrides(&self) -> &IndexMap<String, String> {
        &self.framework_property_overrides
    }

    /// Merge handlers in registration order
    #[inline]
    #[must_use]
    pub fn merge_handlers(&self) -> &[Registered<dyn MergeHandler>] {
        &self.merge_handlers
    }

    /// Post-process handlers in registration order
    #[inline]
    #[must_use]
    pub fn post_process_handlers(&self) -> &[Registered<dyn PostProcessHandler>] {
        &self.post_process_handlers
    }

    /// Artifact provider, if supplied
    #[must_use]
    pub fn artifact_provider(&self) -> Option<&dyn ArtifactProvider> {
        self.artifact_provider.as_deref()
    }

    /// Handler context for the handler registered as `handler_id`
    #[must_use]
    pub fn handler_context(&self, handler_id: &str) -> HandlerContext<'_> {
        HandlerContext::resolve(handler_id, self.artifact_provider(), &self.handler_configuration)
    }
}

impl fmt::Debug for MergeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeContext")
            .field("artifact_overrides", &self.artifact_overrides)
            .field("configuration_overrides", &self.configuration_overrides)
            .field("variable_overrides", &self.variable_overrides)
            .field("framework_property_overrides", &self.framework_property_overrides)
            .field("merge_handlers", &self.merge_handlers)
            .field("post_process_handlers", &self.post_process_handlers)
            .field("handler_configuration", &self.handler_configuration)
            .field("has_artifact_provider", &self.artifact_provider.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::OverridePolicy;

    #[test]
    fn builder_accumulates_in_order() {
        let ctx = MergeContext::new()
            .with_artifact_override(OverrideRule::parse("g:a:HIGHEST").unwrap())
            .with_artifact_override(OverrideRule::catch_all(OverridePolicy::All))
            .with_variable_override("v", "1")
            .with_configuration_override("org.*", ConfigurationPolicy::MergeFirst)
            .unwrap();

        assert_eq!(ctx.artifact_overrides().len(), 2);
        assert_eq!(ctx.artifact_overrides()[0].policy(), &OverridePolicy::Highest);
        assert_eq!(ctx.variable_overrides().get("v").map(String::as_str), Some("1"));
        assert_eq!(
            ctx.configuration_overrides().policy_for("org.x"),
            Some(ConfigurationPolicy::MergeFirst)
        );
        assert!(ctx.artifact_provider().is_none());
    }
}
