//! Pluggable extension handlers
//!
//! Merge handlers take over the merge of extensions they recognize; post
//! process handlers see every extension of the merged feature once merging
//! is done. Both receive a [`HandlerContext`] carrying the optional
//! [`ArtifactProvider`] and the handler's resolved configuration.
//!
//! Handlers are registered under an explicit identifier, which is also the
//! key for their configuration.

use crate::error::MergeResult;
use fm_artifact::ArtifactId;
use fm_model::{Extension, Feature};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Configuration key applied to every handler
pub const ALL_HANDLERS: &str = "all";

/// Locates artifact binaries for handlers
pub trait ArtifactProvider: Send + Sync {
    /// Location of the artifact, if known
    fn provide(&self, id: &ArtifactId) -> Option<Url>;
}

impl<F> ArtifactProvider for F
where
    F: Fn(&ArtifactId) -> Option<Url> + Send + Sync,
{
    fn provide(&self, id: &ArtifactId) -> Option<Url> {
        self(id)
    }
}

/// Extension merge handler
pub trait MergeHandler: Send + Sync {
    /// Whether this handler owns the merge of `extension`
    fn can_merge(&self, extension: &Extension) -> bool;

    /// Merge `source_extension` from `source` into `target`
    ///
    /// `target_extension` holds the target's extension of the same name, if
    /// any; whatever it holds afterwards becomes the target's extension.
    ///
    /// # Errors
    /// Returns error if the extensions cannot be merged.
    fn merge(
        &self,
        context: &HandlerContext<'_>,
        target: &mut Feature,
        source: &Feature,
        target_extension: &mut Option<Extension>,
        source_extension: &Extension,
    ) -> MergeResult<()>;
}

/// Hook run for every extension of a merged feature
pub trait PostProcessHandler: Send + Sync {
    /// Inspect or adjust `feature` in light of `extension`
    ///
    /// # Errors
    /// Returns error if post-processing fails.
    fn post_process(
        &self,
        context: &HandlerContext<'_>,
        feature: &mut Feature,
        extension: &Extension,
    ) -> MergeResult<()>;
}

/// Handler plus the identifier it was registered under
pub struct Registered<H: ?Sized> {
    id: String,
    handler: Arc<H>,
}

impl<H: ?Sized> Registered<H> {
    /// Wrap handler
    #[must_use]
    pub fn new(id: impl Into<String>, handler: Arc<H>) -> Self {
        Self {
            id: id.into(),
            handler,
        }
    }

    /// Registration identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The handler
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H: ?Sized> Clone for Registered<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H: ?Sized> fmt::Debug for Registered<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registered").field("id", &self.id).finish_non_exhaustive()
    }
}

/// What a handler can see of the merge in progress
pub struct HandlerContext<'a> {
    artifact_provider: Option<&'a dyn ArtifactProvider>,
    configuration: IndexMap<String, String>,
}

impl<'a> HandlerContext<'a> {
    /// Build a context for the handler registered as `handler_id`
    ///
    /// The configuration is the `all` map overlaid by the handler's own map.
    #[must_use]
    pub fn resolve(
        handler_id: &str,
        artifact_provider: Option<&'a dyn ArtifactProvider>,
        handler_configuration: &IndexMap<String, IndexMap<String, String>>,
    ) -> Self {
        let mut configuration = handler_configuration
            .get(ALL_HANDLERS)
            .cloned()
            .unwrap_or_default();
        if let Some(own) = handler_configuration.get(handler_id) {
            for (k, v) in own {
                configuration.insert(k.clone(), v.clone());
            }
        }
        Self {
            artifact_provider,
            configuration,
        }
    }

    /// Artifact provider, if one was supplied
    #[inline]
    #[must_use]
    pub fn artifact_provider(&self) -> Option<&'a dyn ArtifactProvider> {
        self.artifact_provider
    }

    /// Resolved configuration
    #[inline]
    #[must_use]
    pub fn configuration(&self) -> &IndexMap<String, String> {
        &self.configuration
    }

    /// Single configuration value
    #[must_use]
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.configuration.get(key).map(String::as_str)
    }
}

impl fmt::Debug for HandlerContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("has_artifact_provider", &self.artifact_provider.is_some())
            .field("configuration", &self.configuration)
            .finish()
    }
}
