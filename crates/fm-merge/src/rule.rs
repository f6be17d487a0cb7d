//! Artifact override rules
//!
//! An [`OverrideRule`] is an artifact-coordinate-shaped pattern whose version
//! position carries an [`OverridePolicy`] instead of a version:
//!
//! ```text
//! group:artifact:POLICY
//! group:artifact:type:POLICY
//! group:artifact:type:classifier:POLICY
//! ```
//!
//! Any of group, artifact, type and classifier may be the wildcard `*`.
//! A rule without a classifier position only matches artifacts without a
//! classifier.

use crate::error::{MergeError, MergeResult};
use fm_artifact::{compare_versions, Artifact, ArtifactId, DEFAULT_TYPE};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Wildcard token
pub const WILDCARD: &str = "*";

/// How to resolve a clash between two versions of the same artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverridePolicy {
    /// Keep both, existing first
    All,
    /// Keep the greater OSGi version
    Highest,
    /// Keep the incoming side
    Latest,
    /// Keep the side with exactly this version, or create it
    Version(String),
}

impl OverridePolicy {
    /// Select survivors for a clash between `existing` and `incoming`
    #[must_use]
    pub fn select(&self, existing: &Artifact, incoming: &Artifact) -> Selection {
        match self {
            Self::All => Selection::Both,
            Self::Latest => Selection::Incoming,
            Self::Highest => {
                match compare_versions(existing.id().version(), incoming.id().version()) {
                    Ordering::Less => Selection::Incoming,
                    Ordering::Equal | Ordering::Greater => Selection::Existing,
                }
            }
            Self::Version(version) => {
                if existing.id().version() == version {
                    Selection::Existing
                } else if incoming.id().version() == version {
                    Selection::Incoming
                } else {
                    Selection::Synthesized(version.clone())
                }
            }
        }
    }
}

impl fmt::Display for OverridePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Highest => f.write_str("HIGHEST"),
            Self::Latest => f.write_str("LATEST"),
            Self::Version(v) => f.write_str(v),
        }
    }
}

impl FromStr for OverridePolicy {
    type Err = MergeError;

    fn from_str(s: &str) -> MergeResult<Self> {
        let s = s.trim();
        Ok(match s {
            "ALL" => Self::All,
            "HIGHEST" => Self::Highest,
            "LATEST" => Self::Latest,
            "" | WILDCARD => return Err(MergeError::InvalidOverrideRule(s.to_string())),
            version => Self::Version(version.to_string()),
        })
    }
}

/// Outcome of applying a policy to one clash
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Existing,
    Incoming,
    Both,
    /// Neither side; a new artifact at this version replaces both
    Synthesized(String),
}

/// Wildcardable coordinate pattern plus policy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverrideRule {
    group_id: String,
    artifact_id: String,
    kind: String,
    classifier: Option<String>,
    policy: OverridePolicy,
}

impl OverrideRule {
    /// Create rule
    ///
    /// `None` for the classifier matches only artifacts without one; use
    /// `Some("*")` to match any classifier.
    #[must_use]
    pub fn new(
        group_id: &str,
        artifact_id: &str,
        kind: &str,
        classifier: Option<&str>,
        policy: OverridePolicy,
    ) -> Self {
        let kind = if kind == "bundle" { DEFAULT_TYPE } else { kind };
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            kind: kind.to_string(),
            classifier: classifier.map(str::to_string),
            policy,
        }
    }

    /// Rule matching every artifact: `*:*:*:*:<policy>`
    #[must_use]
    pub fn catch_all(policy: OverridePolicy) -> Self {
        Self::new(WILDCARD, WILDCARD, WILDCARD, Some(WILDCARD), policy)
    }

    /// Parse `group:artifact[:type[:classifier]]:POLICY`
    ///
    /// # Errors
    /// Returns error on a wrong number of segments, an empty segment or an
    /// empty policy.
    pub fn parse(s: &str) -> MergeResult<Self> {
        let invalid = || MergeError::InvalidOverrideRule(s.to_string());
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid());
        }
        let (g, a, t, c, p) = match parts.as_slice() {
            [g, a, p] => (*g, *a, DEFAULT_TYPE, None, *p),
            [g, a, t, p] => (*g, *a, *t, None, *p),
            [g, a, t, c, p] => (*g, *a, *t, Some(*c), *p),
            _ => return Err(invalid()),
        };
        let policy = p.parse::<OverridePolicy>().map_err(|_| invalid())?;
        Ok(Self::new(g, a, t, c, policy))
    }

    /// Conflict policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &OverridePolicy {
        &self.policy
    }

    /// Whether all four coordinate fields match (exactly or by wildcard)
    #[must_use]
    pub fn matches(&self, id: &ArtifactId) -> bool {
        let field = |pattern: &str, value: &str| pattern == WILDCARD || pattern == value;
        let classifier = match (&self.classifier, id.classifier()) {
            (Some(pattern), _) if pattern == WILDCARD => true,
            (Some(pattern), Some(value)) => pattern == value,
            (None, None) => true,
            _ => false,
        };
        field(self.group_id.as_str(), id.group_id())
            && field(self.artifact_id.as_str(), id.artifact_id())
            && field(self.kind.as_str(), id.artifact_type())
            && classifier
    }

    /// Rule shape that would resolve a clash involving `id`
    #[must_use]
    pub fn hint_for(id: &ArtifactId) -> String {
        format!(
            "{}:{}:{}:{}:(ALL|HIGHEST|LATEST|<version>)",
            id.group_id(),
            id.artifact_id(),
            id.artifact_type(),
            id.classifier().unwrap_or(WILDCARD)
        )
    }
}

/// First rule matching either side of a clash
///
/// The incoming coordinate is tried first, then the existing one, so that
/// aliased artifacts with different coordinates can be covered by a rule
/// for either name.
#[must_use]
pub fn find_rule<'a>(
    rules: &'a [OverrideRule],
    existing: &ArtifactId,
    incoming: &ArtifactId,
) -> Option<&'a OverrideRule> {
    rules
        .iter()
        .find(|r| r.matches(incoming))
        .or_else(|| rules.iter().find(|r| r.matches(existing)))
}

impl fmt::Display for OverrideRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.kind)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{c}")?;
        }
        write!(f, ":{}", self.policy)
    }
}

impl FromStr for OverrideRule {
    type Err = MergeError;

    fn from_str(s: &str) -> MergeResult<Self> {
        Self::parse(s)
    }
}

impl Serialize for OverrideRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OverrideRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
