//! Maven-style artifact coordinates
//!
//! Provides [`ArtifactId`], the immutable `group:artifact:version` coordinate
//! (with optional classifier and type) used to identify features, bundles and
//! extension artifacts.
//!
//! Three textual forms are supported:
//! - mvn id: `group:artifact[:type[:classifier]]:version`
//! - mvn url: `mvn:group/artifact/version[/type[/classifier]]`
//! - mvn path: `group/as/path/artifact/version/artifact-version[-classifier].type`

use crate::version::{compare_versions, Version};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Default artifact type
pub const DEFAULT_TYPE: &str = "jar";

/// Type alias normalized to [`DEFAULT_TYPE`]
const BUNDLE_TYPE: &str = "bundle";

/// URL scheme prefix for the mvn url form
const MVN_SCHEME: &str = "mvn:";

/// Maven coordinate of an artifact
///
/// # Invariants
/// - `group_id`, `artifact_id` and `version` are non-empty
/// - no component contains `:` or `/`
/// - `type` is never empty; `bundle` is normalized to `jar`
/// - an empty classifier is stored as `None`
///
/// Equality and hashing follow the canonical mvn id. Ordering compares
/// group and artifact lexically, then versions with OSGi semantics (falling
/// back to lexical comparison), then type and classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactId {
    group_id: String,
    artifact_id: String,
    version: String,
    classifier: Option<String>,
    kind: String,
}

impl ArtifactId {
    /// Create new coordinate
    ///
    /// `kind` defaults to `jar` when `None` or empty.
    ///
    /// # Errors
    /// Returns error if a required component is empty or any component
    /// contains a separator character.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        classifier: Option<&str>,
        kind: Option<&str>,
    ) -> Result<Self, ArtifactIdError> {
        let group_id = required("groupId", group_id.into())?;
        let artifact_id = required("artifactId", artifact_id.into())?;
        let version = required("version", version.into())?;

        let classifier = match classifier.map(str::trim) {
            Some(c) if !c.is_empty() => Some(checked("classifier", c.to_string())?),
            _ => None,
        };

        let kind = match kind.map(str::trim) {
            Some(t) if !t.is_empty() && t != BUNDLE_TYPE => checked("type", t.to_string())?,
            _ => DEFAULT_TYPE.to_string(),
        };

        Ok(Self {
            group_id,
            artifact_id,
            version,
            classifier,
            kind,
        })
    }

    /// Parse any of the three supported textual forms
    ///
    /// Strings starting with `mvn:` are read as mvn urls, strings containing
    /// `:` as mvn ids, anything else containing `/` as an mvn url without
    /// scheme.
    ///
    /// # Errors
    /// Returns error if the string matches none of the forms.
    pub fn parse(s: &str) -> Result<Self, ArtifactIdError> {
        let s = s.trim();
        if s.starts_with(MVN_SCHEME) {
            Self::from_mvn_url(s)
        } else if s.contains(':') {
            Self::from_mvn_id(s)
        } else if s.contains('/') {
            Self::from_mvn_url(s)
        } else {
            Err(ArtifactIdError::Unrecognized(s.to_string()))
        }
    }

    /// Parse the colon-delimited form
    ///
    /// Accepted shapes:
    /// - `group:artifact:version`
    /// - `group:artifact:type:version`
    /// - `group:artifact:type:classifier:version`
    ///
    /// # Errors
    /// Returns error on any other number of segments or invalid components.
    pub fn from_mvn_id(s: &str) -> Result<Self, ArtifactIdError> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let invalid = || ArtifactIdError::InvalidMvnId(s.to_string());
        match parts.as_slice() {
            [g, a, v] => Self::new(*g, *a, *v, None, None),
            [g, a, t, v] => Self::new(*g, *a, *v, None, Some(*t)),
            [g, a, t, c, v] => Self::new(*g, *a, *v, Some(*c), Some(*t)),
            _ => Err(invalid()),
        }
        .map_err(|e| match e {
            ArtifactIdError::Empty { .. } | ArtifactIdError::InvalidCharacter { .. } => invalid(),
            other => other,
        })
    }

    /// Parse the slash-delimited url form
    ///
    /// The `mvn:` scheme is optional. A repository prefix terminated by `!`
    /// (`mvn:https://repo!group/artifact/version`) is skipped.
    ///
    /// # Errors
    /// Returns error if fewer than three or more than five segments remain.
    pub fn from_mvn_url(s: &str) -> Result<Self, ArtifactIdError> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix(MVN_SCHEME).unwrap_or(trimmed);
        let body = body.rsplit_once('!').map_or(body, |(_, coords)| coords);

        let parts: Vec<&str> = body.split('/').collect();
        let invalid = || ArtifactIdError::InvalidMvnUrl(s.to_string());
        match parts.as_slice() {
            [g, a, v] => Self::new(*g, *a, *v, None, None),
            [g, a, v, t] => Self::new(*g, *a, *v, None, Some(*t)),
            [g, a, v, t, c] => Self::new(*g, *a, *v, Some(*c), Some(*t)),
            _ => Err(invalid()),
        }
        .map_err(|e| match e {
            ArtifactIdError::Empty { .. } | ArtifactIdError::InvalidCharacter { .. } => invalid(),
            other => other,
        })
    }

    /// Parse a Maven repository path
    ///
    /// `org/example/lib/1.0/lib-1.0-sources.jar` yields
    /// `org.example:lib:jar:sources:1.0`.
    ///
    /// # Errors
    /// Returns error if the path has fewer than four segments or the file
    /// name does not start with `artifact-version`.
    pub fn from_mvn_path(path: &str) -> Result<Self, ArtifactIdError> {
        let invalid = || ArtifactIdError::InvalidMvnPath(path.to_string());
        let segments: Vec<&str> = path.trim().trim_start_matches('/').split('/').collect();
        if segments.len() < 4 {
            return Err(invalid());
        }

        let n = segments.len();
        let file = segments[n - 1];
        let version = segments[n - 2];
        let artifact = segments[n - 3];
        let group = segments[..n - 3].join(".");

        let prefix = format!("{artifact}-{version}");
        let rest = file.strip_prefix(prefix.as_str()).ok_or_else(invalid)?;

        let (classifier, kind) = if let Some(ext) = rest.strip_prefix('.') {
            (None, ext)
        } else if let Some(tail) = rest.strip_prefix('-') {
            let (c, t) = tail.split_once('.').ok_or_else(invalid)?;
            (Some(c), t)
        } else {
            return Err(invalid());
        };

        Self::new(group, artifact, version, classifier, Some(kind)).map_err(|_| invalid())
    }

    /// Group id
    #[inline]
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Artifact id
    #[inline]
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Version string (free-form Maven version)
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Classifier, if any
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Artifact type (`jar` by default)
    #[inline]
    #[must_use]
    pub fn artifact_type(&self) -> &str {
        &self.kind
    }

    /// OSGi interpretation of the version, if convertible
    #[inline]
    #[must_use]
    pub fn osgi_version(&self) -> Option<Version> {
        Version::from_maven(&self.version)
    }

    /// Whether the version is a Maven snapshot
    #[inline]
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with("-SNAPSHOT")
    }

    /// Same artifact ignoring version
    ///
    /// Compares group, artifact, type and classifier.
    #[inline]
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.kind == other.kind
            && self.classifier == other.classifier
    }

    /// Copy with a different version
    ///
    /// # Errors
    /// Returns error if the version is empty or contains a separator.
    pub fn change_version(&self, version: impl Into<String>) -> Result<Self, ArtifactIdError> {
        Ok(Self {
            version: required("version", version.into())?,
            ..self.clone()
        })
    }

    /// Copy with a different classifier (`None` clears it)
    ///
    /// # Errors
    /// Returns error if the classifier contains a separator.
    pub fn change_classifier(&self, classifier: Option<&str>) -> Result<Self, ArtifactIdError> {
        Self::new(
            self.group_id.clone(),
            self.artifact_id.clone(),
            self.version.clone(),
            classifier,
            Some(self.kind.as_str()),
        )
    }

    /// Copy with a different type
    ///
    /// # Errors
    /// Returns error if the type contains a separator.
    pub fn change_type(&self, kind: &str) -> Result<Self, ArtifactIdError> {
        Self::new(
            self.group_id.clone(),
            self.artifact_id.clone(),
            self.version.clone(),
            self.classifier.as_deref(),
            Some(kind),
        )
    }

    /// Canonical colon-delimited form
    #[must_use]
    pub fn to_mvn_id(&self) -> String {
        match (&self.classifier, self.kind.as_str()) {
            (None, DEFAULT_TYPE) => {
                format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
            }
            (None, kind) => format!(
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, kind, self.version
            ),
            (Some(classifier), kind) => format!(
                "{}:{}:{}:{}:{}",
                self.group_id, self.artifact_id, kind, classifier, self.version
            ),
        }
    }

    /// Slash-delimited url form with `mvn:` scheme
    #[must_use]
    pub fn to_mvn_url(&self) -> String {
        let mut url = format!(
            "{MVN_SCHEME}{}/{}/{}",
            self.group_id, self.artifact_id, self.version
        );
        if self.classifier.is_some() || self.kind != DEFAULT_TYPE {
            url.push('/');
            url.push_str(&self.kind);
        }
        if let Some(classifier) = &self.classifier {
            url.push('/');
            url.push_str(classifier);
        }
        url
    }

    /// File name inside a Maven repository
    #[must_use]
    pub fn to_mvn_name(&self) -> String {
        match &self.classifier {
            Some(c) => format!("{}-{}-{}.{}", self.artifact_id, self.version, c, self.kind),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.kind),
        }
    }

    /// Relative path inside a Maven repository
    #[must_use]
    pub fn to_mvn_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.to_mvn_name()
        )
    }
}

fn required(field: &'static str, value: String) -> Result<String, ArtifactIdError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ArtifactIdError::Empty { field });
    }
    checked(field, value)
}

fn checked(field: &'static str, value: String) -> Result<String, ArtifactIdError> {
    if value.contains([':', '/']) || value.chars().any(char::is_whitespace) {
        return Err(ArtifactIdError::InvalidCharacter { field, value });
    }
    Ok(value)
}

impl Ord for ArtifactId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.group_id
            .cmp(&other.group_id)
            .then_with(|| self.artifact_id.cmp(&other.artifact_id))
            .then_with(|| compare_versions(&self.version, &other.version))
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.classifier.cmp(&other.classifier))
    }
}

impl PartialOrd for ArtifactId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for ArtifactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_mvn_id())
    }
}

impl FromStr for ArtifactId {
    type Err = ArtifactIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ArtifactId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_mvn_id())
    }
}

impl<'de> Deserialize<'de> for ArtifactId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors related to artifact coordinates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactIdError {
    /// Required component missing
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// Component contains a separator or whitespace
    #[error("invalid {field}: '{value}'")]
    InvalidCharacter { field: &'static str, value: String },

    /// Malformed colon-delimited id
    #[error("invalid mvn id: '{0}' (expected group:artifact[:type[:classifier]]:version)")]
    InvalidMvnId(String),

    /// Malformed url form
    #[error("invalid mvn url: '{0}' (expected mvn:group/artifact/version[/type[/classifier]])")]
    InvalidMvnUrl(String),

    /// Malformed repository path
    #[error("invalid mvn path: '{0}'")]
    InvalidMvnPath(String),

    /// String matches no known form
    #[error("unrecognized artifact id: '{0}'")]
    Unrecognized(String),
}
