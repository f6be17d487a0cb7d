//! OSGi version semantics
//!
//! Provides [`Version`], the `major.minor.micro.qualifier` version used to
//! order artifacts, plus the Maven-to-OSGi conversion rules used when an
//! artifact carries a free-form Maven version string.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// OSGi semantic version
///
/// Ordering compares `major`, `minor`, `micro` numerically and then the
/// qualifier lexically. An empty qualifier sorts before any non-empty one.
///
/// # Examples
/// - `1` == `1.0` == `1.0.0`
/// - `1.0.0` < `1.0.0.A` < `1.0.0.SNAPSHOT`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    major: u64,
    minor: u64,
    micro: u64,
    qualifier: String,
}

impl Version {
    /// Create version from its components
    #[inline]
    #[must_use]
    pub fn new(major: u64, minor: u64, micro: u64, qualifier: impl Into<String>) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: qualifier.into(),
        }
    }

    /// Parse a strict OSGi version string
    ///
    /// Accepts `major[.minor[.micro[.qualifier]]]`. The qualifier may only
    /// contain ASCII alphanumerics, `_` and `-`.
    ///
    /// # Errors
    /// Returns error if a numeric segment is missing or not a number, or if
    /// the qualifier contains invalid characters.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut parts = s.splitn(4, '.');
        let major = parse_segment(s, parts.next())?;
        let minor = parts.next().map_or(Ok(0), |p| parse_segment(s, Some(p)))?;
        let micro = parts.next().map_or(Ok(0), |p| parse_segment(s, Some(p)))?;
        let qualifier = parts.next().unwrap_or_default();

        if qualifier
            .chars()
            .any(|c| !c.is_ascii_alphanumeric() && c != '_' && c != '-')
        {
            return Err(VersionError::InvalidQualifier(qualifier.to_string()));
        }

        Ok(Self::new(major, minor, micro, qualifier))
    }

    /// Convert a Maven version string to an OSGi version
    ///
    /// Everything before the first `-` is split on `.` and up to three
    /// segments are taken as `major.minor.micro`; further dotted segments
    /// and anything after the `-` form the qualifier.
    ///
    /// Returns `None` if any of the leading numeric segments is not a
    /// non-negative integer.
    ///
    /// # Examples
    /// - `1.2-SNAPSHOT` → `1.2.0.SNAPSHOT`
    /// - `2.0.0.RC1` → `2.0.0.RC1`
    /// - `1.0.0.1-beta` → `1.0.0.1-beta`
    #[must_use]
    pub fn from_maven(version: &str) -> Option<Self> {
        let (numeric, dash_qualifier) = match version.find('-') {
            Some(pos) => (&version[..pos], Some(&version[pos + 1..])),
            None => (version, None),
        };

        let segments: Vec<&str> = numeric.split('.').collect();
        let mut numbers = [0u64; 3];
        for (slot, segment) in numbers.iter_mut().zip(&segments) {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = segment.parse().ok()?;
        }

        let dotted_rest = segments.get(3..).map(|rest| rest.join("."));
        let qualifier = match (dotted_rest, dash_qualifier) {
            (Some(rest), Some(q)) => format!("{rest}-{q}"),
            (Some(rest), None) => rest,
            (None, Some(q)) => q.to_string(),
            (None, None) => String::new(),
        };

        Some(Self::new(numbers[0], numbers[1], numbers[2], qualifier))
    }

    /// Major component
    #[inline]
    #[must_use]
    pub fn major(&self) -> u64 {
        self.major
    }

    /// Minor component
    #[inline]
    #[must_use]
    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// Micro component
    #[inline]
    #[must_use]
    pub fn micro(&self) -> u64 {
        self.micro
    }

    /// Qualifier (empty if none)
    #[inline]
    #[must_use]
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

fn parse_segment(input: &str, segment: Option<&str>) -> Result<u64, VersionError> {
    let segment = segment.ok_or(VersionError::Empty)?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::InvalidNumber {
            input: input.to_string(),
            segment: segment.to_string(),
        });
    }
    segment.parse().map_err(|_| VersionError::InvalidNumber {
        input: input.to_string(),
        segment: segment.to_string(),
    })
}

/// Compare two Maven version strings
///
/// Both are converted with [`Version::from_maven`]; if either conversion
/// fails the strings are compared lexically instead.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (Version::from_maven(a), Version::from_maven(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        _ => a.cmp(b),
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors related to version parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Empty version string
    #[error("version string is empty")]
    Empty,

    /// Non-numeric major/minor/micro segment
    #[error("invalid numeric segment '{segment}' in version '{input}'")]
    InvalidNumber { input: String, segment: String },

    /// Qualifier contains characters outside `[A-Za-z0-9_-]`
    #[error("invalid version qualifier: {0}")]
    InvalidQualifier(String),
}
