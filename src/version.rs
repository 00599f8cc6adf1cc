//! Tool version parsing and requirement matching.
//!
//! ThermoRawFileParser prints a bare `major.minor.patch` string for
//! `--version`. Versions and requirements follow semver through the
//! [`semver`] crate; requirements use its comparator syntax, comma
//! separated: `>=1.3.3`, `^1.4`, `>=1.3, <2`.

use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};

/// Requirement checked by default before running anything
pub const DEFAULT_REQUIREMENT: &str = ">=1.3.3";

/// Errors parsing versions or requirements
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    /// Version string is not `major[.minor[.patch]][-pre][+build]`
    #[error("Invalid version '{input}': {source}")]
    InvalidVersion {
        /// Text as reported
        input: String,
        /// Parser message
        #[source]
        source: semver::Error,
    },

    /// Requirement expression could not be parsed
    #[error("Invalid version requirement '{input}': {source}")]
    InvalidRequirement {
        /// Requirement text
        input: String,
        /// Parser message
        #[source]
        source: semver::Error,
    },
}

/// A parsed tool version.
///
/// Banners with fewer than three components (`1.3`, `v2`) are padded with
/// zeros before parsing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolVersion(Version);

impl ToolVersion {
    /// Release version without a pre-release tag
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// The underlying semver version
    pub fn semver(&self) -> &Version {
        &self.0
    }
}

impl FromStr for ToolVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('v');
        let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
        let (numbers, suffix) = trimmed.split_at(split);

        let padding = match numbers.split('.').count() {
            1 => ".0.0",
            2 => ".0",
            _ => "",
        };
        let padded = format!("{}{}{}", numbers, padding, suffix);

        Version::parse(&padded)
            .map(Self)
            .map_err(|source| VersionError::InvalidVersion {
                input: s.to_string(),
                source,
            })
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of comparators that must all hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequirement(VersionReq);

impl VersionRequirement {
    /// True when `version` satisfies every comparator
    pub fn matches(&self, version: &ToolVersion) -> bool {
        self.0.matches(&version.0)
    }
}

impl Default for VersionRequirement {
    fn default() -> Self {
        Self(VersionReq {
            comparators: vec![semver::Comparator {
                op: semver::Op::GreaterEq,
                major: 1,
                minor: Some(3),
                patch: Some(3),
                pre: semver::Prerelease::EMPTY,
            }],
        })
    }
}

impl FromStr for VersionRequirement {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionReq::parse(s.trim())
            .map(Self)
            .map_err(|source| VersionError::InvalidRequirement {
                input: s.to_string(),
                source,
            })
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ToolVersion {
        s.parse().unwrap()
    }

    fn req(s: &str) -> VersionRequirement {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_versions() {
        assert_eq!(v("1.4.3"), ToolVersion::new(1, 4, 3));
        assert_eq!(v(" 1.3\n"), ToolVersion::new(1, 3, 0));
        assert_eq!(v("v2"), ToolVersion::new(2, 0, 0));
        assert_eq!(v("1.4-beta").semver().pre.as_str(), "beta");
        assert_eq!(v("1.4.0-beta+build.5").semver().pre.as_str(), "beta");
        assert!("1.2.3.4".parse::<ToolVersion>().is_err());
        assert!("one.two".parse::<ToolVersion>().is_err());
        assert!("".parse::<ToolVersion>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(v("1.3.3") < v("1.3.4"));
        assert!(v("1.10.0") > v("1.9.9"));
        assert!(v("1.4.0-rc1") < v("1.4.0"));
    }

    #[test]
    fn test_numeric_prerelease_ordering() {
        assert!(v("1.4.0-rc.10") > v("1.4.0-rc.2"));
        assert!(req(">=1.4.0-rc.5").matches(&v("1.4.0-rc.10")));
        assert!(!req(">=1.4.0-rc.5").matches(&v("1.4.0-rc.2")));
    }

    #[test]
    fn test_default_requirement() {
        let requirement = VersionRequirement::default();
        assert_eq!(requirement, req(DEFAULT_REQUIREMENT));
        assert!(requirement.matches(&v("1.3.3")));
        assert!(requirement.matches(&v("1.4.5")));
        assert!(!requirement.matches(&v("1.3.2")));
    }

    #[test]
    fn test_compound_requirement() {
        let requirement = req(">=1.3, <2");
        assert!(requirement.matches(&v("1.9.0")));
        assert!(!requirement.matches(&v("2.0.0")));
        assert!(!requirement.matches(&v("1.2.9")));
    }

    #[test]
    fn test_caret_and_tilde() {
        assert!(req("^1.3").matches(&v("1.9.0")));
        assert!(!req("^1.3").matches(&v("2.0.0")));
        assert!(req("^0.4.1").matches(&v("0.4.7")));
        assert!(!req("^0.4.1").matches(&v("0.5.0")));
        assert!(req("~1.3.3").matches(&v("1.3.9")));
        assert!(!req("~1.3.3").matches(&v("1.4.0")));
    }

    #[test]
    fn test_exact_requirement() {
        assert!(req("=1.4.3").matches(&v("1.4.3")));
        assert!(!req("=1.4.3").matches(&v("1.4.4")));
    }

    #[test]
    fn test_invalid_requirement() {
        assert!(">=".parse::<VersionRequirement>().is_err());
        assert!(">=1.3,".parse::<VersionRequirement>().is_err());
    }

    #[test]
    fn test_requirement_display() {
        assert_eq!(req(">=1.3.3, <2").to_string(), ">=1.3.3, <2");
        assert_eq!(VersionRequirement::default().to_string(), DEFAULT_REQUIREMENT);
    }
}
