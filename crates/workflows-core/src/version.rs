//! Kubernetes version parsing, ordering and the skip filter.
//!
//! Job entries carry "generic" versions such as `1.30` or `v1.30.2`, or the
//! `latest` sentinel. [`JobVersion`] orders the sentinel above every pinned
//! version so the filter can compare both kinds uniformly.

use crate::constants::LATEST_VERSION;
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A generic version with two or three numeric components.
///
/// A missing patch component compares as `0`, so `1.28` equals `1.28.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KubeVersion {
    /// Major version number.
    pub major: u64,
    /// Minor version number.
    pub minor: u64,
    /// Patch version number.
    pub patch: u64,
    /// Pre-release identifier (e.g., "alpha.1", "rc.0").
    pub prerelease: Option<String>,
}

impl KubeVersion {
    /// Create a new version.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Create a version with a pre-release identifier.
    #[must_use]
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    /// The `major.minor` version `skew` minors below this one.
    ///
    /// Saturates at minor `0`.
    #[must_use]
    pub const fn minus_minors(&self, skew: u64) -> Self {
        Self::new(self.major, self.minor.saturating_sub(skew), 0)
    }
}

impl FromStr for KubeVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let unprefixed = trimmed.strip_prefix('v').unwrap_or(trimmed);

        // Build metadata never takes part in ordering
        let without_build = unprefixed
            .split_once('+')
            .map_or(unprefixed, |(version, _)| version);

        let (numbers, prerelease) = match without_build.split_once('-') {
            Some((v, p)) if !p.is_empty() => (v, Some(p.to_string())),
            Some(_) => return Err(Error::invalid_version(s)),
            None => (without_build, None),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(Error::invalid_version(s));
        }

        let component = |part: &str| -> Result<u64> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::invalid_version(s));
            }
            part.parse().map_err(|_| Error::invalid_version(s))
        };

        let major = component(parts[0])?;
        let minor = component(parts[1])?;
        let patch = match parts.get(2) {
            Some(&part) => component(part)?,
            None => 0,
        };

        Ok(Self {
            major,
            minor,
            patch,
            prerelease,
        })
    }
}

impl fmt::Display for KubeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl PartialOrd for KubeVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KubeVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            })
    }
}

/// Compare pre-release identifiers field by field: numeric fields compare
/// numerically and rank below alphanumeric ones, and a shorter list that is
/// a prefix of the other sorts first.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let numeric = |id: &str| {
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            id.parse::<u64>().ok()
        } else {
            None
        }
    };

    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match (numeric(x), numeric(y)) {
                (Some(m), Some(n)) => m.cmp(&n),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => x.cmp(y),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

/// The version a job entry targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobVersion {
    /// Track the moving release; greater than every pinned version.
    Latest,
    /// A fixed release.
    Pinned(KubeVersion),
}

impl JobVersion {
    /// Whether this is the `latest` sentinel.
    #[must_use]
    pub const fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl FromStr for JobVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim() == LATEST_VERSION {
            Ok(Self::Latest)
        } else {
            s.parse().map(Self::Pinned)
        }
    }
}

impl fmt::Display for JobVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST_VERSION),
            Self::Pinned(v) => write!(f, "{v}"),
        }
    }
}

impl PartialOrd for JobVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JobVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Latest, Self::Latest) => Ordering::Equal,
            (Self::Latest, Self::Pinned(_)) => Ordering::Greater,
            (Self::Pinned(_), Self::Latest) => Ordering::Less,
            (Self::Pinned(a), Self::Pinned(b)) => a.cmp(b),
        }
    }
}

/// Decide whether a job entry falls outside the supported window.
///
/// `latest` is never skipped. A pinned version is skipped when it is older
/// than `oldest` or, if the group sets one, older than `min`.
#[must_use]
pub fn should_skip(oldest: &KubeVersion, min: Option<&KubeVersion>, job: &JobVersion) -> bool {
    match job {
        JobVersion::Latest => false,
        JobVersion::Pinned(version) => version < oldest || min.is_some_and(|min| version < min),
    }
}
