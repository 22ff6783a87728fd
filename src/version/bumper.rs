//! Semantic version bump rules.

use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// Which component of the version a release increments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionBump {
    /// x.y.Z
    #[default]
    Patch,
    /// x.Y.0
    Minor,
    /// X.0.0
    Major,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBump::Patch => write!(f, "patch"),
            VersionBump::Minor => write!(f, "minor"),
            VersionBump::Major => write!(f, "major"),
        }
    }
}

/// Applies [`VersionBump`]s to a starting version
#[derive(Debug, Clone)]
pub struct VersionBumper {
    current: Version,
}

impl VersionBumper {
    /// Create a bumper starting from `current`
    pub fn from_version(current: Version) -> Self {
        Self { current }
    }

    /// Compute the next version. Lower components reset to zero and any
    /// pre-release or build metadata is dropped.
    pub fn bump(&self, kind: VersionBump) -> Version {
        let mut next = self.current.clone();
        match kind {
            VersionBump::Patch => next.patch += 1,
            VersionBump::Minor => {
                next.minor += 1;
                next.patch = 0;
            }
            VersionBump::Major => {
                next.major += 1;
                next.minor = 0;
                next.patch = 0;
            }
        }
        next.pre = Prerelease::EMPTY;
        next.build = BuildMetadata::EMPTY;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_rules() {
        let bumper = VersionBumper::from_version(Version::new(1, 4, 7));
        assert_eq!(bumper.bump(VersionBump::Patch), Version::new(1, 4, 8));
        assert_eq!(bumper.bump(VersionBump::Minor), Version::new(1, 5, 0));
        assert_eq!(bumper.bump(VersionBump::Major), Version::new(2, 0, 0));
    }

    #[test]
    fn patch_is_the_default_kind() {
        assert_eq!(VersionBump::default(), VersionBump::Patch);
        assert_eq!(VersionBump::Minor.to_string(), "minor");
    }
}
