//! Configuration for Git operations.

use crate::version::tag_name;
use semver::Version;

/// Where releases are pushed from and to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitConfig {
    /// Remote that branches and tags are pushed to
    pub remote: String,
    /// The one branch releases may run from
    pub release_branch: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            release_branch: "main".to_string(),
        }
    }
}

impl GitConfig {
    /// Commit message for the release commit
    pub fn commit_message(&self, version: &Version) -> String {
        format!("chore(release): {}", tag_name(version))
    }

    /// Message of the annotated release tag
    pub fn tag_message(&self, version: &Version) -> String {
        format!("Release {}", tag_name(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_messages_use_the_tag_name() {
        let config = GitConfig::default();
        let version = Version::new(1, 0, 1);
        assert_eq!(config.commit_message(&version), "chore(release): v1.0.1");
        assert_eq!(config.tag_message(&version), "Release v1.0.1");
    }
}
