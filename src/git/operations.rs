//! Core version-control trait and types for release management.
//!
//! This module defines the VersionControl trait that specifies every git
//! capability the release pipeline needs. The production implementation is
//! [`SystemGit`](crate::git::SystemGit); tests supply scripted fakes.

use crate::error::Result;
use std::future::Future;
use std::path::PathBuf;

/// Trait defining all required version-control operations for a release
pub trait VersionControl {
    /// Name of the checked-out branch ("HEAD" when detached)
    fn current_branch(&self) -> impl Future<Output = Result<String>>;

    /// Porcelain status entries, untracked files listed individually.
    /// Paths in `excluded` are left out; empty means the working tree is clean.
    fn status_entries(&self, excluded: &[PathBuf]) -> impl Future<Output = Result<Vec<String>>>;

    /// Stage every working-tree change, including deletions, except `excluded`
    fn stage_all(&self, excluded: &[PathBuf]) -> impl Future<Output = Result<()>>;

    /// Whether the index differs from HEAD
    fn has_staged_changes(&self) -> impl Future<Output = Result<bool>>;

    /// Paths currently staged
    fn staged_paths(&self) -> impl Future<Output = Result<Vec<String>>>;

    /// Commit the index. `verify = false` bypasses commit hooks.
    fn commit(&self, message: &str, verify: bool) -> impl Future<Output = Result<CommitInfo>>;

    /// Create an annotated tag on HEAD
    fn create_annotated_tag(&self, name: &str, message: &str)
    -> impl Future<Output = Result<TagInfo>>;

    /// Check if tag exists
    fn tag_exists(&self, name: &str) -> impl Future<Output = Result<bool>>;

    /// Most recent tag reachable from HEAD, if any
    fn latest_tag(&self) -> impl Future<Output = Result<Option<String>>>;

    /// One-line summaries of commits after `since` (all history when `None`), newest first
    fn commit_summaries_since(&self, since: Option<&str>)
    -> impl Future<Output = Result<Vec<String>>>;

    /// Push a branch to a remote
    fn push_branch(&self, remote: &str, branch: &str) -> impl Future<Output = Result<PushInfo>>;

    /// Push all tags to a remote
    fn push_tags(&self, remote: &str) -> impl Future<Output = Result<PushInfo>>;

    /// Full hash of HEAD
    fn head_commit(&self) -> impl Future<Output = Result<String>>;
}

/// Information about a Git commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit hash (full SHA)
    pub hash: String,
    /// Commit message summary
    pub message: String,
}

impl CommitInfo {
    /// Abbreviated hash for display
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }
}

/// Information about a Git tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    /// Tag name
    pub name: String,
}

/// Information about a push operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushInfo {
    /// Any notes git printed (it reports progress on stderr)
    pub notes: Vec<String>,
}
