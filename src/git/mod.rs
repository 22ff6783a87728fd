//! Git operations for release workflows.
//!
//! The pipeline only depends on the [`VersionControl`] trait; [`SystemGit`]
//! implements it by invoking the system `git` binary.

mod config;
pub mod hooks;
mod operations;
mod system_git;

pub use config::GitConfig;
pub use operations::{CommitInfo, PushInfo, TagInfo, VersionControl};
pub use system_git::SystemGit;
