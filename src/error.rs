//! Comprehensive error types for scaffold_release operations.
//!
//! Every variant here is a *hard* failure: it aborts the remaining pipeline
//! steps. Soft failures never become errors, they are recorded on the
//! [`ReleaseState`](crate::state::ReleaseState) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scaffold_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all scaffold_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Repository preconditions not met
    #[error("Preflight error: {0}")]
    Preflight(#[from] PreflightError),

    /// Version management errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Package manager errors
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Changelog errors
    #[error("Changelog error: {0}")]
    Changelog(#[from] ChangelogError),

    /// Retry loop exhausted
    #[error("Retry error: {0}")]
    Retry(#[from] RetryError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Repository preconditions checked before anything is written
#[derive(Error, Debug)]
pub enum PreflightError {
    /// Current branch is not the release branch
    #[error("Releases must run from branch '{expected}', currently on '{actual}'")]
    WrongBranch {
        /// Configured release branch
        expected: String,
        /// Branch that is checked out
        actual: String,
    },

    /// Working directory not clean
    #[error("Working directory not clean. Please commit or stash changes before releasing.")]
    DirtyWorkingTree {
        /// Porcelain status lines
        entries: Vec<String>,
    },

    /// Required executable not on PATH
    #[error("Required tool '{tool}' was not found on PATH")]
    ToolMissing {
        /// Executable name
        tool: String,
    },
}

/// Version management errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Invalid version format
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Version parsing failed
    #[error("Failed to parse version '{version}': {source}")]
    ParseFailed {
        /// Version string
        version: String,
        /// Parsing error
        #[source]
        source: semver::Error,
    },
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Not a git repository
    #[error("Not a git repository: {}", path.display())]
    NotRepository {
        /// Directory that was checked
        path: PathBuf,
    },

    /// A git command exited unsuccessfully
    #[error("git {command} failed: {stderr}")]
    CommandFailed {
        /// Arguments passed to git
        command: String,
        /// Captured stderr
        stderr: String,
    },

    /// Commit rejected because a hook manager is configured but not installed
    #[error("Commit hook '{hook}' could not run: {stderr}")]
    HookMissing {
        /// Hook that failed to launch
        hook: String,
        /// Captured stderr
        stderr: String,
    },

    /// Commit failed
    #[error("Git commit failed: {reason}")]
    CommitFailed {
        /// Reason for the error
        reason: String,
    },

    /// Push failed
    #[error("Git push of {target} to '{remote}' failed: {reason}")]
    PushFailed {
        /// Remote name
        remote: String,
        /// Branch name or "tags"
        target: String,
        /// Reason for the error
        reason: String,
    },
}

/// Package manager errors
#[derive(Error, Debug)]
pub enum PackageError {
    /// package.json missing or unreadable
    #[error("Failed to read manifest at {}: {reason}", path.display())]
    ManifestUnreadable {
        /// Manifest path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Required manifest field missing
    #[error("Manifest field '{field}' is missing or not a string")]
    MissingField {
        /// Field name
        field: String,
    },

    /// Clean dependency install failed
    #[error("Dependency install failed: {reason}")]
    InstallFailed {
        /// Reason for the error
        reason: String,
    },

    /// Declared build script failed
    #[error("Build script failed: {reason}")]
    BuildFailed {
        /// Reason for the error
        reason: String,
    },

    /// Any other npm invocation failed
    #[error("npm {command} failed: {stderr}")]
    CommandFailed {
        /// Arguments passed to npm
        command: String,
        /// Captured stderr
        stderr: String,
    },
}

/// Publishing errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Authentication token absent from the environment
    #[error("Environment variable '{variable}' is not set; refusing to publish")]
    MissingToken {
        /// Name of the variable (never its value)
        variable: String,
    },

    /// Publish command failed
    #[error("Publishing '{package}' to {registry} failed: {reason}")]
    PublishFailed {
        /// Package name
        package: String,
        /// Registry URL
        registry: String,
        /// Reason for the error
        reason: String,
    },

    /// Registry reports a different version than the one published
    #[error("Registry reports '{package}' at {found}, expected {expected}")]
    VersionMismatch {
        /// Package name
        package: String,
        /// Version that was published
        expected: String,
        /// Version the registry returned
        found: String,
    },
}

/// Changelog errors
#[derive(Error, Debug)]
pub enum ChangelogError {
    /// Reading or writing the changelog failed
    #[error("Failed to update changelog at {}: {source}", path.display())]
    Io {
        /// Changelog path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Retry helper errors
#[derive(Error, Debug)]
pub enum RetryError {
    /// Every attempt failed or was rejected
    #[error("{operation} did not succeed after {attempts} attempt(s): {last_failure}")]
    Exhausted {
        /// Human readable operation name
        operation: String,
        /// Attempts made
        attempts: u32,
        /// Description of the final failure
        last_failure: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Preflight(PreflightError::WrongBranch { expected, .. }) => vec![
                format!("Switch to the release branch: git checkout {expected}"),
                "Or pass --branch / set SCAFFOLD_RELEASE_BRANCH if the release branch differs"
                    .to_string(),
            ],
            ReleaseError::Preflight(PreflightError::DirtyWorkingTree { .. }) => vec![
                "Commit pending changes: git add . && git commit -m 'message'".to_string(),
                "Stash changes temporarily: git stash".to_string(),
            ],
            ReleaseError::Preflight(PreflightError::ToolMissing { tool }) => {
                vec![format!("Install '{tool}' and make sure it is on PATH")]
            }
            ReleaseError::Version(VersionError::InvalidVersion { .. }) => vec![
                "Set package.json \"version\" to MAJOR.MINOR.PATCH (e.g. 1.0.0)".to_string(),
            ],
            ReleaseError::Git(GitError::PushFailed { remote, .. }) => vec![
                format!("Verify push access to '{remote}': git remote -v"),
                "Tags and the release commit exist locally; re-running will reuse them"
                    .to_string(),
            ],
            ReleaseError::Publish(PublishError::MissingToken { variable }) => vec![
                format!("Export an npm automation token: export {variable}=<token>"),
            ],
            ReleaseError::Publish(PublishError::VersionMismatch { .. })
            | ReleaseError::Retry(RetryError::Exhausted { .. }) => vec![
                "Check the package page on the registry; propagation can take minutes".to_string(),
                "Raise --verify-attempts or --verify-delay for slow registries".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
