//! Release state carried across pipeline steps.

use serde::Serialize;
use std::fmt;
use url::Url;

/// Placeholder stored when registry metadata cannot be fetched
pub const METADATA_PLACEHOLDER: &str = "(metadata unavailable)";

/// Final outcome of a release run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Run has not finished yet
    Pending,
    /// Every hard step succeeded
    Completed,
    /// A hard failure aborted the run
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pending => write!(f, "pending"),
            Outcome::Completed => write!(f, "completed"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// Steps of the release pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePhase {
    /// Branch, working tree and manifest version checks
    Preflight,
    /// Clean install and test run
    Dependencies,
    /// Declared build script
    Build,
    /// Version reuse or bump
    Versioning,
    /// Changelog section insertion
    Changelog,
    /// Release commit and annotated tag
    CommitAndTag,
    /// Branch and tag push
    Push,
    /// Publish to the primary registry
    PrimaryPublish,
    /// Publish to the secondary registry
    SecondaryPublish,
    /// Registry read-back
    Verification,
}

impl ReleasePhase {
    /// Every phase in execution order
    pub const ALL: [ReleasePhase; 10] = [
        ReleasePhase::Preflight,
        ReleasePhase::Dependencies,
        ReleasePhase::Build,
        ReleasePhase::Versioning,
        ReleasePhase::Changelog,
        ReleasePhase::CommitAndTag,
        ReleasePhase::Push,
        ReleasePhase::PrimaryPublish,
        ReleasePhase::SecondaryPublish,
        ReleasePhase::Verification,
    ];

    /// 1-based position in the pipeline
    pub fn number(self) -> usize {
        self as usize + 1
    }
}

impl fmt::Display for ReleasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleasePhase::Preflight => write!(f, "Pre-verification"),
            ReleasePhase::Dependencies => write!(f, "Dependencies & tests"),
            ReleasePhase::Build => write!(f, "Build"),
            ReleasePhase::Versioning => write!(f, "Versioning"),
            ReleasePhase::Changelog => write!(f, "Changelog"),
            ReleasePhase::CommitAndTag => write!(f, "Commit & tag"),
            ReleasePhase::Push => write!(f, "Push"),
            ReleasePhase::PrimaryPublish => write!(f, "Publish (primary registry)"),
            ReleasePhase::SecondaryPublish => write!(f, "Publish (secondary registry)"),
            ReleasePhase::Verification => write!(f, "Verification"),
        }
    }
}

/// Mutable record threaded through every release step
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseState {
    /// Timestamp when the run started
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Version being released, once determined
    pub version: Option<semver::Version>,
    /// Head commit after push
    pub commit_identifier: Option<String>,
    /// Changelog lines for this release
    pub change_entries: Vec<String>,
    /// Soft failures with no remediation attached
    pub warnings: Vec<String>,
    /// Problems encountered during the run
    pub issues: Vec<String>,
    /// Remediations applied or suggested for `issues`
    pub applied_solutions: Vec<String>,
    /// Raw registry metadata for the published package
    pub package_metadata: String,
    /// Registries the package was published to
    pub registry_locations: Vec<Url>,
    /// Phase that raised the hard failure, if any
    pub failed_phase: Option<ReleasePhase>,
    /// Final outcome
    pub outcome: Outcome,
}

impl Default for ReleaseState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseState {
    /// Create a new release state
    pub fn new() -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            version: None,
            commit_identifier: None,
            change_entries: Vec::new(),
            warnings: Vec::new(),
            issues: Vec::new(),
            applied_solutions: Vec::new(),
            package_metadata: String::new(),
            registry_locations: Vec::new(),
            failed_phase: None,
            outcome: Outcome::Pending,
        }
    }

    /// Record a soft failure that has no remediation
    pub fn record_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.warnings.push(message);
    }

    /// Record a soft failure together with its remediation
    pub fn record_issue(&mut self, issue: impl Into<String>, solution: impl Into<String>) {
        let issue = issue.into();
        log::warn!("{issue}");
        self.issues.push(issue);
        self.applied_solutions.push(solution.into());
    }

    /// Add a registry URL, ignoring duplicates
    pub fn add_registry(&mut self, url: Url) {
        if !self.registry_locations.contains(&url) {
            self.registry_locations.push(url);
        }
    }

    /// Warnings followed by issues, in recording order
    pub fn all_issues(&self) -> impl Iterator<Item = &str> {
        self.warnings
            .iter()
            .chain(self.issues.iter())
            .map(String::as_str)
    }

    /// Close the run. `hard_failure` carries the aborting phase and error
    /// message, if any.
    ///
    /// Only the first call has an effect; the outcome never leaves a
    /// terminal value once set.
    pub fn finalize(&mut self, hard_failure: Option<(ReleasePhase, &str)>) {
        if self.outcome != Outcome::Pending {
            return;
        }
        match hard_failure {
            Some((phase, message)) => {
                self.issues
                    .push(format!("Release aborted during {phase}: {message}"));
                self.failed_phase = Some(phase);
                self.outcome = Outcome::Failed;
            }
            None => self.outcome = Outcome::Completed,
        }
    }

    /// One-line summary of the release state
    pub fn summary(&self) -> String {
        let version = self
            .version
            .as_ref()
            .map(|v| format!("v{v}"))
            .unwrap_or_else(|| "(unversioned)".to_string());
        format!(
            "Release {} {} - {} issue(s), {} registr{}",
            version,
            self.outcome,
            self.warnings.len() + self.issues.len(),
            self.registry_locations.len(),
            if self.registry_locations.len() == 1 { "y" } else { "ies" }
        )
    }
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
