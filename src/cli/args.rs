//! Command line argument parsing and validation.
//!
//! One invocation performs one release. Every flag is optional; without
//! flags a patch release runs from the current directory.

use crate::config::{ENV_BRANCH, ENV_REMOTE, ReleaseConfig};
use crate::release::RetryPolicy;
use crate::version::VersionBump;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Release the scaffolder's npm package
#[derive(Parser, Debug)]
#[command(
    name = "scaffold_release",
    version,
    about = "Release the scaffolder's npm package",
    long_about = "Verify, bump, changelog, tag, push, publish and verify a release of the npm package.

A report is written on every run, including failed ones.

Usage:
  scaffold_release            # patch release
  scaffold_release minor
  scaffold_release major --dir ../create-py --branch master"
)]
pub struct Args {
    /// Which version component to increment
    #[arg(value_enum, default_value_t = VersionBump::Patch)]
    pub kind: VersionBump,

    /// Project directory containing package.json
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub dir: PathBuf,

    /// Branch releases must run from [default: main]
    #[arg(long, env = ENV_BRANCH, value_name = "NAME")]
    pub branch: Option<String>,

    /// Remote to push the release to [default: origin]
    #[arg(long, env = ENV_REMOTE, value_name = "NAME")]
    pub remote: Option<String>,

    /// Changelog path, relative to --dir
    #[arg(long, value_name = "PATH")]
    pub changelog: Option<PathBuf>,

    /// Report path, relative to --dir
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Environment variable holding the publish token (its value is never printed)
    #[arg(long, value_name = "VAR")]
    pub token_env: Option<String>,

    /// Secondary registry for scoped packages
    #[arg(long, value_name = "URL")]
    pub secondary_registry: Option<Url>,

    /// Registry verification attempts
    #[arg(long, value_name = "N")]
    pub verify_attempts: Option<u32>,

    /// Seconds between registry verification attempts
    #[arg(long, value_name = "SECS")]
    pub verify_delay: Option<u64>,

    /// Show command-level detail
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.verify_attempts == Some(0) {
            return Err("--verify-attempts must be at least 1".to_string());
        }
        if !self.dir.exists() {
            return Err(format!("Project directory '{}' does not exist", self.dir.display()));
        }
        Ok(())
    }

    /// Layer these flags over environment-derived configuration
    pub fn release_config(&self) -> ReleaseConfig {
        let mut config = ReleaseConfig::from_env();
        config.project_dir = self.dir.clone();
        if let Some(ref branch) = self.branch {
            config.git.release_branch = branch.clone();
        }
        if let Some(ref remote) = self.remote {
            config.git.remote = remote.clone();
        }
        if let Some(ref changelog) = self.changelog {
            config.changelog_path = changelog.clone();
        }
        if let Some(ref report) = self.report {
            config.report_path = report.clone();
        }
        if let Some(ref token_env) = self.token_env {
            config.token_var = token_env.clone();
        }
        if let Some(ref registry) = self.secondary_registry {
            config.secondary_registry = registry.clone();
        }
        if self.verify_attempts.is_some() || self.verify_delay.is_some() {
            config.verification = RetryPolicy::new(
                self.verify_attempts
                    .unwrap_or(config.verification.max_attempts),
                self.verify_delay
                    .map(Duration::from_secs)
                    .unwrap_or(config.verification.delay),
            );
        }
        config
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Runtime configuration that prints nothing but errors
    pub fn quiet() -> Self {
        Self::new(false, true)
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print a numbered step header
    pub fn step(&self, number: usize, total: usize, title: &str) {
        let _ = self.output.step(number, total, title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}
