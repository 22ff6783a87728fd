//! Release configuration.
//!
//! Values are layered: built-in defaults, then `SCAFFOLD_RELEASE_*`
//! environment variables, then command-line flags (applied by the CLI).

use crate::env_config::DEFAULT_TOKEN_VAR;
use crate::error::{CliError, ReleaseError, Result};
use crate::git::GitConfig;
use crate::release::RetryPolicy;
use crate::report::DEFAULT_REPORT_FILE;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the release branch
pub const ENV_BRANCH: &str = "SCAFFOLD_RELEASE_BRANCH";
/// Environment variable overriding the push remote
pub const ENV_REMOTE: &str = "SCAFFOLD_RELEASE_REMOTE";
/// Environment variable overriding verification attempts
pub const ENV_VERIFY_ATTEMPTS: &str = "SCAFFOLD_RELEASE_VERIFY_ATTEMPTS";
/// Environment variable overriding the delay between verification attempts
pub const ENV_VERIFY_DELAY_SECS: &str = "SCAFFOLD_RELEASE_VERIFY_DELAY_SECS";

/// Default changelog file name
pub const DEFAULT_CHANGELOG_FILE: &str = "CHANGELOG.md";
/// Default registry configuration file name
pub const DEFAULT_REGISTRY_CONFIG_FILE: &str = ".npmrc";
/// Base of public package pages on the primary registry
pub const DEFAULT_PRIMARY_PACKAGE_BASE: &str = "https://www.npmjs.com/package/";
/// Secondary registry for scoped packages
pub const DEFAULT_SECONDARY_REGISTRY: &str = "https://npm.pkg.github.com";

/// Configuration for release operations
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Project directory containing package.json
    pub project_dir: PathBuf,
    /// Git remote and release branch
    pub git: GitConfig,
    /// Changelog path, relative to `project_dir` unless absolute
    pub changelog_path: PathBuf,
    /// Report path, relative to `project_dir` unless absolute
    pub report_path: PathBuf,
    /// Registry configuration file checked before the secondary publish
    pub registry_config_path: PathBuf,
    /// Base URL of package pages on the primary registry
    pub primary_package_base: Url,
    /// Secondary registry URL
    pub secondary_registry: Url,
    /// Environment variable holding the publish token
    pub token_var: String,
    /// Post-publish verification retry policy
    pub verification: RetryPolicy,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            git: GitConfig::default(),
            changelog_path: PathBuf::from(DEFAULT_CHANGELOG_FILE),
            report_path: PathBuf::from(DEFAULT_REPORT_FILE),
            registry_config_path: PathBuf::from(DEFAULT_REGISTRY_CONFIG_FILE),
            primary_package_base: parse_static_url(DEFAULT_PRIMARY_PACKAGE_BASE),
            secondary_registry: parse_static_url(DEFAULT_SECONDARY_REGISTRY),
            token_var: DEFAULT_TOKEN_VAR.to_string(),
            verification: RetryPolicy::default(),
        }
    }
}

fn parse_static_url(raw: &str) -> Url {
    Url::parse(raw).expect("built-in registry URL is valid")
}

/// Parse a numeric environment variable, clamping to `max`
fn parse_env_u64(var_name: &str, default: u64, max: u64) -> u64 {
    std::env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(|v| v.min(max))
        .unwrap_or(default)
}

fn non_empty_env(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ReleaseConfig {
    /// Defaults overlaid with `SCAFFOLD_RELEASE_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(branch) = non_empty_env(ENV_BRANCH) {
            config.git.release_branch = branch;
        }
        if let Some(remote) = non_empty_env(ENV_REMOTE) {
            config.git.remote = remote;
        }
        let defaults = RetryPolicy::default();
        config.verification = RetryPolicy::new(
            parse_env_u64(
                ENV_VERIFY_ATTEMPTS,
                u64::from(defaults.max_attempts),
                u64::from(crate::release::retry::MAX_ATTEMPTS_LIMIT),
            ) as u32,
            Duration::from_secs(parse_env_u64(
                ENV_VERIFY_DELAY_SECS,
                defaults.delay.as_secs(),
                crate::release::retry::MAX_DELAY.as_secs(),
            )),
        );
        config
    }

    /// Resolve a possibly relative path against the project directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// Absolute changelog location
    pub fn changelog_file(&self) -> PathBuf {
        self.resolve(&self.changelog_path)
    }

    /// Absolute report location
    pub fn report_file(&self) -> PathBuf {
        self.resolve(&self.report_path)
    }

    /// The report and its JSON companion. Both are rewritten on every run,
    /// so they are neither part of the clean-tree check nor committed.
    pub fn report_files(&self) -> Vec<PathBuf> {
        let report = self.report_file();
        let json = crate::report::json_path(&report);
        vec![report, json]
    }

    /// Absolute registry configuration location
    pub fn registry_config_file(&self) -> PathBuf {
        self.resolve(&self.registry_config_path)
    }

    /// Host the registry configuration must mention for the secondary publish
    pub fn secondary_host(&self) -> &str {
        self.secondary_registry.host_str().unwrap_or_default()
    }

    /// Public page of `package` on the primary registry
    pub fn primary_package_url(&self, package: &str) -> Result<Url> {
        self.primary_package_base.join(package).map_err(|e| {
            ReleaseError::Cli(CliError::InvalidArguments {
                reason: format!("Cannot build registry URL for '{package}': {e}"),
            })
        })
    }

    /// Location of `package` on the secondary registry
    pub fn secondary_package_url(&self, package: &str) -> Result<Url> {
        let base = self.secondary_registry.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{package}")).map_err(|e| {
            ReleaseError::Cli(CliError::InvalidArguments {
                reason: format!("Cannot build secondary registry URL for '{package}': {e}"),
            })
        })
    }

    /// Validate configuration values are usable
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.git.release_branch.trim().is_empty() {
            return Err("release branch must not be empty".to_string());
        }
        if self.git.remote.trim().is_empty() {
            return Err("remote must not be empty".to_string());
        }
        if self.token_var.trim().is_empty() {
            return Err("token variable name must not be empty".to_string());
        }
        if self.verification.max_attempts == 0 {
            return Err("verification needs at least one attempt".to_string());
        }
        if self.secondary_registry.host_str().is_none() {
            return Err(format!(
                "secondary registry '{}' has no host",
                self.secondary_registry
            ));
        }
        if self.changelog_path.as_os_str().is_empty() || self.report_path.as_os_str().is_empty() {
            return Err("changelog and report paths must not be empty".to_string());
        }
        Ok(())
    }
}
