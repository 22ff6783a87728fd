//! Borrowed dependencies shared by every release step.

use crate::cli::RuntimeConfig;
use crate::config::ReleaseConfig;
use crate::env_config::EnvConfig;

/// Context for executing release phases with all required dependencies
pub struct ReleaseContext<'a, G, P> {
    /// Version control backend
    pub git: &'a G,
    /// Package manager and registry client
    pub npm: &'a P,
    /// Paths, branch, remote and registry settings
    pub config: &'a ReleaseConfig,
    /// Environment-sourced secrets
    pub env: &'a EnvConfig,
    /// Runtime configuration for output
    pub output: &'a RuntimeConfig,
    /// Executables that must be on PATH before anything runs
    pub required_tools: &'a [String],
}
