//! # scaffold_release
//!
//! Release automation for the Python-project scaffolder's npm package.
//!
//! One run verifies the repository, installs and tests, builds, bumps the
//! version, updates the changelog, commits and tags, pushes, publishes to
//! the primary registry (and the secondary registry for scoped packages),
//! reads the published version back and writes a report.
//!
//! Failures are either *hard* (returned as [`ReleaseError`], aborting the
//! remaining steps) or *soft* (recorded on the [`ReleaseState`] and shown in
//! the report). The report is written on every run.
//!
//! ## Usage
//!
//! ```bash
//! scaffold_release                 # patch release
//! scaffold_release minor --verbose
//! scaffold_release major --branch master
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod changelog;
pub mod cli;
pub mod config;
pub mod env_config;
pub mod error;
pub mod git;
pub mod metadata;
pub mod process;
pub mod publish;
pub mod release;
pub mod report;
pub mod state;
pub mod version;

pub use cli::Args;
pub use config::ReleaseConfig;
pub use env_config::{EnvConfig, SecretToken};
pub use error::{ReleaseError, Result};
pub use git::{SystemGit, VersionControl};
pub use publish::{NpmCli, PackageManager};
pub use release::{ReleasePipeline, RetryPolicy};
pub use state::{Outcome, ReleasePhase, ReleaseState};
pub use version::VersionBump;
