//! Version management for single-package releases.
//!
//! This module provides semantic version bumping and the strict
//! `MAJOR.MINOR.PATCH` check applied to the manifest version.

mod bumper;

pub use bumper::{VersionBump, VersionBumper};

use crate::error::{Result, VersionError};
use regex::Regex;
use semver::Version;
use std::sync::OnceLock;

/// Pattern every released version must match. Pre-release and build
/// metadata are rejected.
pub const STRICT_VERSION_PATTERN: &str = r"^\d+\.\d+\.\d+$";

fn strict_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(STRICT_VERSION_PATTERN).expect("static pattern compiles"))
}

/// Parse a manifest version, rejecting anything that is not plain
/// `MAJOR.MINOR.PATCH`.
pub fn parse_strict(raw: &str) -> Result<Version> {
    let trimmed = raw.trim();
    if !strict_version_regex().is_match(trimmed) {
        return Err(VersionError::InvalidVersion {
            version: raw.to_string(),
            reason: format!("must match {STRICT_VERSION_PATTERN}"),
        }
        .into());
    }

    Version::parse(trimmed).map_err(|source| {
        VersionError::ParseFailed {
            version: raw.to_string(),
            source,
        }
        .into()
    })
}

/// Tag name used for a released version
pub fn tag_name(version: &Version) -> String {
    format!("v{version}")
}
