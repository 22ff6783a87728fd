//! Keep-a-Changelog style section generation and insertion.
//!
//! New sections are inserted after the leading title block and before the
//! first version heading. Everything from that heading on is carried over
//! byte for byte.

use crate::error::{ChangelogError, Result};
use chrono::NaiveDate;
use semver::Version;
use std::path::Path;

/// Title block written when no changelog exists yet
pub const DEFAULT_HEADER: &str = "# Changelog\n\nAll notable changes to this project will be documented in this file.\n\n";

/// Entry used when a release has no collected changes
pub const PLACEHOLDER_ENTRY: &str = "Automatic release";

const VERSION_HEADING_PREFIX: &str = "## [";

/// A changelog section for one release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogSection {
    /// Version for this section
    pub version: Version,
    /// Date of the release
    pub date: NaiveDate,
    /// One line per change
    pub entries: Vec<String>,
}

impl ChangelogSection {
    /// Create a section
    pub fn new(version: Version, date: NaiveDate, entries: Vec<String>) -> Self {
        Self {
            version,
            date,
            entries,
        }
    }

    /// Heading line, e.g. `## [1.0.1] - 2024-05-01`
    pub fn heading(&self) -> String {
        format!(
            "{}{}] - {}",
            VERSION_HEADING_PREFIX,
            self.version,
            self.date.format("%Y-%m-%d")
        )
    }

    /// Render as markdown
    pub fn to_markdown(&self) -> String {
        let mut output = format!("{}\n\n### Changed\n\n", self.heading());
        if self.entries.is_empty() {
            output.push_str(&format!("- {PLACEHOLDER_ENTRY}\n"));
        } else {
            for entry in &self.entries {
                output.push_str(&format!("- {entry}\n"));
            }
        }
        output
    }
}

/// Pick changelog entries: commit summaries if any, else a single synthetic
/// entry listing staged paths, else nothing.
pub fn collect_entries(commit_summaries: Vec<String>, staged_paths: &[String]) -> Vec<String> {
    if !commit_summaries.is_empty() {
        return commit_summaries;
    }
    if staged_paths.is_empty() {
        return Vec::new();
    }
    vec![format!("Updated files: {}", staged_paths.join(", "))]
}

/// Split into (title block, history). History starts at the first version heading.
pub fn split_header(content: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.starts_with(VERSION_HEADING_PREFIX) {
            return content.split_at(offset);
        }
        offset += line.len();
    }
    (content, "")
}

/// Whether a section for `version` is already present
pub fn has_section(content: &str, version: &Version) -> bool {
    let prefix = format!("{VERSION_HEADING_PREFIX}{version}]");
    content.lines().any(|line| line.starts_with(&prefix))
}

/// Insert `section` between the title block and the existing history.
pub fn insert_section(content: &str, section: &ChangelogSection) -> String {
    let (header, history) = split_header(content);

    let mut output = String::with_capacity(content.len() + 256);
    output.push_str(header);
    if !header.is_empty() {
        if !header.ends_with('\n') {
            output.push('\n');
        }
        if !header.ends_with("\n\n") {
            output.push('\n');
        }
    }
    output.push_str(&section.to_markdown());
    if !history.is_empty() {
        output.push('\n');
        output.push_str(history);
    }
    output
}

/// Update the changelog at `path`, creating it if missing.
///
/// Returns `false` without touching the file when a section for this version
/// already exists.
pub fn update_file(path: &Path, section: &ChangelogSection) -> Result<bool> {
    let io_error = |source| ChangelogError::Io {
        path: path.to_path_buf(),
        source,
    };

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => DEFAULT_HEADER.to_string(),
        Err(e) => return Err(io_error(e).into()),
    };

    if has_section(&content, &section.version) {
        return Ok(false);
    }

    std::fs::write(path, insert_section(&content, section)).map_err(io_error)?;
    Ok(true)
}
