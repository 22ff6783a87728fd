//! Human-readable release report.
//!
//! The report is rendered from a finalized [`ReleaseState`] and overwrites
//! any previous report. A JSON rendering of the same state is written next
//! to it for CI consumption.

use crate::error::Result;
use crate::state::ReleaseState;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Default report location, relative to the project directory
pub const DEFAULT_REPORT_FILE: &str = "RELEASE_REPORT.md";

/// Shown for empty list sections
const NONE_MARKER: &str = "- (none)";

/// Render the report text
pub fn render(state: &ReleaseState) -> String {
    let mut out = String::new();
    let version = state
        .version
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "(undetermined)".to_string());
    let commit = state.commit_identifier.as_deref().unwrap_or("(none)");

    // Writing to a String cannot fail
    let _ = writeln!(out, "# Release Report\n");
    let _ = writeln!(out, "- Timestamp: {}", state.timestamp.to_rfc3339());
    let _ = writeln!(out, "- Outcome: {}", state.outcome);
    let _ = writeln!(out, "- Version: {version}");
    let _ = writeln!(out, "- Commit: {commit}");
    if let Some(phase) = state.failed_phase {
        let _ = writeln!(out, "- Failed step: {} ({phase})", phase.number());
    }

    let _ = writeln!(out, "\n## Registries\n");
    push_list(&mut out, state.registry_locations.iter().map(|u| u.as_str()));

    let _ = writeln!(out, "\n## Changes\n");
    push_list(&mut out, state.change_entries.iter().map(String::as_str));

    let _ = writeln!(out, "\n## Issues\n");
    push_list(&mut out, state.all_issues());

    let _ = writeln!(out, "\n## Applied Solutions\n");
    push_list(&mut out, state.applied_solutions.iter().map(String::as_str));

    let _ = writeln!(out, "\n## Package Metadata\n");
    let _ = writeln!(out, "```text");
    if !state.package_metadata.is_empty() {
        let _ = writeln!(out, "{}", state.package_metadata.trim_end());
    }
    let _ = writeln!(out, "```");
    out
}

fn push_list<'a>(out: &mut String, items: impl Iterator<Item = &'a str>) {
    let mut empty = true;
    for item in items {
        empty = false;
        let _ = writeln!(out, "- {item}");
    }
    if empty {
        let _ = writeln!(out, "{NONE_MARKER}");
    }
}

/// Path of the JSON rendering that accompanies `report_path`
pub fn json_path(report_path: &Path) -> PathBuf {
    report_path.with_extension("json")
}

/// Write the text report and its JSON companion, replacing earlier ones
pub fn write(report_path: &Path, state: &ReleaseState) -> Result<()> {
    if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(report_path, render(state))?;
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(json_path(report_path), json)?;
    log::info!("release report written to {}", report_path.display());
    Ok(())
}
