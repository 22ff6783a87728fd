//! Classification of commit failures caused by missing hook tooling.
//!
//! git reports hook failures only as free text on stderr, so this is the one
//! place where failure kinds are derived from message content. Everything
//! downstream matches on [`GitError::HookMissing`](crate::error::GitError)
//! instead of strings.
//!
//! Known-fragile boundary: only launcher-level failures count. A line must
//! name the hook script itself (`.husky/...`, `.git/hooks/...`) together
//! with a shell not-found error, husky must report exit code 127, or the
//! Python `pre-commit` shim must report itself missing. A hook that ran and
//! failed, whatever its output says, stays a plain commit failure, which the
//! pipeline treats as hard. Other hook managers and localized shells fall
//! through to the hard path as well.

/// Hook script locations that appear as the prefix of shell errors
const HOOK_SCRIPT_MARKERS: &[&str] = &[".husky/", ".git/hooks/"];

/// Shell errors for an executable or sourced file that does not exist
const LAUNCHER_NOT_FOUND_MARKERS: &[&str] = &[
    ": command not found",
    ": not found",
    ": no such file or directory",
];

/// husky's summary lines (v4-v8, v9) when the hook's command could not be executed
const HUSKY_EXIT_127: &[&str] = &["hook exited with code 127", "script failed (code 127)"];

/// The `pre-commit` framework shim when the tool is not on PATH
const PRE_COMMIT_SHIM_MISSING: &str = "`pre-commit` not found";

/// Hooks named in failure output, most specific first
const HOOK_NAMES: &[&str] = &["commit-msg", "pre-commit"];

/// Whether a failed commit's stderr indicates hook tooling that is configured
/// but not installed.
pub fn is_missing_hook_failure(stderr: &str) -> bool {
    stderr.lines().any(|line| {
        let lowered = line.to_ascii_lowercase();
        let from_hook_script = HOOK_SCRIPT_MARKERS
            .iter()
            .any(|m| lowered.starts_with(m) || lowered.contains(&format!("/{m}")));
        (from_hook_script && LAUNCHER_NOT_FOUND_MARKERS.iter().any(|m| lowered.contains(m)))
            || HUSKY_EXIT_127.iter().any(|m| lowered.contains(m))
            || lowered.starts_with(PRE_COMMIT_SHIM_MISSING)
    })
}

/// Name of the hook that failed, defaulting to `pre-commit`
pub fn failed_hook_name(stderr: &str) -> &'static str {
    let lowered = stderr.to_ascii_lowercase();
    HOOK_NAMES
        .iter()
        .find(|name| lowered.contains(*name))
        .copied()
        .unwrap_or("pre-commit")
}
