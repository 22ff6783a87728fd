//! External process execution shared by the git and npm backends.

use crate::error::{CliError, ReleaseError, Result};
use std::path::Path;
use tokio::process::Command;

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Exit code, if the process was not killed by a signal
    pub code: Option<i32>,
    /// Lossy UTF-8 stdout
    pub stdout: String,
    /// Lossy UTF-8 stderr
    pub stderr: String,
}

impl CommandOutput {
    /// Trimmed stdout
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Best available failure description: stderr, else stdout, else the exit code
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Run `program args...` in `dir` and capture its output.
///
/// `secret_env` values are passed to the child but never logged; only the
/// variable names appear in debug output. A non-zero exit is not an error
/// here, callers decide how to classify it.
pub async fn run(
    program: &str,
    args: &[&str],
    dir: &Path,
    secret_env: &[(&str, &str)],
) -> Result<CommandOutput> {
    let rendered = format!("{} {}", program, args.join(" "));
    if secret_env.is_empty() {
        log::debug!("running `{rendered}` in {}", dir.display());
    } else {
        let names: Vec<&str> = secret_env.iter().map(|(name, _)| *name).collect();
        log::debug!(
            "running `{rendered}` in {} with secret env {:?}",
            dir.display(),
            names
        );
    }

    let mut command = Command::new(program);
    command.args(args).current_dir(dir).kill_on_drop(true);
    for (name, value) in secret_env {
        command.env(name, value);
    }

    let output = command.output().await.map_err(|e| {
        ReleaseError::Cli(CliError::ExecutionFailed {
            command: rendered.clone(),
            reason: e.to_string(),
        })
    })?;

    let result = CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };
    log::trace!("`{rendered}` exited with {:?}", result.code);
    Ok(result)
}
