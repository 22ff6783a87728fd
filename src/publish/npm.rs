//! npm CLI backend for [`PackageManager`].

use crate::env_config::SecretToken;
use crate::error::{PackageError, Result};
use crate::process::{self, CommandOutput};
use crate::publish::PackageManager;
use semver::Version;
use std::path::{Path, PathBuf};
use url::Url;

/// Variables the token is exported under for the child npm process.
/// The project's `.npmrc` is expected to reference one of them.
const TOKEN_ENV_VARS: &[&str] = &["NPM_TOKEN", "NODE_AUTH_TOKEN"];

/// The npm executable, resolved on PATH
const NPM: &str = "npm";

/// Package manager backed by the `npm` executable
#[derive(Debug, Clone)]
pub struct NpmCli {
    project_dir: PathBuf,
}

impl NpmCli {
    /// npm operating on the package in `project_dir`
    pub fn new(project_dir: &Path) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
        }
    }

    async fn npm(&self, args: &[&str]) -> Result<CommandOutput> {
        process::run(NPM, args, &self.project_dir, &[]).await
    }

    async fn npm_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.npm(args).await?;
        ensure_success(args, &output)?;
        Ok(output)
    }

    async fn npm_with_token(&self, args: &[&str], token: &SecretToken) -> Result<CommandOutput> {
        let env: Vec<(&str, &str)> = TOKEN_ENV_VARS
            .iter()
            .map(|name| (*name, token.expose()))
            .collect();
        let output = process::run(NPM, args, &self.project_dir, &env).await?;
        ensure_success(args, &output)?;
        Ok(output)
    }
}

fn ensure_success(args: &[&str], output: &CommandOutput) -> Result<()> {
    if output.success {
        return Ok(());
    }
    Err(PackageError::CommandFailed {
        command: args.join(" "),
        stderr: output.failure_reason(),
    }
    .into())
}

/// npm reports unknown packages and versions with an E404 code
fn is_not_found(output: &CommandOutput) -> bool {
    output.stderr.contains("E404") || output.stderr.contains("404 Not Found")
}

impl PackageManager for NpmCli {
    async fn clean_install(&self) -> Result<()> {
        self.npm_checked(&["ci"]).await?;
        Ok(())
    }

    async fn run_tests(&self) -> Result<()> {
        self.npm_checked(&["test"]).await?;
        Ok(())
    }

    async fn run_script(&self, name: &str) -> Result<()> {
        self.npm_checked(&["run", name]).await?;
        Ok(())
    }

    async fn normalize_manifest(&self) -> Result<()> {
        self.npm_checked(&["pkg", "fix"]).await?;
        Ok(())
    }

    async fn set_version(&self, version: &Version) -> Result<()> {
        let version = version.to_string();
        self.npm_checked(&[
            "version",
            &version,
            "--no-git-tag-version",
            "--allow-same-version",
        ])
        .await?;
        Ok(())
    }

    async fn publish_public(&self, token: &SecretToken) -> Result<()> {
        self.npm_with_token(&["publish", "--access", "public"], token)
            .await?;
        Ok(())
    }

    async fn publish_to_registry(&self, registry: &Url, token: &SecretToken) -> Result<()> {
        self.npm_with_token(&["publish", "--registry", registry.as_str()], token)
            .await?;
        Ok(())
    }

    async fn published_version(&self, name: &str, version: &Version) -> Result<Option<String>> {
        let spec = format!("{name}@{version}");
        let args = ["view", spec.as_str(), "version"];
        let output = self.npm(&args).await?;
        if !output.success {
            if is_not_found(&output) {
                return Ok(None);
            }
            ensure_success(&args, &output)?;
        }
        let found = output.stdout_trimmed();
        Ok((!found.is_empty()).then(|| found.to_string()))
    }

    async fn package_metadata(&self, name: &str) -> Result<String> {
        let output = self.npm_checked(&["view", name]).await?;
        Ok(output.stdout_trimmed().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(success: bool, stderr: &str) -> CommandOutput {
        CommandOutput {
            success,
            code: Some(if success { 0 } else { 1 }),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn recognises_registry_404() {
        assert!(is_not_found(&output(
            false,
            "npm ERR! code E404\nnpm ERR! 404 No match found for version 9.9.9"
        )));
        assert!(!is_not_found(&output(false, "npm ERR! code ETIMEDOUT")));
    }

    #[test]
    fn failed_commands_carry_their_arguments() {
        let err = ensure_success(&["ci"], &output(false, "lockfile mismatch")).unwrap_err();
        assert_eq!(err.to_string(), "Package error: npm ci failed: lockfile mismatch");
        assert!(ensure_success(&["ci"], &output(true, "")).is_ok());
    }
}
