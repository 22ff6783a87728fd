//! Release command execution.

use crate::cli::{Args, RuntimeConfig};
use crate::env_config::EnvConfig;
use crate::error::{CliError, ReleaseError, Result};
use crate::git::SystemGit;
use crate::publish::NpmCli;
use crate::release::{ReleasePipeline, report_early_failure};
use crate::state::Outcome;
use std::path::{Path, PathBuf};

/// Execute release command
pub(super) async fn execute_release(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let release_config = args.release_config();
    release_config.validate().map_err(|reason| {
        ReleaseError::Cli(CliError::InvalidArguments { reason })
    })?;

    let (project_dir, git) = match open_project(&release_config.project_dir).await {
        Ok(opened) => opened,
        Err(e) => {
            report_early_failure(&release_config, &e);
            return Err(e);
        }
    };
    config.println(&format!(
        "📦 Releasing {} ({} bump)",
        project_dir.display(),
        args.kind
    ));
    config.verbose_println(&format!(
        "Repository {}, branch '{}', remote '{}', token from ${}",
        git.work_tree().display(),
        release_config.git.release_branch,
        release_config.git.remote,
        release_config.token_var
    ));

    let env_config = EnvConfig::from_env(&release_config.token_var);
    let npm = NpmCli::new(&project_dir);

    let pipeline = ReleasePipeline::new(&git, &npm, &release_config, &env_config, config);
    let state = pipeline.run(args.kind).await?;

    config.println("");
    match state.outcome {
        Outcome::Completed => config.success_println(&state.summary()),
        _ => config.warning_println(&state.summary()),
    }
    for issue in state.all_issues() {
        config.indent(&format!("⚠ {issue}"));
    }

    Ok(0)
}

/// Resolve the project directory and the repository containing it
async fn open_project(dir: &Path) -> Result<(PathBuf, SystemGit)> {
    let project_dir = dir.canonicalize()?;
    let git = SystemGit::open(&project_dir).await?;
    Ok((project_dir, git))
}
