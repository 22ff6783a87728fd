//! System git backend.
//!
//! Shells out to the `git` executable for every operation, so the release
//! sees exactly what the developer's own git (hooks, credentials, signing
//! config) would do.

use crate::error::{GitError, Result};
use crate::git::hooks::{failed_hook_name, is_missing_hook_failure};
use crate::git::{CommitInfo, PushInfo, TagInfo, VersionControl};
use crate::process::{self, CommandOutput};
use std::path::{Path, PathBuf};

/// Git backend using system git
#[derive(Debug, Clone)]
pub struct SystemGit {
    /// Working tree root
    work_tree: PathBuf,
}

impl SystemGit {
    /// Open a git repository
    pub async fn open(path: &Path) -> Result<Self> {
        let output = process::run("git", &["rev-parse", "--show-toplevel"], path, &[]).await?;
        if !output.success {
            return Err(GitError::NotRepository {
                path: path.to_path_buf(),
            }
            .into());
        }

        let top = PathBuf::from(output.stdout_trimmed());
        Ok(Self {
            work_tree: top.canonicalize().unwrap_or(top),
        })
    }

    /// Working tree root
    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    async fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        process::run("git", args, &self.work_tree, &[]).await
    }

    /// `path` relative to the working tree root, if it lies inside it.
    ///
    /// The file may not exist yet, so symlinks are resolved through its parent.
    fn relative_to_work_tree(&self, path: &Path) -> Option<String> {
        let absolute = std::path::absolute(path).ok()?;
        let parent = absolute.parent()?.canonicalize().ok()?;
        let resolved = parent.join(absolute.file_name()?);
        let relative = resolved.strip_prefix(&self.work_tree).ok()?;
        Some(relative.to_string_lossy().replace('\\', "/"))
    }

    /// Pathspecs covering the whole working tree minus `excluded`
    fn pathspecs(&self, excluded: &[PathBuf]) -> Vec<String> {
        let mut specs = vec![".".to_string()];
        for path in excluded {
            match self.relative_to_work_tree(path) {
                Some(relative) => specs.push(format!(":(top,exclude){relative}")),
                None => log::debug!("{} is outside the working tree", path.display()),
            }
        }
        specs
    }

    /// Run git and fail on a non-zero exit
    async fn git_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.git(args).await?;
        if !output.success {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: output.failure_reason(),
            }
            .into());
        }
        Ok(output)
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

impl VersionControl for SystemGit {
    async fn current_branch(&self) -> Result<String> {
        let output = self.git_checked(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(output.stdout_trimmed().to_string())
    }

    async fn status_entries(&self, excluded: &[PathBuf]) -> Result<Vec<String>> {
        let specs = self.pathspecs(excluded);
        let mut args = vec!["status", "--porcelain", "--untracked-files=all", "--"];
        args.extend(specs.iter().map(String::as_str));
        let output = self.git_checked(&args).await?;
        Ok(non_empty_lines(&output.stdout))
    }

    async fn stage_all(&self, excluded: &[PathBuf]) -> Result<()> {
        let specs = self.pathspecs(excluded);
        let mut args = vec!["add", "-A", "--"];
        args.extend(specs.iter().map(String::as_str));
        self.git_checked(&args).await?;
        Ok(())
    }

    async fn has_staged_changes(&self) -> Result<bool> {
        // --quiet exits 1 when the index differs from HEAD
        let output = self.git(&["diff", "--cached", "--quiet"]).await?;
        match output.code {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(GitError::CommandFailed {
                command: "diff --cached --quiet".to_string(),
                stderr: output.failure_reason(),
            }
            .into()),
        }
    }

    async fn staged_paths(&self) -> Result<Vec<String>> {
        let output = self.git_checked(&["diff", "--cached", "--name-only"]).await?;
        Ok(non_empty_lines(&output.stdout))
    }

    async fn commit(&self, message: &str, verify: bool) -> Result<CommitInfo> {
        let mut args = vec!["commit", "-m", message];
        if !verify {
            args.push("--no-verify");
        }

        let output = self.git(&args).await?;
        if !output.success {
            let reason = output.failure_reason();
            if verify && is_missing_hook_failure(&reason) {
                return Err(GitError::HookMissing {
                    hook: failed_hook_name(&reason).to_string(),
                    stderr: reason,
                }
                .into());
            }
            return Err(GitError::CommitFailed { reason }.into());
        }

        Ok(CommitInfo {
            hash: self.head_commit().await?,
            message: message.to_string(),
        })
    }

    async fn create_annotated_tag(&self, name: &str, message: &str) -> Result<TagInfo> {
        self.git_checked(&["tag", "-a", name, "-m", message]).await?;
        Ok(TagInfo {
            name: name.to_string(),
        })
    }

    async fn tag_exists(&self, name: &str) -> Result<bool> {
        let output = self.git_checked(&["tag", "--list", name]).await?;
        Ok(output.stdout.lines().any(|line| line.trim() == name))
    }

    async fn latest_tag(&self) -> Result<Option<String>> {
        let output = self.git(&["describe", "--tags", "--abbrev=0"]).await?;
        if !output.success {
            // No tags yet, or no commits at all
            log::debug!("no reachable tag: {}", output.failure_reason());
            return Ok(None);
        }
        let tag = output.stdout_trimmed();
        Ok((!tag.is_empty()).then(|| tag.to_string()))
    }

    async fn commit_summaries_since(&self, since: Option<&str>) -> Result<Vec<String>> {
        let range = since.map(|tag| format!("{tag}..HEAD"));
        let mut args = vec!["log", "--pretty=format:%s"];
        if let Some(ref range) = range {
            args.push(range);
        }
        let output = self.git(&args).await?;
        if !output.success {
            // An unborn HEAD has no history to summarise
            if output.stderr.contains("does not have any commits") {
                return Ok(Vec::new());
            }
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: output.failure_reason(),
            }
            .into());
        }
        Ok(non_empty_lines(&output.stdout))
    }

    async fn push_branch(&self, remote: &str, branch: &str) -> Result<PushInfo> {
        let output = self.git(&["push", remote, branch]).await?;
        if !output.success {
            return Err(GitError::PushFailed {
                remote: remote.to_string(),
                target: format!("branch '{branch}'"),
                reason: output.failure_reason(),
            }
            .into());
        }
        Ok(PushInfo {
            notes: non_empty_lines(&output.stderr),
        })
    }

    async fn push_tags(&self, remote: &str) -> Result<PushInfo> {
        let output = self.git(&["push", remote, "--tags"]).await?;
        if !output.success {
            return Err(GitError::PushFailed {
                remote: remote.to_string(),
                target: "tags".to_string(),
                reason: output.failure_reason(),
            }
            .into());
        }
        Ok(PushInfo {
            notes: non_empty_lines(&output.stderr),
        })
    }

    async fn head_commit(&self) -> Result<String> {
        let output = self.git_checked(&["rev-parse", "HEAD"]).await?;
        Ok(output.stdout_trimmed().to_string())
    }
}
