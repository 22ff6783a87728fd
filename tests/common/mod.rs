//! Scripted backends and project fixtures shared by the integration tests.

#![allow(dead_code)]

use scaffold_release::cli::RuntimeConfig;
use scaffold_release::error::{GitError, PackageError, Result};
use scaffold_release::git::{CommitInfo, PushInfo, TagInfo, VersionControl};
use scaffold_release::{EnvConfig, PackageManager, ReleaseConfig, RetryPolicy, SecretToken};
use semver::Version;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

pub const TOKEN: &str = "npm_s3cr3t_t0ken";

pub const EXISTING_CHANGELOG: &str = "# Changelog\n\nAll notable changes.\n\n## [1.0.0] - 2024-01-01\n\n### Changed\n\n- Initial release\n";

/// Temp project with package.json and CHANGELOG.md
pub fn project(name: &str, version: &str, build_script: bool) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let scripts = if build_script {
        r#"{ "test": "jest", "build": "tsc" }"#
    } else {
        r#"{ "test": "jest" }"#
    };
    std::fs::write(
        dir.path().join("package.json"),
        format!(
            "{{\n  \"name\": \"{name}\",\n  \"version\": \"{version}\",\n  \"scripts\": {scripts}\n}}\n"
        ),
    )
    .unwrap();
    std::fs::write(dir.path().join("CHANGELOG.md"), EXISTING_CHANGELOG).unwrap();
    dir
}

pub fn config(dir: &Path) -> ReleaseConfig {
    ReleaseConfig {
        project_dir: dir.to_path_buf(),
        verification: RetryPolicy::new(3, Duration::ZERO),
        ..ReleaseConfig::default()
    }
}

pub fn env_with_token() -> EnvConfig {
    EnvConfig::with_token("NPM_TOKEN", Some(TOKEN))
}

pub fn output() -> RuntimeConfig {
    RuntimeConfig::quiet()
}

pub fn read(dir: &Path, file: &str) -> String {
    std::fs::read_to_string(dir.join(file)).unwrap()
}

const TRACKED: [&str; 2] = ["package.json", "CHANGELOG.md"];

#[derive(Debug, Default)]
pub struct GitLog {
    pub branch: String,
    pub dirty: Vec<String>,
    pub tags: Vec<String>,
    pub summaries: Vec<String>,
    /// Tracked file contents as of the last commit
    pub committed: Vec<Option<String>>,
    pub staged: Vec<String>,
    /// (message, verify) for each commit that succeeded
    pub commits: Vec<(String, bool)>,
    pub pushes: Vec<String>,
    pub hook_missing: bool,
    pub reject_push: bool,
    /// Paths the last status check or staging was asked to leave out
    pub excluded: Vec<PathBuf>,
}

/// Git backend that tracks commits, tags and pushes in memory
pub struct FakeGit {
    dir: PathBuf,
    pub log: Mutex<GitLog>,
}

impl FakeGit {
    pub fn new(dir: &Path) -> Self {
        let git = Self {
            dir: dir.to_path_buf(),
            log: Mutex::new(GitLog {
                branch: "main".to_string(),
                ..GitLog::default()
            }),
        };
        let snapshot = git.snapshot();
        git.log.lock().unwrap().committed = snapshot;
        git
    }

    pub fn with(self, edit: impl FnOnce(&mut GitLog)) -> Self {
        edit(&mut self.log.lock().unwrap());
        self
    }

    fn snapshot(&self) -> Vec<Option<String>> {
        TRACKED
            .iter()
            .map(|f| std::fs::read_to_string(self.dir.join(f)).ok())
            .collect()
    }

    pub fn tags(&self) -> Vec<String> {
        self.log.lock().unwrap().tags.clone()
    }

    pub fn commits(&self) -> Vec<(String, bool)> {
        self.log.lock().unwrap().commits.clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.log.lock().unwrap().pushes.clone()
    }
}

impl VersionControl for FakeGit {
    async fn current_branch(&self) -> Result<String> {
        Ok(self.log.lock().unwrap().branch.clone())
    }

    async fn status_entries(&self, excluded: &[PathBuf]) -> Result<Vec<String>> {
        let mut log = self.log.lock().unwrap();
        log.excluded = excluded.to_vec();
        Ok(log.dirty.clone())
    }

    async fn stage_all(&self, excluded: &[PathBuf]) -> Result<()> {
        let current = self.snapshot();
        let mut log = self.log.lock().unwrap();
        log.excluded = excluded.to_vec();
        let staged: Vec<String> = TRACKED
            .iter()
            .zip(current.iter().zip(log.committed.iter()))
            .filter(|(_, (now, before))| now != before)
            .map(|(file, _)| file.to_string())
            .collect();
        log.staged = staged;
        Ok(())
    }

    async fn has_staged_changes(&self) -> Result<bool> {
        Ok(!self.log.lock().unwrap().staged.is_empty())
    }

    async fn staged_paths(&self) -> Result<Vec<String>> {
        Ok(self.log.lock().unwrap().staged.clone())
    }

    async fn commit(&self, message: &str, verify: bool) -> Result<CommitInfo> {
        let snapshot = self.snapshot();
        let mut log = self.log.lock().unwrap();
        if verify && log.hook_missing {
            return Err(GitError::HookMissing {
                hook: "pre-commit".to_string(),
                stderr: "husky - pre-commit hook exited with code 127: husky: command not found"
                    .to_string(),
            }
            .into());
        }
        log.commits.push((message.to_string(), verify));
        log.committed = snapshot;
        log.staged.clear();
        Ok(CommitInfo {
            hash: format!("{:040x}", log.commits.len()),
            message: message.to_string(),
        })
    }

    async fn create_annotated_tag(&self, name: &str, _message: &str) -> Result<TagInfo> {
        self.log.lock().unwrap().tags.push(name.to_string());
        Ok(TagInfo {
            name: name.to_string(),
        })
    }

    async fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.log.lock().unwrap().tags.iter().any(|t| t == name))
    }

    async fn latest_tag(&self) -> Result<Option<String>> {
        Ok(self.log.lock().unwrap().tags.last().cloned())
    }

    async fn commit_summaries_since(&self, _since: Option<&str>) -> Result<Vec<String>> {
        Ok(self.log.lock().unwrap().summaries.clone())
    }

    async fn push_branch(&self, remote: &str, branch: &str) -> Result<PushInfo> {
        let mut log = self.log.lock().unwrap();
        if log.reject_push {
            return Err(GitError::PushFailed {
                remote: remote.to_string(),
                target: branch.to_string(),
                reason: "! [rejected] main -> main (fetch first)".to_string(),
            }
            .into());
        }
        log.pushes.push(branch.to_string());
        Ok(PushInfo { notes: Vec::new() })
    }

    async fn push_tags(&self, _remote: &str) -> Result<PushInfo> {
        self.log.lock().unwrap().pushes.push("tags".to_string());
        Ok(PushInfo { notes: Vec::new() })
    }

    async fn head_commit(&self) -> Result<String> {
        Ok(format!("{:040x}", self.log.lock().unwrap().commits.len()))
    }
}

#[derive(Debug, Default)]
pub struct NpmScript {
    pub fail_install: bool,
    pub fail_tests: bool,
    pub fail_build: bool,
    pub fail_normalize: bool,
    pub fail_secondary: bool,
    pub fail_metadata: bool,
    /// Reported by `published_version` instead of the manifest version
    pub registry_version: Option<Option<String>>,
}

/// npm backend that rewrites package.json and records every call
pub struct FakeNpm {
    dir: PathBuf,
    pub script: NpmScript,
    pub calls: Mutex<Vec<String>>,
    pub tokens_seen: Mutex<Vec<String>>,
}

impl FakeNpm {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            script: NpmScript::default(),
            calls: Mutex::new(Vec::new()),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, edit: impl FnOnce(&mut NpmScript)) -> Self {
        edit(&mut self.script);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn fail(command: &str, stderr: &str) -> scaffold_release::ReleaseError {
        PackageError::CommandFailed {
            command: command.to_string(),
            stderr: stderr.to_string(),
        }
        .into()
    }
}

impl PackageManager for FakeNpm {
    async fn clean_install(&self) -> Result<()> {
        self.record("ci");
        if self.script.fail_install {
            return Err(Self::fail("ci", "npm ERR! could not resolve dependency tree"));
        }
        Ok(())
    }

    async fn run_tests(&self) -> Result<()> {
        self.record("test");
        if self.script.fail_tests {
            return Err(Self::fail("test", "1 failing"));
        }
        Ok(())
    }

    async fn run_script(&self, name: &str) -> Result<()> {
        self.record(format!("run {name}"));
        if self.script.fail_build {
            return Err(Self::fail("run build", "error TS2304: Cannot find name"));
        }
        Ok(())
    }

    async fn normalize_manifest(&self) -> Result<()> {
        self.record("pkg fix");
        if self.script.fail_normalize {
            return Err(Self::fail("pkg fix", "Unknown command: \"pkg\""));
        }
        Ok(())
    }

    async fn set_version(&self, version: &Version) -> Result<()> {
        self.record(format!("version {version}"));
        let path = self.dir.join("package.json");
        let mut manifest: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        manifest["version"] = serde_json::Value::String(version.to_string());
        std::fs::write(&path, serde_json::to_string_pretty(&manifest)? + "\n")?;
        Ok(())
    }

    async fn publish_public(&self, token: &SecretToken) -> Result<()> {
        self.record("publish --access public");
        self.tokens_seen.lock().unwrap().push(token.expose().to_string());
        Ok(())
    }

    async fn publish_to_registry(&self, registry: &Url, token: &SecretToken) -> Result<()> {
        self.record(format!("publish --registry {registry}"));
        self.tokens_seen.lock().unwrap().push(token.expose().to_string());
        if self.script.fail_secondary {
            return Err(Self::fail("publish", "npm ERR! 403 Forbidden"));
        }
        Ok(())
    }

    async fn published_version(&self, name: &str, version: &Version) -> Result<Option<String>> {
        self.record(format!("view {name}@{version} version"));
        Ok(match &self.script.registry_version {
            Some(reported) => reported.clone(),
            None => Some(version.to_string()),
        })
    }

    async fn package_metadata(&self, name: &str) -> Result<String> {
        self.record(format!("view {name}"));
        if self.script.fail_metadata {
            return Err(Self::fail("view", "npm ERR! network timeout"));
        }
        Ok(format!("{name} | MIT | deps: none"))
    }
}
