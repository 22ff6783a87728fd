//! `SystemGit` against real repositories in temp directories.

mod common;

use common::*;
use scaffold_release::error::{GitError, ReleaseError};
use scaffold_release::{Outcome, ReleasePipeline, SystemGit, VersionBump, VersionControl};
use semver::Version;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Run git in `dir`, panicking on failure, and return trimmed stdout
fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Fresh repository on `main` with a local identity and no hooks
fn init_repo(dir: &Path) {
    let hooks = dir.join(".git").join("no-hooks");
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir, &["config", "user.name", "Release Bot"]);
    git(dir, &["config", "user.email", "release@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["config", "tag.gpgSign", "false"]);
    std::fs::create_dir_all(&hooks).unwrap();
    git(dir, &["config", "core.hooksPath", hooks.to_str().unwrap()]);
}

/// npm project committed on `main` and pushed to a bare `origin`
struct Checkout {
    _root: TempDir,
    work: PathBuf,
}

fn checkout_with_origin() -> Checkout {
    let root = tempfile::tempdir().unwrap();
    let origin = root.path().join("origin.git");
    let work = root.path().join("work");
    std::fs::create_dir_all(&origin).unwrap();
    git(&origin, &["init", "-q", "--bare"]);

    let fixture = project("create-py", "1.0.0", false);
    std::fs::create_dir_all(&work).unwrap();
    for file in ["package.json", "CHANGELOG.md"] {
        std::fs::copy(fixture.path().join(file), work.join(file)).unwrap();
    }

    init_repo(&work);
    git(&work, &["add", "-A"]);
    git(&work, &["commit", "-q", "-m", "feat: initial scaffold"]);
    git(&work, &["remote", "add", "origin", origin.to_str().unwrap()]);
    git(&work, &["push", "-q", "-u", "origin", "main"]);
    Checkout { _root: root, work }
}

/// Repository with one commit and no remote
async fn committed_repo() -> (TempDir, SystemGit) {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    std::fs::write(dir.path().join("package.json"), "{}\n").unwrap();
    git(dir.path(), &["add", "-A"]);
    git(dir.path(), &["commit", "-q", "-m", "initial"]);
    let repo = SystemGit::open(dir.path()).await.unwrap();
    (dir, repo)
}

#[tokio::test]
async fn second_release_in_same_checkout_finds_a_clean_tree() {
    let checkout = checkout_with_origin();
    let repo = SystemGit::open(&checkout.work).await.unwrap();
    let npm = FakeNpm::new(&checkout.work);
    let (config, env, output) = (config(&checkout.work), env_with_token(), output());
    let pipeline =
        ReleasePipeline::new(&repo, &npm, &config, &env, &output).with_required_tools(["git"]);

    let first = pipeline.run(VersionBump::Patch).await.unwrap();
    assert_eq!(first.outcome, Outcome::Completed);
    assert!(checkout.work.join("RELEASE_REPORT.md").exists());
    let commits_after_first = git(&checkout.work, &["rev-list", "--count", "HEAD"]);

    let second = pipeline.run(VersionBump::Patch).await.unwrap();
    assert_eq!(second.outcome, Outcome::Completed);
    assert_eq!(second.version, Some(Version::new(1, 0, 1)));

    assert_eq!(git(&checkout.work, &["tag", "--list"]), "v1.0.1");
    assert_eq!(
        git(&checkout.work, &["rev-list", "--count", "HEAD"]),
        commits_after_first
    );
    assert_eq!(commits_after_first, "2");
    let tracked = git(&checkout.work, &["ls-files"]);
    assert!(!tracked.contains("RELEASE_REPORT"));
    assert_eq!(
        git(&checkout.work, &["rev-parse", "HEAD"]),
        git(&checkout.work, &["rev-parse", "origin/main"])
    );
    assert_eq!(second.commit_identifier, first.commit_identifier);
}

#[tokio::test]
async fn status_lists_untracked_files_except_excluded_ones() {
    let (dir, repo) = committed_repo().await;
    let report = dir.path().join("RELEASE_REPORT.md");
    assert!(repo.status_entries(&[]).await.unwrap().is_empty());

    std::fs::write(&report, "# Release Report\n").unwrap();
    std::fs::create_dir_all(dir.path().join("dist")).unwrap();
    std::fs::write(dir.path().join("dist").join("index.js"), "").unwrap();

    let entries = repo.status_entries(&[report.clone()]).await.unwrap();
    assert_eq!(entries, vec!["?? dist/index.js".to_string()]);

    std::fs::remove_dir_all(dir.path().join("dist")).unwrap();
    assert!(repo.status_entries(&[report.clone()]).await.unwrap().is_empty());
    assert_eq!(repo.status_entries(&[]).await.unwrap().len(), 1);
}

#[tokio::test]
async fn modified_tracked_file_makes_the_tree_dirty() {
    let (dir, repo) = committed_repo().await;
    std::fs::write(dir.path().join("package.json"), "{ \"name\": \"x\" }\n").unwrap();
    assert_eq!(
        repo.status_entries(&[]).await.unwrap(),
        vec![" M package.json".to_string()]
    );
}

#[tokio::test]
async fn staged_changes_follow_the_diff_exit_code() {
    let (dir, repo) = committed_repo().await;
    let report = dir.path().join("RELEASE_REPORT.md");
    assert!(!repo.has_staged_changes().await.unwrap());

    std::fs::write(&report, "# Release Report\n").unwrap();
    repo.stage_all(&[report.clone()]).await.unwrap();
    assert!(!repo.has_staged_changes().await.unwrap());

    std::fs::write(dir.path().join("CHANGELOG.md"), "# Changelog\n").unwrap();
    repo.stage_all(&[report]).await.unwrap();
    assert!(repo.has_staged_changes().await.unwrap());
    assert_eq!(repo.staged_paths().await.unwrap(), vec!["CHANGELOG.md".to_string()]);
}

#[tokio::test]
async fn tags_are_absent_until_created() {
    let (_dir, repo) = committed_repo().await;
    assert_eq!(repo.latest_tag().await.unwrap(), None);
    assert!(!repo.tag_exists("v1.0.0").await.unwrap());

    let tag = repo.create_annotated_tag("v1.0.0", "Release v1.0.0").await.unwrap();
    assert_eq!(tag.name, "v1.0.0");
    assert!(repo.tag_exists("v1.0.0").await.unwrap());
    assert!(!repo.tag_exists("v1.0").await.unwrap());
    assert_eq!(repo.latest_tag().await.unwrap(), Some("v1.0.0".to_string()));
}

#[tokio::test]
async fn summaries_since_tag_exclude_tagged_history() {
    let (dir, repo) = committed_repo().await;
    repo.create_annotated_tag("v1.0.0", "Release v1.0.0").await.unwrap();
    std::fs::write(dir.path().join("CHANGELOG.md"), "# Changelog\n").unwrap();
    git(dir.path(), &["add", "-A"]);
    git(dir.path(), &["commit", "-q", "-m", "docs: add changelog"]);

    assert_eq!(
        repo.commit_summaries_since(Some("v1.0.0")).await.unwrap(),
        vec!["docs: add changelog".to_string()]
    );
    assert_eq!(repo.commit_summaries_since(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn unborn_head_has_no_history_or_tags() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let repo = SystemGit::open(dir.path()).await.unwrap();

    assert!(repo.commit_summaries_since(None).await.unwrap().is_empty());
    assert_eq!(repo.latest_tag().await.unwrap(), None);
}

#[tokio::test]
async fn open_outside_a_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    if result.status.success() {
        // The temp dir sits inside some other checkout
        return;
    }

    assert!(matches!(
        SystemGit::open(dir.path()).await,
        Err(ReleaseError::Git(GitError::NotRepository { .. }))
    ));
}

#[cfg(unix)]
fn install_pre_commit(dir: &Path, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    let hooks = dir.join(".husky");
    std::fs::create_dir_all(&hooks).unwrap();
    let hook = hooks.join("pre-commit");
    std::fs::write(&hook, script).unwrap();
    std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755)).unwrap();
    git(dir, &["config", "core.hooksPath", ".husky"]);
}

#[cfg(unix)]
#[tokio::test]
async fn hook_whose_tool_is_missing_is_reported_as_missing() {
    let (dir, repo) = committed_repo().await;
    install_pre_commit(dir.path(), "#!/bin/sh\nscaffold-release-no-such-linter --fix\n");
    std::fs::write(dir.path().join("CHANGELOG.md"), "# Changelog\n").unwrap();
    repo.stage_all(&[]).await.unwrap();

    match repo.commit("chore(release): v1.0.1", true).await {
        Err(ReleaseError::Git(GitError::HookMissing { hook, .. })) => {
            assert_eq!(hook, "pre-commit")
        }
        other => panic!("expected a missing hook, got {other:?}"),
    }

    let commit = repo.commit("chore(release): v1.0.1", false).await.unwrap();
    assert_eq!(commit.hash, git(dir.path(), &["rev-parse", "HEAD"]));
}

#[cfg(unix)]
#[tokio::test]
async fn hook_that_runs_and_fails_is_a_plain_commit_failure() {
    let (dir, repo) = committed_repo().await;
    install_pre_commit(
        dir.path(),
        "#!/bin/sh\necho \"src/index.js: error  Cannot find module './utils'\" >&2\nexit 1\n",
    );
    std::fs::write(dir.path().join("CHANGELOG.md"), "# Changelog\n").unwrap();
    repo.stage_all(&[]).await.unwrap();

    assert!(matches!(
        repo.commit("chore(release): v1.0.1", true).await,
        Err(ReleaseError::Git(GitError::CommitFailed { .. }))
    ));
    assert_eq!(git(dir.path(), &["rev-list", "--count", "HEAD"]), "1");
}
