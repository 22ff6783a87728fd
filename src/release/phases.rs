//! Individual release steps.
//!
//! Each step either returns `Ok` (possibly after recording a soft failure on
//! the state) or a hard error that aborts the run.

use crate::changelog::{self, ChangelogSection};
use crate::env_config::SecretToken;
use crate::error::{
    GitError, PackageError, PreflightError, PublishError, ReleaseError, Result, VersionError,
};
use crate::git::VersionControl;
use crate::metadata::{PackageManifest, load_manifest};
use crate::publish::PackageManager;
use crate::state::{METADATA_PLACEHOLDER, ReleaseState};
use crate::version::{VersionBump, VersionBumper, parse_strict, tag_name};
use semver::Version;

use super::context::ReleaseContext;
use super::retry::retry_until;

/// Tools, branch, clean tree, manifest normalization and version format.
///
/// Nothing in the repository is written before the branch and working tree
/// checks pass.
pub async fn preflight<G, P>(
    ctx: &ReleaseContext<'_, G, P>,
    state: &mut ReleaseState,
) -> Result<PackageManifest>
where
    G: VersionControl,
    P: PackageManager,
{
    for tool in ctx.required_tools {
        which::which(tool).map_err(|_| PreflightError::ToolMissing { tool: tool.clone() })?;
    }

    let expected = &ctx.config.git.release_branch;
    let actual = ctx.git.current_branch().await?;
    if &actual != expected {
        return Err(PreflightError::WrongBranch {
            expected: expected.clone(),
            actual,
        }
        .into());
    }
    ctx.output.indent(&format!("On release branch '{actual}'"));

    let entries = ctx.git.status_entries(&ctx.config.report_files()).await?;
    if !entries.is_empty() {
        return Err(PreflightError::DirtyWorkingTree { entries }.into());
    }
    ctx.output.indent("Working tree is clean");

    if let Err(e) = ctx.npm.normalize_manifest().await {
        state.record_issue(
            format!("Manifest normalization failed: {e}"),
            "Run `npm pkg fix` by hand and review the changes to package.json",
        );
    }

    let manifest = load_manifest(&ctx.config.project_dir)?;
    let version = parse_strict(&manifest.version)?;
    ctx.output
        .indent(&format!("Package {} at version {version}", manifest.name));
    state.version = Some(version);
    Ok(manifest)
}

/// Clean install (hard) followed by the test suite (soft).
pub async fn install_and_test<G, P>(
    ctx: &ReleaseContext<'_, G, P>,
    state: &mut ReleaseState,
) -> Result<()>
where
    G: VersionControl,
    P: PackageManager,
{
    ctx.npm
        .clean_install()
        .await
        .map_err(|e| PackageError::InstallFailed {
            reason: e.to_string(),
        })?;
    ctx.output.success_println("Dependencies installed");

    match ctx.npm.run_tests().await {
        Ok(()) => ctx.output.success_println("Tests passed"),
        Err(e) => {
            ctx.output.warning_println("Tests failed or are not configured");
            state.record_issue(
                format!("Tests are not configured or failing: {e}"),
                "Add a working \"test\" script to package.json; the release continued without a passing suite",
            );
        }
    }
    Ok(())
}

/// Run the declared build script, if any.
pub async fn build<G, P>(ctx: &ReleaseContext<'_, G, P>, manifest: &PackageManifest) -> Result<()>
where
    G: VersionControl,
    P: PackageManager,
{
    if !manifest.has_build_script {
        log::debug!("{} declares no build script, skipping build", manifest.name);
        return Ok(());
    }

    ctx.npm
        .run_script("build")
        .await
        .map_err(|e| PackageError::BuildFailed {
            reason: e.to_string(),
        })?;
    ctx.output.success_println("Build completed");
    Ok(())
}

/// Reuse the manifest version when its tag already exists, otherwise bump.
pub async fn versioning<G, P>(
    ctx: &ReleaseContext<'_, G, P>,
    state: &mut ReleaseState,
    kind: VersionBump,
) -> Result<Version>
where
    G: VersionControl,
    P: PackageManager,
{
    let current = parse_strict(&load_manifest(&ctx.config.project_dir)?.version)?;
    let current_tag = tag_name(&current);

    let version = if ctx.git.tag_exists(&current_tag).await? {
        ctx.output
            .indent(&format!("Tag {current_tag} already exists, reusing version {current}"));
        current
    } else {
        let next = VersionBumper::from_version(current.clone()).bump(kind);
        ctx.npm.set_version(&next).await?;

        let written = parse_strict(&load_manifest(&ctx.config.project_dir)?.version)?;
        if written != next {
            return Err(VersionError::InvalidVersion {
                version: written.to_string(),
                reason: format!("manifest still reports {written} after writing {next}"),
            }
            .into());
        }
        ctx.output
            .success_println(&format!("Version bumped ({kind}): {current} → {next}"));
        next
    };

    state.version = Some(version.clone());
    Ok(version)
}

/// Prepend a section for `version` to the changelog.
pub async fn changelog<G, P>(
    ctx: &ReleaseContext<'_, G, P>,
    state: &mut ReleaseState,
    version: &Version,
) -> Result<()>
where
    G: VersionControl,
    P: PackageManager,
{
    let latest = ctx.git.latest_tag().await?;
    let summaries = ctx.git.commit_summaries_since(latest.as_deref()).await?;
    let staged = if summaries.is_empty() {
        ctx.git.staged_paths().await?
    } else {
        Vec::new()
    };

    let entries = changelog::collect_entries(summaries, &staged);
    if entries.is_empty() {
        let since = latest.as_deref().unwrap_or("the beginning of history");
        state.record_warning(format!(
            "No changes found since {since}; changelog uses a placeholder entry"
        ));
    }
    state.change_entries = entries.clone();

    let section = ChangelogSection::new(
        version.clone(),
        chrono::Local::now().date_naive(),
        entries,
    );
    let path = ctx.config.changelog_file();
    if changelog::update_file(&path, &section)? {
        ctx.output
            .success_println(&format!("Changelog updated: {}", section.heading()));
    } else {
        ctx.output.indent(&format!(
            "{} already has a section for {version}, leaving it unchanged",
            path.display()
        ));
    }
    Ok(())
}

/// Stage, commit and tag the release.
///
/// A commit rejected because the hook manager is configured but not
/// installed is retried with hooks bypassed; that is the only commit
/// failure treated as soft.
pub async fn commit_and_tag<G, P>(
    ctx: &ReleaseContext<'_, G, P>,
    state: &mut ReleaseState,
    version: &Version,
) -> Result<()>
where
    G: VersionControl,
    P: PackageManager,
{
    ctx.git.stage_all(&ctx.config.report_files()).await?;

    if ctx.git.has_staged_changes().await? {
        let message = ctx.config.git.commit_message(version);
        let commit = match ctx.git.commit(&message, true).await {
            Ok(commit) => commit,
            Err(ReleaseError::Git(GitError::HookMissing { hook, stderr })) => {
                let detail = stderr.lines().next().unwrap_or_default().to_string();
                ctx.output.warning_println(&format!(
                    "Hook '{hook}' is not installed, committing without hooks"
                ));
                let commit = ctx.git.commit(&message, false).await?;
                state.record_issue(
                    format!("Commit hook '{hook}' is configured but not installed: {detail}"),
                    "Committed with --no-verify; reinstall the hook manager (e.g. `npx husky install`) before the next release",
                );
                commit
            }
            Err(e) => return Err(e),
        };
        ctx.output.success_println(&format!(
            "Committed {}: \"{}\"",
            commit.short_hash(),
            commit.message
        ));
    } else {
        log::info!("nothing staged, skipping release commit");
        ctx.output.indent("Nothing to commit");
    }

    let tag = tag_name(version);
    if ctx.git.tag_exists(&tag).await? {
        ctx.output.indent(&format!("Tag {tag} already exists"));
    } else {
        let created = ctx
            .git
            .create_annotated_tag(&tag, &ctx.config.git.tag_message(version))
            .await?;
        ctx.output.success_println(&format!("Tagged: {}", created.name));
    }
    Ok(())
}

/// Push the release branch and tags, then record HEAD.
pub async fn push<G, P>(ctx: &ReleaseContext<'_, G, P>, state: &mut ReleaseState) -> Result<()>
where
    G: VersionControl,
    P: PackageManager,
{
    let remote = &ctx.config.git.remote;
    let branch = &ctx.config.git.release_branch;

    let pushed_branch = ctx.git.push_branch(remote, branch).await?;
    let pushed_tags = ctx.git.push_tags(remote).await?;
    for note in pushed_branch.notes.iter().chain(&pushed_tags.notes) {
        ctx.output.verbose_println(note);
    }
    ctx.output
        .success_println(&format!("Pushed {branch} and tags to {remote}"));

    state.commit_identifier = Some(ctx.git.head_commit().await?);
    Ok(())
}

/// Publish publicly to the primary registry, returning the token used.
pub async fn primary_publish<'a, G, P>(
    ctx: &ReleaseContext<'a, G, P>,
    state: &mut ReleaseState,
    manifest: &PackageManifest,
) -> Result<&'a SecretToken>
where
    G: VersionControl,
    P: PackageManager,
{
    let token = ctx
        .env
        .token
        .as_ref()
        .ok_or_else(|| PublishError::MissingToken {
            variable: ctx.env.token_var.clone(),
        })?;
    let location = ctx.config.primary_package_url(&manifest.name)?;

    ctx.npm
        .publish_public(token)
        .await
        .map_err(|e| PublishError::PublishFailed {
            package: manifest.name.clone(),
            registry: location.to_string(),
            reason: e.to_string(),
        })?;

    ctx.output
        .success_println(&format!("Published {} to {location}", manifest.name));
    state.add_registry(location);
    Ok(token)
}

/// Publish scoped packages to the secondary registry with the token the
/// primary publish used. Every failure here is soft.
pub async fn secondary_publish<G, P>(
    ctx: &ReleaseContext<'_, G, P>,
    state: &mut ReleaseState,
    manifest: &PackageManifest,
    token: &SecretToken,
) -> Result<()>
where
    G: VersionControl,
    P: PackageManager,
{
    if !manifest.is_scoped() {
        log::debug!("{} is unscoped, skipping secondary registry", manifest.name);
        ctx.output.indent("Package is not scoped, skipping");
        return Ok(());
    }

    let registry = &ctx.config.secondary_registry;
    let host = ctx.config.secondary_host();
    let registry_config = ctx.config.registry_config_file();

    let problem = match std::fs::read_to_string(&registry_config) {
        Err(_) => Some(format!("{} not found", registry_config.display())),
        Ok(content) if !content.contains(host) => Some(format!(
            "{} has no entry for {host}",
            registry_config.display()
        )),
        Ok(_) => None,
    };
    if let Some(problem) = problem {
        ctx.output.warning_println(&problem);
        state.record_warning(problem);
        state.record_issue(
            format!("Secondary registry publish skipped for {}", manifest.name),
            format!(
                "Add `{}:registry={registry}` to {}",
                manifest.scope().unwrap_or_default(),
                registry_config.display()
            ),
        );
        return Ok(());
    }

    match ctx.npm.publish_to_registry(registry, token).await {
        Ok(()) => {
            let location = ctx.config.secondary_package_url(&manifest.name)?;
            ctx.output
                .success_println(&format!("Published {} to {location}", manifest.name));
            state.add_registry(location);
        }
        Err(e) => {
            ctx.output
                .warning_println(&format!("Publishing to {registry} failed"));
            state.record_issue(
                format!("Publishing {} to {registry} failed: {e}", manifest.name),
                format!("Check the token's write access to {registry} and publish again with `npm publish --registry {registry}`"),
            );
        }
    }
    Ok(())
}

/// Read the published version back, then fetch registry metadata.
pub async fn verification<G, P>(
    ctx: &ReleaseContext<'_, G, P>,
    state: &mut ReleaseState,
    manifest: &PackageManifest,
    version: &Version,
) -> Result<()>
where
    G: VersionControl,
    P: PackageManager,
{
    let npm = ctx.npm;
    let name = manifest.name.as_str();

    let found = retry_until(
        ctx.config.verification,
        "Registry verification",
        move |attempt| {
            log::debug!("checking registry for {name}@{version} (attempt {attempt})");
            npm.published_version(name, version)
        },
        Option::is_some,
    )
    .await?
    .unwrap_or_default();

    if found != version.to_string() {
        return Err(PublishError::VersionMismatch {
            package: manifest.name.clone(),
            expected: version.to_string(),
            found,
        }
        .into());
    }
    ctx.output
        .success_println(&format!("Registry reports {name}@{found}"));

    match ctx.npm.package_metadata(name).await {
        Ok(metadata) => state.package_metadata = metadata,
        Err(e) => {
            state.package_metadata = METADATA_PLACEHOLDER.to_string();
            state.record_warning(format!("Could not fetch registry metadata for {name}: {e}"));
        }
    }
    Ok(())
}
