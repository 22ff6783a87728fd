//! Release pipeline orchestration.
//!
//! Steps run strictly in order, one external call at a time. The first hard
//! failure stops the run; the report is written either way.

use crate::cli::RuntimeConfig;
use crate::config::ReleaseConfig;
use crate::env_config::EnvConfig;
use crate::error::{ReleaseError, Result};
use crate::git::VersionControl;
use crate::publish::PackageManager;
use crate::report;
use crate::state::{ReleasePhase, ReleaseState};
use crate::version::VersionBump;

use super::context::ReleaseContext;
use super::phases;

/// Executables checked on PATH during pre-verification
pub const DEFAULT_REQUIRED_TOOLS: [&str; 2] = ["git", "npm"];

/// Report a run that failed before the pipeline could start, such as a
/// project directory that is not a git repository.
///
/// The failure is attributed to pre-verification. A report that cannot be
/// written is logged; `error` stays the failure the caller returns.
pub fn report_early_failure(config: &ReleaseConfig, error: &ReleaseError) -> ReleaseState {
    let mut state = ReleaseState::new();
    log::error!("release aborted during {}: {error}", ReleasePhase::Preflight);
    state.finalize(Some((ReleasePhase::Preflight, &error.to_string())));

    let report_path = config.report_file();
    if let Err(report_error) = report::write(&report_path, &state) {
        log::error!(
            "failed to write release report to {}: {report_error}",
            report_path.display()
        );
    }
    state
}

/// Runs one release against the given backends
pub struct ReleasePipeline<'a, G, P> {
    git: &'a G,
    npm: &'a P,
    config: &'a ReleaseConfig,
    env: &'a EnvConfig,
    output: &'a RuntimeConfig,
    required_tools: Vec<String>,
}

impl<'a, G, P> ReleasePipeline<'a, G, P>
where
    G: VersionControl,
    P: PackageManager,
{
    /// Create a pipeline requiring `git` and `npm` on PATH
    pub fn new(
        git: &'a G,
        npm: &'a P,
        config: &'a ReleaseConfig,
        env: &'a EnvConfig,
        output: &'a RuntimeConfig,
    ) -> Self {
        Self {
            git,
            npm,
            config,
            env,
            output,
            required_tools: DEFAULT_REQUIRED_TOOLS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Replace the executables checked during pre-verification
    pub fn with_required_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Run the release, returning the finalized state on success.
    ///
    /// On a hard failure the report has already been written when the error
    /// is returned.
    pub async fn run(&self, kind: VersionBump) -> Result<ReleaseState> {
        let (state, result) = self.run_detailed(kind).await;
        result.map(|()| state)
    }

    /// Run the release and hand back the finalized state regardless of outcome.
    pub async fn run_detailed(&self, kind: VersionBump) -> (ReleaseState, Result<()>) {
        let mut state = ReleaseState::new();
        let mut phase = ReleasePhase::Preflight;

        let result = self.execute(kind, &mut state, &mut phase).await;
        match &result {
            Ok(()) => state.finalize(None),
            Err(e) => {
                log::error!("release aborted during {phase}: {e}");
                state.finalize(Some((phase, &e.to_string())));
            }
        }

        let report_path = self.config.report_file();
        let written = report::write(&report_path, &state);
        if written.is_ok() {
            self.output
                .indent(&format!("Report: {}", report_path.display()));
        }

        let result = match (result, written) {
            (Ok(()), written) => written,
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(report_error)) => {
                log::error!(
                    "failed to write release report to {}: {report_error}",
                    report_path.display()
                );
                Err(e)
            }
        };
        (state, result)
    }

    fn enter(&self, phase: &mut ReleasePhase, next: ReleasePhase) {
        *phase = next;
        log::info!("step {}: {next}", next.number());
        self.output
            .step(next.number(), ReleasePhase::ALL.len(), &next.to_string());
    }

    async fn execute(
        &self,
        kind: VersionBump,
        state: &mut ReleaseState,
        phase: &mut ReleasePhase,
    ) -> Result<()> {
        let ctx = ReleaseContext {
            git: self.git,
            npm: self.npm,
            config: self.config,
            env: self.env,
            output: self.output,
            required_tools: &self.required_tools,
        };

        self.enter(phase, ReleasePhase::Preflight);
        let manifest = phases::preflight(&ctx, state).await?;

        self.enter(phase, ReleasePhase::Dependencies);
        phases::install_and_test(&ctx, state).await?;

        self.enter(phase, ReleasePhase::Build);
        phases::build(&ctx, &manifest).await?;

        self.enter(phase, ReleasePhase::Versioning);
        let version = phases::versioning(&ctx, state, kind).await?;

        self.enter(phase, ReleasePhase::Changelog);
        phases::changelog(&ctx, state, &version).await?;

        self.enter(phase, ReleasePhase::CommitAndTag);
        phases::commit_and_tag(&ctx, state, &version).await?;

        self.enter(phase, ReleasePhase::Push);
        phases::push(&ctx, state).await?;

        self.enter(phase, ReleasePhase::PrimaryPublish);
        let token = phases::primary_publish(&ctx, state, &manifest).await?;

        self.enter(phase, ReleasePhase::SecondaryPublish);
        phases::secondary_publish(&ctx, state, &manifest, token).await?;

        self.enter(phase, ReleasePhase::Verification);
        phases::verification(&ctx, state, &manifest, &version).await?;

        Ok(())
    }
}
