//! `setup-warp cleanup`: undo what `setup` did.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::RunStateStore;
use crate::application::services::provision::Collaborators;
use crate::application::services::teardown::{TeardownReport, teardown};
use crate::cli::InputArgs;
use crate::infra::delay::TokioDelay;
use crate::infra::platform::HostPlatform;
use crate::infra::warp_cli::WarpCli;

/// Run every teardown step and return what happened.
///
/// # Errors
///
/// Returns an error only if the target platform cannot be resolved; step
/// failures are collected in the report.
pub async fn run(
    app: &AppContext,
    args: &InputArgs,
    store: &impl RunStateStore,
) -> Result<TeardownReport> {
    let platform = args.target_platform()?;
    let host = HostPlatform::for_platform(platform, None);
    let client = WarpCli::for_platform(platform);
    let reporter = app.reporter();
    let deps = Collaborators {
        host: &host,
        client: &client,
        store,
        delay: &TokioDelay,
        reporter: &reporter,
    };

    let _group = app.group("Clean up Cloudflare WARP");
    Ok(teardown(&deps, args.organization(), &args.policy()).await)
}

/// Cleanup invoked on its own: any failed step fails the command.
///
/// # Errors
///
/// Returns an error naming the failed steps.
pub async fn run_standalone(
    app: &AppContext,
    args: &InputArgs,
    store: &impl RunStateStore,
) -> Result<()> {
    let report = run(app, args, store).await?;
    if report.is_clean() {
        return Ok(());
    }
    let failed = report
        .failures
        .iter()
        .map(|f| f.step.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    anyhow::bail!("cleanup incomplete: {failed} failed")
}
