//! Application service: teardown use-case.
//!
//! Every step is attempted even when an earlier one failed.

use std::fmt;
use std::future::Future;

use anyhow::{Context, Result};

use crate::application::ports::{
    Delay, PlatformHost, ProgressReporter, RunStateStore, WarpClient,
};
use crate::application::services::check_output;
use crate::application::services::convergence::await_state;
use crate::application::services::provision::Collaborators;
use crate::domain::{BackoffPolicy, DesiredState, Lifecycle, SetupError, Stage};

/// Individually isolated teardown steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    Disconnect,
    DeleteRegistration,
    ConfirmUnregistered,
    RemoveConfiguration,
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnect => "disconnect",
            Self::DeleteRegistration => "delete registration",
            Self::ConfirmUnregistered => "confirm unregistration",
            Self::RemoveConfiguration => "remove configuration",
        })
    }
}

/// A step that failed, with its rendered error chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: TeardownStep,
    pub error: String,
}

/// What teardown attempted and what went wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Steps in the order they were attempted.
    pub attempted: Vec<TeardownStep>,
    pub failures: Vec<StepFailure>,
    /// `true` when the run never connected, so nothing was unregistered.
    pub unregistration_skipped: bool,
}

impl TeardownReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    async fn run_step<F>(&mut self, reporter: &impl ProgressReporter, step: TeardownStep, fut: F)
    where
        F: Future<Output = Result<()>>,
    {
        self.attempted.push(step);
        if let Err(e) = fut.await {
            let error = format!("{e:#}");
            tracing::warn!(%step, %error, "cleanup step failed");
            reporter.warn(&format!("{step} failed: {error}"));
            self.failures.push(StepFailure { step, error });
        }
    }
}

/// Disconnect and unregister the client (only if this run connected it),
/// then remove the MDM configuration.
///
/// Never fails: step errors are collected in the returned report.
pub async fn teardown<H, C, S, D, R>(
    deps: &Collaborators<'_, H, C, S, D, R>,
    organization: Option<&str>,
    policy: &BackoffPolicy,
) -> TeardownReport
where
    H: PlatformHost,
    C: WarpClient,
    S: RunStateStore,
    D: Delay,
    R: ProgressReporter,
{
    let Collaborators {
        host,
        client,
        store,
        delay,
        reporter,
    } = *deps;
    let mut report = TeardownReport::default();
    let mut lifecycle = Lifecycle::for_teardown();

    let connected = match store.load_record().await {
        Ok(record) => record.connected,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "could not read provisioning record");
            false
        }
    };

    if connected {
        advance(&mut lifecycle, Stage::Disconnecting);
        reporter.step("disconnecting WARP...");
        report
            .run_step(reporter, TeardownStep::Disconnect, async {
                let output = client.disconnect().await.context("warp-cli disconnect")?;
                check_output(output, "warp-cli disconnect").map(drop)
            })
            .await;

        advance(&mut lifecycle, Stage::Unregistering);
        reporter.step("deleting registration...");
        report
            .run_step(reporter, TeardownStep::DeleteRegistration, async {
                let output = client
                    .delete_registration()
                    .await
                    .context("warp-cli registration delete")?;
                check_output(output, "warp-cli registration delete").map(drop)
            })
            .await;

        report
            .run_step(reporter, TeardownStep::ConfirmUnregistered, async {
                let organization = organization.ok_or(SetupError::MissingInput("organization"))?;
                await_state(client, delay, policy, DesiredState::Unregistered, organization)
                    .await?;
                Ok::<(), anyhow::Error>(())
            })
            .await;
    } else {
        tracing::info!("WARP was never connected in this run; skipping unregistration");
        report.unregistration_skipped = true;
    }

    reporter.step("removing MDM configuration...");
    report
        .run_step(
            reporter,
            TeardownStep::RemoveConfiguration,
            host.remove_configuration(),
        )
        .await;
    advance(&mut lifecycle, Stage::Cleaned);

    if report.is_clean() {
        reporter.success("WARP cleaned up");
    }
    report
}

fn advance(lifecycle: &mut Lifecycle, next: Stage) {
    if let Err(e) = lifecycle.advance(next) {
        tracing::warn!(error = %e, "unexpected teardown transition");
    }
}
