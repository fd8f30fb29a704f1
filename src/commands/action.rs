//! Action entry point: the same binary runs as the main step and as the
//! post step, told apart by a marker in the run state.

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::RunStateStore;
use crate::cli::InputArgs;
use crate::commands::{cleanup, setup};
use crate::domain::Phase;
use crate::output::workflow;

/// Run the phase the state store says is next.
///
/// # Errors
///
/// Main phase: returns the provisioning error after trying to save the phase
/// marker; a marker failure is only returned when provisioning succeeded.
/// Post phase: never fails.
pub async fn run(app: &AppContext, args: &InputArgs, store: &impl RunStateStore) -> Result<()> {
    let phase = match store.phase().await {
        Ok(phase) => phase,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "could not read run state; assuming main phase");
            Phase::Main
        }
    };
    tracing::info!(?phase, "action phase");

    match phase {
        Phase::Main => {
            let result = setup::run(app, args, store).await;
            // The post step must run teardown even after a failed setup.
            let marked = store.mark_main_done().await.context("saving run state");
            match (result, marked) {
                (Err(setup_err), Err(mark_err)) => {
                    tracing::warn!(error = %format!("{mark_err:#}"), "could not mark main phase done");
                    Err(setup_err)
                }
                (result, marked) => marked.and(result),
            }
        }
        Phase::Post => {
            match cleanup::run(app, args, store).await {
                Ok(report) if !report.is_clean() => {
                    tracing::warn!(failures = report.failures.len(), "cleanup finished with failures");
                }
                Ok(_) => {}
                Err(e) => {
                    let message = format!("cleanup skipped: {e:#}");
                    tracing::warn!("{message}");
                    if app.github_actions {
                        println!("{}", workflow::command("warning", &message));
                    } else {
                        app.output.warn(&message);
                    }
                }
            }
            Ok(())
        }
    }
}
