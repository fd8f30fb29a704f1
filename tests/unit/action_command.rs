//! Main-phase error reporting of the action entry point.

use clap::Parser;
use setup_warp::app::{AppContext, AppFlags};
use setup_warp::cli::{Cli, InputArgs};
use setup_warp::commands::action;

use crate::mocks::{Journal, MemoryStateStore};

fn quiet_app() -> AppContext {
    AppContext::new(&AppFlags {
        no_color: true,
        quiet: true,
        json: false,
    })
}

fn inputs(extra: &[&str]) -> InputArgs {
    let args = [
        "setup-warp",
        "--organization",
        "acme",
        "--auth-client-id",
        "id.access",
        "--auth-client-secret",
        "hunter2",
    ]
    .into_iter()
    .chain(extra.iter().copied());
    Cli::try_parse_from(args).expect("parses").inputs
}

#[tokio::test]
async fn setup_error_wins_over_marker_error() {
    let journal = Journal::default();
    let store = MemoryStateStore::new(&journal).failing_mark();

    let err = action::run(&quiet_app(), &inputs(&["--platform", "plan9"]), &store)
        .await
        .expect_err("setup fails");

    let message = format!("{err:#}");
    assert!(message.contains("Unsupported platform 'plan9'"), "{message}");
    assert!(!message.contains("saving run state"), "{message}");
}

#[tokio::test]
async fn failed_setup_still_marks_main_done() {
    let journal = Journal::default();
    let store = MemoryStateStore::new(&journal);

    action::run(&quiet_app(), &inputs(&["--platform", "plan9"]), &store)
        .await
        .expect_err("setup fails");

    assert!(store.is_post());
}
