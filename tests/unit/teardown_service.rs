//! Tests for the `teardown` application service.

#![allow(clippy::expect_used)]

use setup_warp::application::services::provision::Collaborators;
use setup_warp::application::services::teardown::{TeardownStep, teardown};
use setup_warp::domain::Platform;

use crate::helpers::{ORG, policy, settings_registered, settings_unregistered};
use crate::mocks::{
    Journal, MemoryStateStore, RecordingDelay, RecordingHost, RecordingReporter, ScriptedClient,
};

#[tokio::test]
async fn connected_run_is_disconnected_unregistered_and_cleaned() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = ScriptedClient::new(&journal).with_settings(vec![settings_unregistered()]);
    let store = MemoryStateStore::connected(&journal);
    let reporter = RecordingReporter::default();
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &reporter,
    };

    let report = teardown(&deps, Some(ORG), &policy(3)).await;

    assert!(report.is_clean());
    assert!(!report.unregistration_skipped);
    assert_eq!(
        journal.entries(),
        vec![
            "load record",
            "disconnect",
            "registration delete",
            "settings",
            "remove configuration",
        ]
    );
    assert!(reporter.warnings().is_empty());
}

#[tokio::test]
async fn never_connected_run_only_removes_configuration() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = ScriptedClient::new(&journal);
    let store = MemoryStateStore::new(&journal);
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &RecordingReporter::default(),
    };

    let report = teardown(&deps, Some(ORG), &policy(3)).await;

    assert!(report.unregistration_skipped);
    assert_eq!(report.attempted, vec![TeardownStep::RemoveConfiguration]);
    assert_eq!(journal.entries(), vec!["load record", "remove configuration"]);
}

#[tokio::test]
async fn unreadable_record_is_treated_as_not_connected() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = ScriptedClient::new(&journal);
    let store = MemoryStateStore::connected(&journal).failing_load();
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &RecordingReporter::default(),
    };

    let report = teardown(&deps, Some(ORG), &policy(3)).await;

    assert!(report.unregistration_skipped);
    assert_eq!(journal.count("disconnect"), 0);
}

#[tokio::test]
async fn failing_step_does_not_stop_later_steps() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = ScriptedClient::new(&journal)
        .with_settings(vec![settings_unregistered()])
        .failing("disconnect");
    let store = MemoryStateStore::connected(&journal);
    let reporter = RecordingReporter::default();
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &reporter,
    };

    let report = teardown(&deps, Some(ORG), &policy(3)).await;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].step, TeardownStep::Disconnect);
    assert!(report.failures[0].error.contains("warp-cli disconnect"));
    assert_eq!(journal.count("registration delete"), 1);
    assert_eq!(journal.count("remove configuration"), 1);
    assert_eq!(reporter.warnings().len(), 1);
}

#[tokio::test]
async fn unregistration_timeout_still_removes_configuration() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = ScriptedClient::new(&journal).with_settings(vec![settings_registered()]);
    let store = MemoryStateStore::connected(&journal);
    let delay = RecordingDelay::default();
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &delay,
        reporter: &RecordingReporter::default(),
    };

    let report = teardown(&deps, Some(ORG), &policy(2)).await;

    assert_eq!(journal.count("settings"), 2);
    assert_eq!(
        report.failures.iter().map(|f| f.step).collect::<Vec<_>>(),
        vec![TeardownStep::ConfirmUnregistered]
    );
    assert_eq!(journal.count("remove configuration"), 1);
}

#[tokio::test]
async fn every_step_failing_still_attempts_all_of_them() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux).failing("remove configuration");
    let client = ScriptedClient::new(&journal)
        .failing("disconnect")
        .failing("registration delete");
    let store = MemoryStateStore::connected(&journal);
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &RecordingReporter::default(),
    };

    let report = teardown(&deps, None, &policy(2)).await;

    assert_eq!(
        report.attempted,
        vec![
            TeardownStep::Disconnect,
            TeardownStep::DeleteRegistration,
            TeardownStep::ConfirmUnregistered,
            TeardownStep::RemoveConfiguration,
        ]
    );
    assert_eq!(report.failures.len(), 4);
}
