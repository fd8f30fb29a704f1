//! Tests for the `provision` application service.
//!
//! Verifies step ordering, abort-on-first-failure and that the provisioning
//! record is only written once the connection is verified.

#![allow(clippy::expect_used)]

use setup_warp::application::services::provision::{Collaborators, provision};
use setup_warp::domain::{
    Credentials, InstallSpec, Platform, SetupError, SetupPlan, VersionPin,
};

use crate::helpers::{
    credentials, plan, policy, settings_registered, settings_unregistered, status_connected,
    status_connecting, status_registration_missing,
};
use crate::mocks::{
    Journal, MemoryStateStore, NoopReporter, RecordingDelay, RecordingHost, ScriptedClient,
};

fn happy_client(journal: &Journal) -> ScriptedClient {
    ScriptedClient::new(journal)
        .with_settings(vec![settings_registered()])
        .with_status(vec![status_connected()])
}

fn full_plan() -> SetupPlan {
    SetupPlan::new(
        InstallSpec {
            platform: Platform::Linux,
            version: VersionPin::Exact("2024.6.415".to_string()),
        },
        credentials(),
        true,
        true,
        Some("vnet-1"),
    )
    .expect("valid plan")
}

#[tokio::test]
async fn runs_every_step_in_order() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = happy_client(&journal);
    let store = MemoryStateStore::new(&journal);
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &NoopReporter,
    };

    provision(&deps, &full_plan(), &policy(5))
        .await
        .expect("provisions");

    assert_eq!(
        journal.entries(),
        vec![
            "install",
            "root certificate",
            "write configuration",
            "docker dns",
            "connect",
            "settings",
            "connect",
            "status",
            "save record",
            "vnet vnet-1",
        ]
    );
    assert!(store.record().connected);
    assert!(store.record().connected_at.is_some());
}

#[tokio::test]
async fn optional_steps_are_skipped_when_not_requested() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = happy_client(&journal);
    let store = MemoryStateStore::new(&journal);
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &NoopReporter,
    };

    provision(&deps, &plan(Platform::Linux), &policy(5))
        .await
        .expect("provisions");

    let entries = journal.entries();
    assert!(!entries.iter().any(|e| e == "root certificate"));
    assert!(!entries.iter().any(|e| e == "docker dns"));
    assert!(!entries.iter().any(|e| e.starts_with("vnet")));
}

#[tokio::test]
async fn registration_is_verified_before_connecting() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = ScriptedClient::new(&journal)
        .with_settings(vec![settings_unregistered(), settings_registered()])
        .with_status(vec![status_registration_missing(), status_connected()]);
    let store = MemoryStateStore::new(&journal);
    let delay = RecordingDelay::default();
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &delay,
        reporter: &NoopReporter,
    };

    let outcome = provision(&deps, &plan(Platform::Linux), &policy(5))
        .await
        .expect("provisions");

    assert_eq!(outcome.registration.attempts, 2);
    assert_eq!(outcome.connection.attempts, 2);
    assert_eq!(outcome.connection.corrections, 1);
    let last_settings = journal
        .entries()
        .iter()
        .rposition(|e| e == "settings")
        .expect("settings probed");
    let first_status = journal.position("status").expect("status probed");
    assert!(last_settings < first_status);
}

#[tokio::test]
async fn record_is_not_saved_when_connection_never_verifies() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = ScriptedClient::new(&journal)
        .with_settings(vec![settings_registered()])
        .with_status(vec![status_connecting()]);
    let store = MemoryStateStore::new(&journal);
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &NoopReporter,
    };

    let err = provision(&deps, &plan(Platform::Linux), &policy(3))
        .await
        .expect_err("never connects");

    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::VerificationTimeout { attempts: 3, .. })
    ));
    assert_eq!(journal.count("save record"), 0);
    assert!(!store.record().connected);
}

#[tokio::test]
async fn install_failure_aborts_remaining_steps() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux).failing("install");
    let client = happy_client(&journal);
    let store = MemoryStateStore::new(&journal);
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &NoopReporter,
    };

    let err = provision(&deps, &plan(Platform::Linux), &policy(3))
        .await
        .expect_err("install fails");

    assert!(format!("{err:#}").contains("installing WARP client"));
    assert_eq!(journal.entries(), vec!["install"]);
}

#[tokio::test]
async fn failing_connect_command_is_a_command_failure() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = happy_client(&journal).failing("connect");
    let store = MemoryStateStore::new(&journal);
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &NoopReporter,
    };

    let err = provision(&deps, &plan(Platform::Linux), &policy(3))
        .await
        .expect_err("connect fails");

    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::CommandFailed { code: Some(1), .. })
    ));
    assert_eq!(journal.count("settings"), 0);
}

#[tokio::test]
async fn vnet_failure_fails_provisioning_after_record_is_saved() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Linux);
    let client = happy_client(&journal).failing("vnet");
    let store = MemoryStateStore::new(&journal);
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &NoopReporter,
    };

    let result = provision(&deps, &full_plan(), &policy(3)).await;

    assert!(result.is_err());
    // Teardown still has to undo the connection.
    assert!(store.record().connected);
}

#[tokio::test]
async fn platform_mismatch_fails_before_any_side_effect() {
    let journal = Journal::default();
    let host = RecordingHost::new(&journal, Platform::Darwin);
    let client = happy_client(&journal);
    let store = MemoryStateStore::new(&journal);
    let deps = Collaborators {
        host: &host,
        client: &client,
        store: &store,
        delay: &RecordingDelay::default(),
        reporter: &NoopReporter,
    };

    let result = provision(&deps, &plan(Platform::Linux), &policy(3)).await;

    assert!(result.is_err());
    assert!(journal.entries().is_empty());
}

#[test]
fn missing_credentials_are_rejected_up_front() {
    let err = Credentials::from_inputs(Some("acme"), Some(""), Some("s3cret"), None)
        .expect_err("client id missing");
    assert!(matches!(err, SetupError::MissingInput("auth_client_id")));
}
