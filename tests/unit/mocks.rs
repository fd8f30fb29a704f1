//! Mock port implementations shared by the service and host tests.
//!
//! Every mock appends to a shared [`Journal`] so tests can assert the
//! relative order of host, client and store calls.

#![allow(dead_code, clippy::expect_used)]

use std::collections::VecDeque;
use std::process::Output;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use setup_warp::application::ports::{
    ClientControl, ClientInspector, CommandRunner, Delay, Downloader, PlatformHost,
    ProgressReporter, RunStateStore,
};
use setup_warp::domain::{Credentials, Phase, Platform, ProvisioningRecord, VersionPin};

use crate::helpers::{err_output, ok_output};

/// Ordered log of calls across all mocks.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().expect("lock").push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("lock").clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }
}

// ── Mock: scripted WARP client ────────────────────────────────────────────────

/// Replays scripted `status`/`settings` outputs; the last one repeats once
/// the script runs out. Control commands succeed unless listed in `failing`.
pub struct ScriptedClient {
    journal: Journal,
    status: Mutex<VecDeque<Output>>,
    settings: Mutex<VecDeque<Output>>,
    failing: Vec<&'static str>,
}

impl ScriptedClient {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            status: Mutex::new(VecDeque::new()),
            settings: Mutex::new(VecDeque::new()),
            failing: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_status(self, outputs: Vec<Output>) -> Self {
        *self.status.lock().expect("lock") = outputs.into();
        self
    }

    #[must_use]
    pub fn with_settings(self, outputs: Vec<Output>) -> Self {
        *self.settings.lock().expect("lock") = outputs.into();
        self
    }

    #[must_use]
    pub fn failing(mut self, command: &'static str) -> Self {
        self.failing.push(command);
        self
    }

    fn next(queue: &Mutex<VecDeque<Output>>) -> Output {
        let mut queue = queue.lock().expect("lock");
        if queue.len() > 1 {
            queue.pop_front().expect("non-empty")
        } else {
            queue.front().cloned().unwrap_or_else(|| err_output(1, b"no script"))
        }
    }

    fn control(&self, command: &'static str) -> Result<Output> {
        self.journal.push(command);
        if self.failing.contains(&command) {
            return Ok(err_output(1, format!("{command} refused").as_bytes()));
        }
        Ok(ok_output(b"Success\n"))
    }
}

impl ClientInspector for ScriptedClient {
    async fn status(&self) -> Result<Output> {
        self.journal.push("status");
        Ok(Self::next(&self.status))
    }

    async fn settings(&self) -> Result<Output> {
        self.journal.push("settings");
        Ok(Self::next(&self.settings))
    }
}

impl ClientControl for ScriptedClient {
    async fn connect(&self) -> Result<Output> {
        self.control("connect")
    }

    async fn disconnect(&self) -> Result<Output> {
        self.control("disconnect")
    }

    async fn delete_registration(&self) -> Result<Output> {
        self.control("registration delete")
    }

    async fn set_vnet(&self, vnet: &str) -> Result<Output> {
        self.journal.push(format!("vnet {vnet}"));
        if self.failing.contains(&"vnet") {
            return Ok(err_output(1, b"unknown vnet"));
        }
        Ok(ok_output(b"Success\n"))
    }
}

// ── Mock: recording delay ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDelay {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("lock").clone()
    }
}

impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().expect("lock").push(duration);
    }
}

// ── Mock: in-memory state store ───────────────────────────────────────────────

pub struct MemoryStateStore {
    journal: Journal,
    record: Mutex<ProvisioningRecord>,
    post: Mutex<bool>,
    fail_load: bool,
    fail_mark: bool,
}

impl MemoryStateStore {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            record: Mutex::new(ProvisioningRecord::default()),
            post: Mutex::new(false),
            fail_load: false,
            fail_mark: false,
        }
    }

    /// Store whose record says this run connected.
    pub fn connected(journal: &Journal) -> Self {
        let store = Self::new(journal);
        *store.record.lock().expect("lock") = ProvisioningRecord::connected_now();
        store
    }

    #[must_use]
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    #[must_use]
    pub fn failing_mark(mut self) -> Self {
        self.fail_mark = true;
        self
    }

    pub fn record(&self) -> ProvisioningRecord {
        self.record.lock().expect("lock").clone()
    }

    pub fn is_post(&self) -> bool {
        *self.post.lock().expect("lock")
    }
}

impl RunStateStore for MemoryStateStore {
    async fn load_record(&self) -> Result<ProvisioningRecord> {
        self.journal.push("load record");
        if self.fail_load {
            anyhow::bail!("state unreadable");
        }
        Ok(self.record())
    }

    async fn save_record(&self, record: &ProvisioningRecord) -> Result<()> {
        self.journal.push("save record");
        *self.record.lock().expect("lock") = record.clone();
        Ok(())
    }

    async fn phase(&self) -> Result<Phase> {
        Ok(if self.is_post() { Phase::Post } else { Phase::Main })
    }

    async fn mark_main_done(&self) -> Result<()> {
        if self.fail_mark {
            anyhow::bail!("state not writable");
        }
        *self.post.lock().expect("lock") = true;
        Ok(())
    }
}

// ── Mock: recording platform host ─────────────────────────────────────────────

pub struct RecordingHost {
    journal: Journal,
    platform: Platform,
    failing: Vec<&'static str>,
}

impl RecordingHost {
    pub fn new(journal: &Journal, platform: Platform) -> Self {
        Self {
            journal: journal.clone(),
            platform,
            failing: Vec::new(),
        }
    }

    #[must_use]
    pub fn failing(mut self, step: &'static str) -> Self {
        self.failing.push(step);
        self
    }

    fn record(&self, step: &'static str) -> Result<()> {
        self.journal.push(step);
        if self.failing.contains(&step) {
            anyhow::bail!("{step} exploded");
        }
        Ok(())
    }
}

impl PlatformHost for RecordingHost {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn install_client(&self, _: &VersionPin) -> Result<()> {
        self.record("install")
    }

    async fn install_root_certificate(&self) -> Result<()> {
        self.record("root certificate")
    }

    async fn write_configuration(&self, _: &Credentials) -> Result<()> {
        self.record("write configuration")
    }

    async fn remove_configuration(&self) -> Result<()> {
        self.record("remove configuration")
    }

    async fn configure_docker_dns(&self) -> Result<()> {
        self.record("docker dns")
    }
}

// ── Mock: recording command runner ────────────────────────────────────────────

/// Records every command line. Staged files moved with `sudo mv` are read
/// back so tests can inspect what would have been installed. Clones share
/// their records, so a test can keep one while the host owns another.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<String>>>,
    placed: Arc<Mutex<Vec<(String, String)>>>,
    responses: Vec<(&'static str, Output)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
            .respond("dpkg --print-architecture", ok_output(b"arm64\n"))
            .respond("lsb_release -cs", ok_output(b"jammy\n"))
    }

    /// Reply with `output` to any command line starting with `prefix`.
    #[must_use]
    pub fn respond(mut self, prefix: &'static str, output: Output) -> Self {
        self.responses.insert(0, (prefix, output));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    /// `(destination, content)` for every privileged placement.
    pub fn placed(&self) -> Vec<(String, String)> {
        self.placed.lock().expect("lock").clone()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("lock").push(line.clone());

        if let ["mv", staged, dest] = args {
            let content = std::fs::read_to_string(staged)?;
            self.placed
                .lock()
                .expect("lock")
                .push(((*dest).to_string(), content));
        }

        Ok(self
            .responses
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix))
            .map_or_else(|| ok_output(b""), |(_, output)| output.clone()))
    }

    async fn run_with_timeout(&self, program: &str, args: &[&str], _: Duration) -> Result<Output> {
        self.run(program, args).await
    }
}

// ── Mock: downloader writing canned files ─────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeDownloader {
    urls: Arc<Mutex<Vec<String>>>,
}

impl FakeDownloader {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("lock").clone()
    }
}

impl Downloader for FakeDownloader {
    async fn download(&self, url: &str) -> Result<tempfile::TempPath> {
        use std::io::Write;

        self.urls.lock().expect("lock").push(url.to_string());
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"downloaded")?;
        Ok(file.into_temp_path())
    }
}

// ── Mock: progress reporters ──────────────────────────────────────────────────

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

#[derive(Default)]
pub struct RecordingReporter {
    warnings: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, message: &str) {
        self.warnings.lock().expect("lock").push(message.to_string());
    }
}
