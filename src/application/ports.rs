//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`; never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{Credentials, Phase, Platform, ProvisioningRecord, VersionPin};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── WARP Client Ports ─────────────────────────────────────────────────────────

/// Read-only queries against the WARP daemon.
#[allow(async_fn_in_trait)]
pub trait ClientInspector {
    /// `warp-cli status`: tunnel state.
    async fn status(&self) -> Result<Output>;
    /// `warp-cli settings`: merged settings including the organization.
    async fn settings(&self) -> Result<Output>;
}

/// State-changing commands against the WARP daemon.
#[allow(async_fn_in_trait)]
pub trait ClientControl {
    /// `warp-cli connect`. Safe to repeat while already connecting.
    async fn connect(&self) -> Result<Output>;
    /// `warp-cli disconnect`.
    async fn disconnect(&self) -> Result<Output>;
    /// `warp-cli registration delete`.
    async fn delete_registration(&self) -> Result<Output>;
    /// `warp-cli vnet <id>`: select a virtual network.
    async fn set_vnet(&self, vnet: &str) -> Result<Output>;
}

/// Composite trait: any type implementing both sub-traits is a `WarpClient`.
pub trait WarpClient: ClientInspector + ClientControl {}

/// Blanket implementation: any type implementing both sub-traits is a `WarpClient`.
impl<T> WarpClient for T where T: ClientInspector + ClientControl {}

// ── Platform Port ─────────────────────────────────────────────────────────────

/// Per-OS side effects. One implementation per supported platform, chosen
/// once at startup.
#[allow(async_fn_in_trait)]
pub trait PlatformHost {
    /// The platform this host provisions.
    fn platform(&self) -> Platform;
    /// Install the WARP client package, latest or pinned.
    async fn install_client(&self, version: &VersionPin) -> Result<()>;
    /// Trust the Cloudflare root CA system-wide.
    async fn install_root_certificate(&self) -> Result<()>;
    /// Place the MDM configuration where the daemon reads it at startup.
    async fn write_configuration(&self, credentials: &Credentials) -> Result<()>;
    /// Remove the MDM configuration. Succeeds if it is already gone.
    async fn remove_configuration(&self) -> Result<()>;
    /// Point the Docker daemon at the WARP DNS proxy.
    async fn configure_docker_dns(&self) -> Result<()>;
}

// ── Download Port ─────────────────────────────────────────────────────────────

/// Fetches remote artifacts (signing keys, certificates, installers).
#[allow(async_fn_in_trait)]
pub trait Downloader {
    /// Download `url` into a temporary file that is removed when dropped.
    async fn download(&self, url: &str) -> Result<tempfile::TempPath>;
}

// ── State Port ────────────────────────────────────────────────────────────────

/// Cross-invocation key/value persistence provided by the host pipeline.
#[allow(async_fn_in_trait)]
pub trait RunStateStore {
    /// Load the provisioning record; a missing record reads as not connected.
    async fn load_record(&self) -> Result<ProvisioningRecord>;
    /// Persist the provisioning record for the post phase.
    async fn save_record(&self, record: &ProvisioningRecord) -> Result<()>;
    /// Whether this invocation is the main or the post phase.
    async fn phase(&self) -> Result<Phase>;
    /// Remember that the main phase ran, so the next invocation is `Post`.
    async fn mark_main_done(&self) -> Result<()>;
}

// ── Delay Port ────────────────────────────────────────────────────────────────

/// Suspends the calling flow between convergence attempts.
#[allow(async_fn_in_trait)]
pub trait Delay {
    async fn sleep(&self, duration: Duration);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
