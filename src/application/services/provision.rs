//! Application service: provisioning use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::{Context, Result};

use crate::application::ports::{
    Delay, PlatformHost, ProgressReporter, RunStateStore, WarpClient,
};
use crate::application::services::check_output;
use crate::application::services::convergence::{ConvergenceReport, await_state};
use crate::domain::{BackoffPolicy, DesiredState, Lifecycle, ProvisioningRecord, SetupPlan, Stage};

/// Port implementations a provisioning or teardown run talks to.
pub struct Collaborators<'a, H, C, S, D, R> {
    pub host: &'a H,
    pub client: &'a C,
    pub store: &'a S,
    pub delay: &'a D,
    pub reporter: &'a R,
}

/// Outcome of the `provision` use-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub registration: ConvergenceReport,
    pub connection: ConvergenceReport,
}

/// Install, configure, register and connect the WARP client.
///
/// Steps run strictly in order; the first failure aborts the rest. The
/// provisioning record is saved only once the connection is verified.
///
/// # Errors
///
/// Returns an error if the host does not match the planned platform (before
/// any side effect), if any command fails, or if registration or connection
/// is never observed.
pub async fn provision<H, C, S, D, R>(
    deps: &Collaborators<'_, H, C, S, D, R>,
    plan: &SetupPlan,
    policy: &BackoffPolicy,
) -> Result<ProvisionOutcome>
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
    anyhow::ensure!(
        host.platform() == plan.install.platform,
        "platform host is {} but the plan targets {}",
        host.platform(),
        plan.install.platform
    );
    let organization = plan.credentials.organization.as_str();
    let mut lifecycle = Lifecycle::default();

    lifecycle.advance(Stage::Installing)?;
    reporter.step("installing WARP client...");
    host.install_client(&plan.install.version)
        .await
        .context("installing WARP client")?;
    if plan.install_root_certificate {
        reporter.step("installing Cloudflare root certificate...");
        host.install_root_certificate()
            .await
            .context("installing root certificate")?;
    }
    reporter.success("WARP client installed");

    lifecycle.advance(Stage::Configuring)?;
    reporter.step("writing MDM configuration...");
    host.write_configuration(&plan.credentials)
        .await
        .context("writing MDM configuration")?;
    if plan.configure_docker_dns {
        reporter.step("configuring Docker DNS...");
        host.configure_docker_dns()
            .await
            .context("configuring Docker DNS")?;
    }

    lifecycle.advance(Stage::Registering)?;
    reporter.step(&format!("registering with organization '{organization}'..."));
    connect(client).await?;
    let registration =
        await_state(client, delay, policy, DesiredState::Registered, organization).await?;
    reporter.success("WARP client registered");

    lifecycle.advance(Stage::Connecting)?;
    reporter.step("connecting...");
    connect(client).await?;
    let connection =
        await_state(client, delay, policy, DesiredState::Connected, organization).await?;

    lifecycle.advance(Stage::Connected)?;
    store
        .save_record(&ProvisioningRecord::connected_now())
        .await
        .context("saving provisioning record")?;
    reporter.success("WARP connected");

    if let Some(vnet) = &plan.vnet {
        reporter.step(&format!("selecting virtual network {vnet}..."));
        let output = client.set_vnet(vnet).await.context("warp-cli vnet")?;
        check_output(output, "warp-cli vnet")?;
    }

    Ok(ProvisionOutcome {
        registration,
        connection,
    })
}

async fn connect(client: &impl WarpClient) -> Result<()> {
    let output = client.connect().await.context("warp-cli connect")?;
    check_output(output, "warp-cli connect")?;
    Ok(())
}
