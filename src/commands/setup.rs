//! `setup-warp setup`: provision WARP for the rest of the job.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::RunStateStore;
use crate::application::services::provision::{Collaborators, provision};
use crate::cli::InputArgs;
use crate::domain::inputs::parse_bool_input;
use crate::domain::{Credentials, InstallSpec, SetupPlan};
use crate::infra::delay::TokioDelay;
use crate::infra::platform::HostPlatform;
use crate::infra::warp_cli::WarpCli;
use crate::output::workflow;

/// Validate every input, then install, configure, register and connect.
///
/// Nothing touches the runner until the plan has been validated.
///
/// # Errors
///
/// Returns an error for invalid inputs or if any provisioning step fails.
pub async fn run(app: &AppContext, args: &InputArgs, store: &impl RunStateStore) -> Result<()> {
    if app.github_actions {
        let secret = args.auth_client_secret.as_deref().map(str::trim);
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            workflow::add_mask(secret);
        }
    }
    let plan = plan(args)?;

    let platform = plan.install.platform;
    let host = HostPlatform::for_platform(platform, app.path_file());
    let client = WarpCli::for_platform(platform);
    let reporter = app.reporter();
    let deps = Collaborators {
        host: &host,
        client: &client,
        store,
        delay: &TokioDelay,
        reporter: &reporter,
    };

    let _group = app.group("Set up Cloudflare WARP");
    let outcome = provision(&deps, &plan, &args.policy()).await?;
    tracing::debug!(
        registration_attempts = outcome.registration.attempts,
        connection_attempts = outcome.connection.attempts,
        corrections = outcome.connection.corrections,
        "provisioning converged"
    );
    if !app.github_actions {
        app.output.kv("organization", &plan.credentials.organization);
        app.output.kv("platform", platform.as_str());
    }
    Ok(())
}

/// Resolve the inputs into a validated [`SetupPlan`].
///
/// # Errors
///
/// Returns the first input error: unsupported platform, missing credential,
/// malformed boolean, or Docker DNS requested outside linux.
pub fn plan(args: &InputArgs) -> Result<SetupPlan> {
    let install = InstallSpec::resolve(args.platform.as_deref(), args.warp_version.as_deref())?;
    let credentials = Credentials::from_inputs(
        args.organization.as_deref(),
        args.auth_client_id.as_deref(),
        args.auth_client_secret.as_deref(),
        args.unique_client_id.as_deref(),
    )?;
    let install_root_certificate = parse_bool_input(
        "install_root_certificate",
        args.install_root_certificate.as_deref(),
    )?;
    let configure_docker_dns =
        parse_bool_input("configure_docker_dns", args.configure_docker_dns.as_deref())?;
    Ok(SetupPlan::new(
        install,
        credentials,
        install_root_certificate,
        configure_docker_dns,
        args.vnet.as_deref(),
    )?)
}
