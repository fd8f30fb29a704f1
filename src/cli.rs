//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;
use crate::domain::{BackoffPolicy, Platform, SetupError};
use crate::infra::state::StateBackend;

/// Install, register and connect the Cloudflare WARP client on a CI runner
#[derive(Parser)]
#[command(name = "setup-warp", version, propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    #[command(flatten)]
    pub inputs: InputArgs,

    /// Without a subcommand, run the main or post phase of the action.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install, configure, register and connect WARP
    Setup,

    /// Disconnect, unregister and remove the WARP configuration
    Cleanup,

    /// Show WARP registration and connection state
    Status,

    /// Show version
    Version,
}

/// Action inputs. Each one is also read from the `INPUT_*` variable the
/// runner sets for it; empty values count as absent.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Cloudflare Zero Trust organization (team name)
    #[arg(long, global = true, env = "INPUT_ORGANIZATION")]
    pub organization: Option<String>,

    /// Service token client id
    #[arg(long, global = true, env = "INPUT_AUTH_CLIENT_ID")]
    pub auth_client_id: Option<String>,

    /// Service token client secret
    #[arg(long, global = true, env = "INPUT_AUTH_CLIENT_SECRET", hide_env_values = true)]
    pub auth_client_secret: Option<String>,

    /// Unique client id for the device
    #[arg(long, global = true, env = "INPUT_UNIQUE_CLIENT_ID")]
    pub unique_client_id: Option<String>,

    /// WARP client version to install (latest when absent)
    #[arg(long = "warp-version", global = true, env = "INPUT_VERSION")]
    pub warp_version: Option<String>,

    /// Virtual network to select after connecting
    #[arg(long, global = true, env = "INPUT_VNET")]
    pub vnet: Option<String>,

    /// Point the Docker daemon at the WARP DNS proxy (linux only)
    #[arg(long, global = true, env = "INPUT_CONFIGURE_DOCKER_DNS", value_name = "BOOL")]
    pub configure_docker_dns: Option<String>,

    /// Trust the Cloudflare root certificate system-wide
    #[arg(long, global = true, env = "INPUT_INSTALL_ROOT_CERTIFICATE", value_name = "BOOL")]
    pub install_root_certificate: Option<String>,

    /// Target platform: linux, darwin or win32 (detected when absent)
    #[arg(long, global = true)]
    pub platform: Option<String>,

    /// Probes before giving up on a WARP state
    #[arg(
        long,
        global = true,
        env = "SETUP_WARP_VERIFY_ATTEMPTS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub verify_attempts: u32,

    /// Upper bound on the delay between probes, in milliseconds
    #[arg(long, global = true, env = "SETUP_WARP_VERIFY_MAX_DELAY_MS", default_value_t = 4000)]
    pub verify_max_delay_ms: u64,

    /// State file used outside GitHub Actions
    #[arg(long, global = true, env = "SETUP_WARP_STATE_FILE")]
    pub state_file: Option<PathBuf>,
}

impl InputArgs {
    /// Backoff policy for the convergence loops.
    #[must_use]
    pub fn policy(&self) -> BackoffPolicy {
        BackoffPolicy::with_limits(
            self.verify_attempts,
            Duration::from_millis(self.verify_max_delay_ms),
        )
    }

    /// Explicit platform, or the host's.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::UnsupportedPlatform`] for any other identifier.
    pub fn target_platform(&self) -> Result<Platform, SetupError> {
        match self.platform.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(id) => id.parse(),
            None => Platform::current(),
        }
    }

    /// Organization, treating empty as absent.
    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        self.organization
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
    }
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            inputs,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            no_color,
            quiet,
            json,
        });
        match command {
            Some(Command::Version) => {
                commands::version::run(json);
                Ok(())
            }
            Some(Command::Status) => commands::status::run(&app, &inputs).await,
            Some(Command::Setup) => {
                let store = StateBackend::detect(inputs.state_file.clone())?;
                commands::setup::run(&app, &inputs, &store).await
            }
            Some(Command::Cleanup) => {
                let store = StateBackend::detect(inputs.state_file.clone())?;
                commands::cleanup::run_standalone(&app, &inputs, &store).await
            }
            None => {
                let store = StateBackend::detect(inputs.state_file.clone())?;
                commands::action::run(&app, &inputs, &store).await
            }
        }
    }
}
