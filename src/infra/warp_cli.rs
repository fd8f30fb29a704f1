//! Infrastructure implementation of the WARP client ports.
//!
//! Every invocation is `<program> --accept-tos <subcommand> [args]`.

use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{ClientControl, ClientInspector, CommandRunner};
use crate::domain::Platform;
use crate::infra::command_runner::{DEFAULT_CLI_TIMEOUT, TokioCommandRunner};

/// `warp-cli` on linux and macOS, where the package puts it on `PATH`.
pub const WARP_CLI: &str = "warp-cli";

/// Absolute path of `warp-cli.exe` after the Windows package is installed.
/// The current process does not see the `PATH` update made for later steps.
pub const WARP_CLI_WINDOWS: &str = r"C:\Program Files\Cloudflare\Cloudflare WARP\warp-cli.exe";

/// Adapter that routes all `warp-cli` calls through a `CommandRunner`.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
#[derive(Debug)]
pub struct WarpCli<R: CommandRunner> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> WarpCli<R> {
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    async fn invoke(&self, args: &[&str]) -> Result<Output> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("--accept-tos");
        full.extend_from_slice(args);
        self.runner
            .run(&self.program, &full)
            .await
            .with_context(|| format!("warp-cli {}", args.join(" ")))
    }
}

impl WarpCli<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        let program = match platform {
            Platform::Win32 => WARP_CLI_WINDOWS,
            Platform::Linux | Platform::Darwin => WARP_CLI,
        };
        Self::new(TokioCommandRunner::new(DEFAULT_CLI_TIMEOUT), program)
    }
}

impl<R: CommandRunner> ClientInspector for WarpCli<R> {
    async fn status(&self) -> Result<Output> {
        self.invoke(&["status"]).await
    }

    async fn settings(&self) -> Result<Output> {
        self.invoke(&["settings"]).await
    }
}

impl<R: CommandRunner> ClientControl for WarpCli<R> {
    async fn connect(&self) -> Result<Output> {
        self.invoke(&["connect"]).await
    }

    async fn disconnect(&self) -> Result<Output> {
        self.invoke(&["disconnect"]).await
    }

    async fn delete_registration(&self) -> Result<Output> {
        self.invoke(&["registration", "delete"]).await
    }

    async fn set_vnet(&self, vnet: &str) -> Result<Output> {
        self.invoke(&["vnet", vnet]).await
    }
}
