//! Per-OS implementations of the `PlatformHost` port.
//!
//! [`HostPlatform`] is the single handle selected at startup; it dispatches
//! to the variant for the planned platform.

pub mod linux;
pub mod macos;
pub mod windows;

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, Downloader, PlatformHost};
use crate::application::services::check_output;
use crate::domain::{Credentials, Platform, VersionPin};
use crate::infra::command_runner::{DEFAULT_INSTALL_TIMEOUT, TokioCommandRunner};
use crate::infra::download::HttpDownloader;

pub use linux::LinuxHost;
pub use macos::MacHost;
pub use windows::WindowsHost;

/// Cloudflare root CA used for TLS inspection.
pub const ROOT_CERTIFICATE_URL: &str = "https://developers.cloudflare.com/cloudflare-one/static/documentation/connections/Cloudflare_CA.pem";

/// The platform host for this run.
#[derive(Debug)]
pub enum HostPlatform<R: CommandRunner, D: Downloader> {
    Linux(LinuxHost<R, D>),
    Darwin(MacHost<R, D>),
    Win32(WindowsHost<R, D>),
}

impl HostPlatform<TokioCommandRunner, HttpDownloader> {
    /// Production host for `platform`. `path_file` is the host pipeline's
    /// `PATH` extension file, if any.
    #[must_use]
    pub fn for_platform(platform: Platform, path_file: Option<PathBuf>) -> Self {
        let runner = TokioCommandRunner::new(DEFAULT_INSTALL_TIMEOUT);
        match platform {
            Platform::Linux => Self::Linux(LinuxHost::new(runner, HttpDownloader)),
            Platform::Darwin => Self::Darwin(MacHost::new(runner, HttpDownloader)),
            Platform::Win32 => Self::Win32(WindowsHost::new(
                runner,
                HttpDownloader,
                PathBuf::from(windows::CONFIG_DIR),
                path_file,
            )),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $host:ident => $call:expr) => {
        match $self {
            HostPlatform::Linux($host) => $call,
            HostPlatform::Darwin($host) => $call,
            HostPlatform::Win32($host) => $call,
        }
    };
}

impl<R: CommandRunner, D: Downloader> PlatformHost for HostPlatform<R, D> {
    fn platform(&self) -> Platform {
        dispatch!(self, h => h.platform())
    }

    async fn install_client(&self, version: &VersionPin) -> Result<()> {
        dispatch!(self, h => h.install_client(version).await)
    }

    async fn install_root_certificate(&self) -> Result<()> {
        dispatch!(self, h => h.install_root_certificate().await)
    }

    async fn write_configuration(&self, credentials: &Credentials) -> Result<()> {
        dispatch!(self, h => h.write_configuration(credentials).await)
    }

    async fn remove_configuration(&self) -> Result<()> {
        dispatch!(self, h => h.remove_configuration().await)
    }

    async fn configure_docker_dns(&self) -> Result<()> {
        dispatch!(self, h => h.configure_docker_dns().await)
    }
}

/// Run a command and fail on non-zero exit.
pub(crate) async fn run_checked(
    runner: &impl CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<Output> {
    let rendered = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    let output = runner
        .run(program, args)
        .await
        .with_context(|| format!("running {rendered}"))?;
    check_output(output, &rendered)
}

/// Write `content` to a root-owned `dest` via a temp file and `sudo mv`.
pub(crate) async fn place_privileged(
    runner: &impl CommandRunner,
    content: &str,
    dest: &Path,
) -> Result<()> {
    let dir = dest
        .parent()
        .with_context(|| format!("{} has no parent directory", dest.display()))?;
    let staged = stage(content)?;
    let staged_str = path_str(&staged)?;
    let dest_str = path_str(dest)?;
    let dir_str = path_str(dir)?;

    run_checked(runner, "sudo", &["mkdir", "-p", dir_str]).await?;
    run_checked(runner, "sudo", &["mv", staged_str, dest_str]).await?;
    Ok(())
}

fn stage(content: &str) -> Result<tempfile::TempPath> {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().context("creating staging file")?;
    file.write_all(content.as_bytes())
        .context("writing staging file")?;
    file.flush().context("flushing staging file")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o644))
            .context("setting staging file permissions")?;
    }

    Ok(file.into_temp_path())
}

pub(crate) fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
}
