//! Windows host: Chocolatey package, MDM in `C:\ProgramData\Cloudflare`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, Downloader, PlatformHost};
use crate::domain::mdm::{self, MdmFormat};
use crate::domain::{Credentials, Platform, SetupError, VersionPin};
use crate::infra::platform::{ROOT_CERTIFICATE_URL, path_str, run_checked};

pub const CONFIG_DIR: &str = r"C:\ProgramData\Cloudflare";
pub const MDM_FILE: &str = "mdm.xml";
pub const INSTALL_DIR: &str = r"C:\Program Files\Cloudflare\Cloudflare WARP";

#[derive(Debug)]
pub struct WindowsHost<R: CommandRunner, D: Downloader> {
    runner: R,
    downloader: D,
    config_dir: PathBuf,
    path_file: Option<PathBuf>,
}

impl<R: CommandRunner, D: Downloader> WindowsHost<R, D> {
    pub fn new(runner: R, downloader: D, config_dir: PathBuf, path_file: Option<PathBuf>) -> Self {
        Self {
            runner,
            downloader,
            config_dir,
            path_file,
        }
    }

    fn mdm_path(&self) -> PathBuf {
        self.config_dir.join(MDM_FILE)
    }
}

/// Chocolatey arguments for a version pin.
#[must_use]
pub fn choco_args(version: &VersionPin) -> Vec<&str> {
    let mut args = vec!["install", "-y", "--no-progress", "warp"];
    if let VersionPin::Exact(v) = version {
        args.push("--version");
        args.push(v);
    }
    args
}

/// Append `dir` to the host pipeline's `PATH` file so later steps find
/// `warp-cli`.
fn append_path(path_file: &Path, dir: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path_file)
        .with_context(|| format!("opening {}", path_file.display()))?;
    writeln!(file, "{dir}").with_context(|| format!("writing {}", path_file.display()))
}

impl<R: CommandRunner, D: Downloader> PlatformHost for WindowsHost<R, D> {
    fn platform(&self) -> Platform {
        Platform::Win32
    }

    async fn install_client(&self, version: &VersionPin) -> Result<()> {
        run_checked(&self.runner, "choco", &choco_args(version)).await?;
        match &self.path_file {
            Some(path_file) => append_path(path_file, INSTALL_DIR)?,
            None => tracing::debug!("no PATH file; {INSTALL_DIR} not added for later steps"),
        }
        Ok(())
    }

    async fn install_root_certificate(&self) -> Result<()> {
        let cert = self
            .downloader
            .download(ROOT_CERTIFICATE_URL)
            .await
            .context("downloading Cloudflare root certificate")?;
        run_checked(
            &self.runner,
            "certutil",
            &["-addstore", "-f", "Root", path_str(&cert)?],
        )
        .await?;
        Ok(())
    }

    async fn write_configuration(&self, credentials: &Credentials) -> Result<()> {
        let xml = mdm::render(MdmFormat::XmlDict, credentials);
        let dir = self.config_dir.clone();
        let path = self.mdm_path();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating directory {}", dir.display()))?;
            std::fs::write(&path, xml).with_context(|| format!("writing {}", path.display()))
        })
        .await
        .context("write configuration task panicked")?
    }

    async fn remove_configuration(&self) -> Result<()> {
        let path = self.mdm_path();
        tokio::task::spawn_blocking(move || match std::fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing {}", path.display()))
            }
            _ => Ok(()),
        })
        .await
        .context("remove configuration task panicked")?
    }

    async fn configure_docker_dns(&self) -> Result<()> {
        Err(SetupError::DockerDnsUnsupported(Platform::Win32).into())
    }
}
