//! macOS host: Homebrew cask or pinned `.pkg`, MDM in Managed Preferences.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, Downloader, PlatformHost};
use crate::domain::mdm::{self, MdmFormat};
use crate::domain::{Credentials, Platform, SetupError, VersionPin};
use crate::infra::platform::{ROOT_CERTIFICATE_URL, path_str, place_privileged, run_checked};

pub const MDM_PATH: &str = "/Library/Managed Preferences/com.cloudflare.warp.plist";
pub const SYSTEM_KEYCHAIN: &str = "/Library/Keychains/System.keychain";

/// Release download URL for a pinned client version.
#[must_use]
pub fn pkg_url(version: &str) -> String {
    format!("https://1111-releases.cloudflareclient.com/mac/Cloudflare_WARP_{version}.pkg")
}

#[derive(Debug)]
pub struct MacHost<R: CommandRunner, D: Downloader> {
    runner: R,
    downloader: D,
}

impl<R: CommandRunner, D: Downloader> MacHost<R, D> {
    pub fn new(runner: R, downloader: D) -> Self {
        Self { runner, downloader }
    }
}

impl<R: CommandRunner, D: Downloader> PlatformHost for MacHost<R, D> {
    fn platform(&self) -> Platform {
        Platform::Darwin
    }

    async fn install_client(&self, version: &VersionPin) -> Result<()> {
        match version {
            VersionPin::Latest => {
                run_checked(&self.runner, "brew", &["install", "--cask", "cloudflare-warp"])
                    .await?;
            }
            VersionPin::Exact(v) => {
                let url = pkg_url(v);
                let pkg = self
                    .downloader
                    .download(&url)
                    .await
                    .with_context(|| format!("downloading WARP {v}"))?;
                run_checked(
                    &self.runner,
                    "sudo",
                    &["installer", "-pkg", path_str(&pkg)?, "-target", "/"],
                )
                .await?;
            }
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
            "sudo",
            &[
                "security",
                "add-trusted-cert",
                "-d",
                "-r",
                "trustRoot",
                "-k",
                SYSTEM_KEYCHAIN,
                path_str(&cert)?,
            ],
        )
        .await?;
        Ok(())
    }

    async fn write_configuration(&self, credentials: &Credentials) -> Result<()> {
        let plist = mdm::render(MdmFormat::Plist, credentials);
        place_privileged(&self.runner, &plist, Path::new(MDM_PATH)).await
    }

    async fn remove_configuration(&self) -> Result<()> {
        run_checked(&self.runner, "sudo", &["rm", "-f", MDM_PATH]).await?;
        Ok(())
    }

    async fn configure_docker_dns(&self) -> Result<()> {
        Err(SetupError::DockerDnsUnsupported(Platform::Darwin).into())
    }
}
