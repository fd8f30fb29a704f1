//! Linux host: apt package from `pkg.cloudflareclient.com`, MDM in
//! `/var/lib/cloudflare-warp`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, Downloader, PlatformHost};
use crate::domain::docker::{self, DAEMON_CONFIG_PATH};
use crate::domain::mdm::{self, MdmFormat};
use crate::domain::{Credentials, Platform, VersionPin};
use crate::infra::platform::{ROOT_CERTIFICATE_URL, path_str, place_privileged, run_checked};

pub const GPG_KEY_URL: &str = "https://pkg.cloudflareclient.com/pubkey.gpg";
pub const KEYRING_PATH: &str = "/usr/share/keyrings/cloudflare-warp-archive-keyring.gpg";
pub const SOURCES_LIST_PATH: &str = "/etc/apt/sources.list.d/cloudflare-client.list";
pub const MDM_PATH: &str = "/var/lib/cloudflare-warp/mdm.xml";
pub const CA_CERT_PATH: &str = "/usr/local/share/ca-certificates/Cloudflare_CA.crt";
pub const PACKAGE: &str = "cloudflare-warp";

#[derive(Debug)]
pub struct LinuxHost<R: CommandRunner, D: Downloader> {
    runner: R,
    downloader: D,
}

impl<R: CommandRunner, D: Downloader> LinuxHost<R, D> {
    pub fn new(runner: R, downloader: D) -> Self {
        Self { runner, downloader }
    }

    async fn stdout_of(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = run_checked(&self.runner, program, args).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn add_apt_repository(&self) -> Result<()> {
        let key = self
            .downloader
            .download(GPG_KEY_URL)
            .await
            .context("downloading Cloudflare package signing key")?;
        run_checked(
            &self.runner,
            "sudo",
            &["gpg", "--yes", "--dearmor", "--output", KEYRING_PATH, path_str(&key)?],
        )
        .await?;

        let arch = self.stdout_of("dpkg", &["--print-architecture"]).await?;
        let codename = self.stdout_of("lsb_release", &["-cs"]).await?;
        let source = format!(
            "deb [arch={arch} signed-by={KEYRING_PATH}] https://pkg.cloudflareclient.com/ {codename} main\n"
        );
        place_privileged(&self.runner, &source, Path::new(SOURCES_LIST_PATH)).await
    }
}

/// The apt package argument for a version pin.
#[must_use]
pub fn package_spec(version: &VersionPin) -> String {
    match version {
        VersionPin::Latest => PACKAGE.to_string(),
        VersionPin::Exact(v) => format!("{PACKAGE}={v}*"),
    }
}

impl<R: CommandRunner, D: Downloader> PlatformHost for LinuxHost<R, D> {
    fn platform(&self) -> Platform {
        Platform::Linux
    }

    async fn install_client(&self, version: &VersionPin) -> Result<()> {
        self.add_apt_repository().await?;
        run_checked(&self.runner, "sudo", &["apt-get", "update"]).await?;
        let package = package_spec(version);
        run_checked(
            &self.runner,
            "sudo",
            &["apt-get", "install", "-y", &package],
        )
        .await?;
        Ok(())
    }

    async fn install_root_certificate(&self) -> Result<()> {
        let cert = self
            .downloader
            .download(ROOT_CERTIFICATE_URL)
            .await
            .context("downloading Cloudflare root certificate")?;
        run_checked(&self.runner, "sudo", &["cp", path_str(&cert)?, CA_CERT_PATH]).await?;
        run_checked(&self.runner, "sudo", &["update-ca-certificates"]).await?;
        Ok(())
    }

    async fn write_configuration(&self, credentials: &Credentials) -> Result<()> {
        let xml = mdm::render(MdmFormat::XmlDict, credentials);
        place_privileged(&self.runner, &xml, Path::new(MDM_PATH)).await
    }

    async fn remove_configuration(&self) -> Result<()> {
        run_checked(&self.runner, "sudo", &["rm", "-f", MDM_PATH]).await?;
        Ok(())
    }

    async fn configure_docker_dns(&self) -> Result<()> {
        // Only a missing daemon.json starts from an empty object; a file that
        // exists but cannot be read must never be overwritten.
        let exists = self
            .runner
            .run("sudo", &["test", "-f", DAEMON_CONFIG_PATH])
            .await
            .context("checking for the docker daemon config")?;
        let existing = match exists.status.code() {
            Some(0) => {
                let out = run_checked(&self.runner, "sudo", &["cat", DAEMON_CONFIG_PATH])
                    .await
                    .context("reading the docker daemon config")?;
                Some(String::from_utf8_lossy(&out.stdout).into_owned())
            }
            Some(1) => None,
            code => anyhow::bail!(
                "could not check for {DAEMON_CONFIG_PATH} (exit status {code:?})"
            ),
        };
        let merged = docker::merge_dns(existing.as_deref())?;
        place_privileged(&self.runner, &merged, Path::new(DAEMON_CONFIG_PATH)).await?;
        run_checked(&self.runner, "sudo", &["systemctl", "restart", "docker"]).await?;
        Ok(())
    }
}
