//! Action inputs: credentials, install spec and the resolved setup plan.
//!
//! Everything here is validated before the first side effect so that a bad
//! input never leaves a half-provisioned runner behind.

use std::fmt;

use crate::domain::error::SetupError;
use crate::domain::platform::Platform;

/// Organization credentials written into the MDM configuration.
///
/// Values are opaque and copied verbatim; only presence is checked.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub organization: String,
    pub auth_client_id: String,
    pub auth_client_secret: String,
    pub unique_client_id: Option<String>,
}

impl Credentials {
    /// Build credentials from raw inputs, treating empty strings as absent.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::MissingInput`] naming the first required input
    /// that is absent.
    pub fn from_inputs(
        organization: Option<&str>,
        auth_client_id: Option<&str>,
        auth_client_secret: Option<&str>,
        unique_client_id: Option<&str>,
    ) -> Result<Self, SetupError> {
        Ok(Self {
            organization: required("organization", organization)?,
            auth_client_id: required("auth_client_id", auth_client_id)?,
            auth_client_secret: required("auth_client_secret", auth_client_secret)?,
            unique_client_id: non_empty(unique_client_id).map(str::to_owned),
        })
    }
}

// Manual impl keeps the secret out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("organization", &self.organization)
            .field("auth_client_id", &self.auth_client_id)
            .field("auth_client_secret", &"***")
            .field("unique_client_id", &self.unique_client_id)
            .finish()
    }
}

/// Which client package version to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionPin {
    Latest,
    Exact(String),
}

impl VersionPin {
    #[must_use]
    pub fn from_input(version: Option<&str>) -> Self {
        match non_empty(version) {
            Some(v) => Self::Exact(v.to_owned()),
            None => Self::Latest,
        }
    }
}

/// Target platform plus version pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSpec {
    pub platform: Platform,
    pub version: VersionPin,
}

impl InstallSpec {
    /// Resolve the install spec. An explicit platform identifier wins over
    /// host detection.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::UnsupportedPlatform`] when the identifier (or the
    /// host OS) is outside the supported set.
    pub fn resolve(platform: Option<&str>, version: Option<&str>) -> Result<Self, SetupError> {
        let platform = match non_empty(platform) {
            Some(id) => id.parse()?,
            None => Platform::current()?,
        };
        Ok(Self {
            platform,
            version: VersionPin::from_input(version),
        })
    }
}

/// Fully validated provisioning request.
#[derive(Debug, Clone)]
pub struct SetupPlan {
    pub install: InstallSpec,
    pub credentials: Credentials,
    pub install_root_certificate: bool,
    pub configure_docker_dns: bool,
    pub vnet: Option<String>,
}

impl SetupPlan {
    /// Combine the parts, rejecting combinations the platform cannot honour.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::DockerDnsUnsupported`] when Docker DNS is
    /// requested outside linux.
    pub fn new(
        install: InstallSpec,
        credentials: Credentials,
        install_root_certificate: bool,
        configure_docker_dns: bool,
        vnet: Option<&str>,
    ) -> Result<Self, SetupError> {
        if configure_docker_dns && install.platform != Platform::Linux {
            return Err(SetupError::DockerDnsUnsupported(install.platform));
        }
        Ok(Self {
            install,
            credentials,
            install_root_certificate,
            configure_docker_dns,
            vnet: non_empty(vnet).map(str::to_owned),
        })
    }
}

/// Parse a boolean input the way the host runtime does (YAML 1.2 core schema).
/// Absent or empty means `false`.
///
/// # Errors
///
/// Returns [`SetupError::InvalidBoolean`] for any other spelling.
pub fn parse_bool_input(name: &'static str, value: Option<&str>) -> Result<bool, SetupError> {
    match non_empty(value) {
        None => Ok(false),
        Some("true" | "True" | "TRUE") => Ok(true),
        Some("false" | "False" | "FALSE") => Ok(false),
        Some(other) => Err(SetupError::InvalidBoolean {
            name,
            value: other.to_owned(),
        }),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required(name: &'static str, value: Option<&str>) -> Result<String, SetupError> {
    non_empty(value)
        .map(str::to_owned)
        .ok_or(SetupError::MissingInput(name))
}
