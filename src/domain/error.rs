//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::client_state::DesiredState;
use crate::domain::platform::Platform;

/// Errors raised while provisioning or tearing down the WARP client.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(
        "Unsupported platform '{0}'. Supported platforms: linux, darwin, win32. \
         Pull requests for other platforms are welcome."
    )]
    UnsupportedPlatform(String),

    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error(
        "Input '{name}' does not meet YAML 1.2 \"Core Schema\" specification: {value}\n\n\
         Support boolean input list: `true | True | TRUE | false | False | FALSE`"
    )]
    InvalidBoolean { name: &'static str, value: String },

    #[error("WARP client never became {condition} after {attempts} attempts")]
    VerificationTimeout {
        condition: DesiredState,
        attempts: u32,
    },

    #[error("`{command}` failed with exit code {}{}", code.map_or_else(|| "signal".to_string(), |c| c.to_string()), stderr_suffix(stderr))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Docker DNS configuration is only supported on linux, not {0}")]
    DockerDnsUnsupported(Platform),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
