//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`; never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod convergence;
pub mod probe;
pub mod provision;
pub mod teardown;

use std::process::Output;

use anyhow::Result;

use crate::domain::SetupError;

/// Turn a non-zero exit into [`SetupError::CommandFailed`].
///
/// # Errors
///
/// Returns `CommandFailed` naming `command` when `output` did not succeed.
pub fn check_output(output: Output, command: &str) -> Result<Output> {
    if output.status.success() {
        return Ok(output);
    }
    Err(SetupError::CommandFailed {
        command: command.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
    .into())
}
