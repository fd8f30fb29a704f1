//! Supported runner platforms.
//!
//! Identifiers follow the host runtime's naming (`linux`, `darwin`, `win32`).

use std::fmt;
use std::str::FromStr;

use crate::domain::error::SetupError;

/// Closed set of platforms the action can provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Darwin,
    Win32,
}

impl Platform {
    /// Resolve the platform of the running host.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::UnsupportedPlatform`] on any other OS.
    pub fn current() -> Result<Self, SetupError> {
        Self::from_target_os(std::env::consts::OS)
    }

    /// Map a Rust target OS name (`std::env::consts::OS`) to a platform.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::UnsupportedPlatform`] for anything but
    /// `linux`, `macos` and `windows`.
    pub fn from_target_os(os: &str) -> Result<Self, SetupError> {
        match os {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Darwin),
            "windows" => Ok(Self::Win32),
            other => Err(SetupError::UnsupportedPlatform(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Win32 => "win32",
        }
    }
}

impl FromStr for Platform {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(Self::Linux),
            "darwin" => Ok(Self::Darwin),
            "win32" => Ok(Self::Win32),
            other => Err(SetupError::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
