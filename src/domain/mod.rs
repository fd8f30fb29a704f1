//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod backoff;
pub mod client_state;
pub mod docker;
pub mod error;
pub mod inputs;
pub mod lifecycle;
pub mod mdm;
pub mod platform;
pub mod record;

pub use backoff::{BackoffPolicy, Jitter};
pub use client_state::{ClientState, DesiredState, ProbeKind};
pub use error::SetupError;
pub use inputs::{Credentials, InstallSpec, SetupPlan, VersionPin};
pub use lifecycle::{Lifecycle, Stage};
pub use platform::Platform;
pub use record::{Phase, ProvisioningRecord};
