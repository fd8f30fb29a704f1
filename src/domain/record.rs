//! The provisioning record shared between the main and post phases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether this run established a WARP connection that teardown must undo.
///
/// Written once after the connection is verified, read once when cleanup
/// starts. Never cleared: its scope ends with the pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningRecord {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
}

impl ProvisioningRecord {
    /// Record stamped at the moment the connection was verified.
    #[must_use]
    pub fn connected_now() -> Self {
        Self {
            connected: true,
            connected_at: Some(Utc::now()),
        }
    }
}

/// Which half of the action this invocation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// First invocation: provision.
    Main,
    /// Invocation after the job's steps: tear down.
    Post,
}
