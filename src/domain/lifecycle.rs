//! Provisioning lifecycle stages and the transition rules between them.

use std::fmt;

use anyhow::Result;

/// One stage of a provisioning run or its teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Installing,
    Configuring,
    /// Waiting for the daemon to pick up the MDM registration.
    Registering,
    /// Waiting for the tunnel to come up.
    Connecting,
    Connected,
    Disconnecting,
    Unregistering,
    Cleaned,
}

impl Stage {
    /// The single stage that may follow this one in a full run.
    #[must_use]
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Installing),
            Self::Installing => Some(Self::Configuring),
            Self::Configuring => Some(Self::Registering),
            Self::Registering => Some(Self::Connecting),
            Self::Connecting => Some(Self::Connected),
            Self::Connected => Some(Self::Disconnecting),
            Self::Disconnecting => Some(Self::Unregistering),
            Self::Unregistering => Some(Self::Cleaned),
            Self::Cleaned => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Installing => "installing",
            Self::Configuring => "configuring",
            Self::Registering => "registering",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Unregistering => "unregistering",
            Self::Cleaned => "cleaned",
        })
    }
}

/// Tracks the current stage and rejects out-of-order transitions.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    stage: Stage,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self { stage: Stage::Idle }
    }
}

impl Lifecycle {
    /// Teardown runs in a later process; it resumes after the build work.
    #[must_use]
    pub fn for_teardown() -> Self {
        Self {
            stage: Stage::Connected,
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Move to `next`. Only the successor is allowed, except that teardown
    /// may jump straight to `Cleaned` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns an error on any other transition.
    pub fn advance(&mut self, next: Stage) -> Result<()> {
        let skip_to_cleaned = next == Stage::Cleaned
            && matches!(
                self.stage,
                Stage::Connected | Stage::Disconnecting | Stage::Unregistering
            );
        if self.stage.successor() != Some(next) && !skip_to_cleaned {
            anyhow::bail!("invalid lifecycle transition {} -> {next}", self.stage);
        }
        tracing::info!(from = %self.stage, to = %next, "lifecycle transition");
        self.stage = next;
        Ok(())
    }
}
