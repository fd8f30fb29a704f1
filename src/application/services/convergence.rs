//! Convergence loop: wait for the eventually-consistent WARP daemon to
//! reach a desired state.
//!
//! Each attempt probes once. Between failed attempts the loop sleeps per the
//! [`BackoffPolicy`]; after `max_attempts` probes it gives up with
//! [`SetupError::VerificationTimeout`].

use crate::application::ports::{Delay, WarpClient};
use crate::application::services::probe::probe;
use crate::domain::backoff::{self, BackoffPolicy};
use crate::domain::{ClientState, DesiredState, SetupError};

/// What it took to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceReport {
    /// Number of probes issued, including the successful one.
    pub attempts: u32,
    /// Number of corrective `connect` commands issued.
    pub corrections: u32,
}

/// Probe until `desired` holds or the attempt budget runs out.
///
/// While waiting for [`DesiredState::Connected`], a probe that reads
/// [`ClientState::RegistrationMissing`] triggers one corrective `connect`
/// before the next probe. The daemon reports this right after registration
/// until it has loaded the new registration.
///
/// # Errors
///
/// Returns [`SetupError::VerificationTimeout`] naming `desired` when no probe
/// observed it.
pub async fn await_state(
    client: &impl WarpClient,
    delay: &impl Delay,
    policy: &BackoffPolicy,
    desired: DesiredState,
    organization: &str,
) -> Result<ConvergenceReport, SetupError> {
    let kind = desired.probe_kind();
    let mut corrections = 0;

    for attempt in 0..policy.max_attempts {
        let state = probe(client, kind, organization).await;
        tracing::debug!(attempt = attempt + 1, %desired, %state, "convergence probe");

        if desired.is_satisfied_by(state) {
            return Ok(ConvergenceReport {
                attempts: attempt + 1,
                corrections,
            });
        }

        if desired == DesiredState::Connected && state == ClientState::RegistrationMissing {
            corrections += 1;
            match client.connect().await {
                Ok(o) if !o.status.success() => {
                    tracing::debug!(code = ?o.status.code(), "corrective connect exited non-zero");
                }
                Err(e) => tracing::debug!(error = %e, "corrective connect could not run"),
                Ok(_) => {}
            }
        }

        if attempt + 1 < policy.max_attempts {
            let wait = policy.delay(attempt, backoff::entropy());
            tracing::debug!(delay_ms = wait.as_millis(), "backing off");
            delay.sleep(wait).await;
        }
    }

    Err(SetupError::VerificationTimeout {
        condition: desired,
        attempts: policy.max_attempts,
    })
}
