//! State prober: one read-only `warp-cli` query, classified.

use crate::application::ports::ClientInspector;
use crate::domain::client_state::{self, ClientState, ProbeKind};

/// Issue the query for `kind` and classify its stdout.
///
/// A query that cannot be run or exits non-zero reads as
/// [`ClientState::Unknown`]; the convergence loop simply tries again.
pub async fn probe(client: &impl ClientInspector, kind: ProbeKind, organization: &str) -> ClientState {
    let result = match kind {
        ProbeKind::Settings => client.settings().await,
        ProbeKind::Status => client.status().await,
    };
    let output = match result {
        Ok(o) if o.status.success() => o,
        Ok(o) => {
            tracing::debug!(?kind, code = ?o.status.code(), "probe exited non-zero");
            return ClientState::Unknown;
        }
        Err(e) => {
            tracing::debug!(?kind, error = %e, "probe could not run");
            return ClientState::Unknown;
        }
    };
    let text = String::from_utf8_lossy(&output.stdout);
    client_state::classify(kind, &text, organization)
}

/// Registration and connection state observed at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub registration: ClientState,
    pub connection: ClientState,
}

/// Probe both settings and status once.
pub async fn snapshot(client: &impl ClientInspector, organization: &str) -> StatusSnapshot {
    StatusSnapshot {
        registration: probe(client, ProbeKind::Settings, organization).await,
        connection: probe(client, ProbeKind::Status, organization).await,
    }
}
