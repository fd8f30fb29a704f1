//! Classification of `warp-cli` text output into client states.
//!
//! `warp-cli` only offers human-readable output, so classification is plain
//! marker matching. Marker wording is a compatibility risk: a client release
//! that rephrases these lines will make every probe read as not-converged.

use std::fmt;

/// Marker printed by `warp-cli status` once the tunnel is up.
pub const CONNECTED_MARKER: &str = "Status update: Connected";
/// Marker printed by `warp-cli status` while the tunnel is coming up.
pub const CONNECTING_MARKER: &str = "Status update: Connecting";
/// Marker printed by `warp-cli status` right after registration, before the
/// daemon has picked the registration up.
pub const REGISTRATION_MISSING_MARKER: &str = "Reason: Registration Missing";
/// Prefix of the organization line in `warp-cli settings`.
///
/// Deliberately stricter than a plain substring match: [`is_registered`]
/// also requires whitespace or end of text after the name, so a runner
/// enrolled in `acme-staging` is not taken as registered to `acme`.
pub const ORGANIZATION_PREFIX: &str = "Organization: ";

/// Semantic state derived from a single probe. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Unregistered,
    Registered,
    Connecting,
    Connected,
    RegistrationMissing,
    Unknown,
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unregistered => "unregistered",
            Self::Registered => "registered",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::RegistrationMissing => "registration missing",
            Self::Unknown => "unknown",
        })
    }
}

/// Which read-only `warp-cli` query a probe issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// `warp-cli settings`: answers "registered for which organization?".
    Settings,
    /// `warp-cli status`: answers "is the tunnel up?".
    Status,
}

/// Target condition for the convergence loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    Registered,
    Connected,
    Unregistered,
}

impl DesiredState {
    #[must_use]
    pub fn probe_kind(self) -> ProbeKind {
        match self {
            Self::Registered | Self::Unregistered => ProbeKind::Settings,
            Self::Connected => ProbeKind::Status,
        }
    }

    #[must_use]
    pub fn is_satisfied_by(self, state: ClientState) -> bool {
        matches!(
            (self, state),
            (Self::Registered, ClientState::Registered)
                | (Self::Connected, ClientState::Connected)
                | (Self::Unregistered, ClientState::Unregistered)
        )
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Registered => "registered",
            Self::Connected => "connected",
            Self::Unregistered => "unregistered",
        })
    }
}

/// Whether the output names `organization` on an `Organization:` line.
///
/// Case-sensitive. The organization must end at a line or word boundary,
/// so `acme` does not match `Organization: acme-staging`.
#[must_use]
pub fn is_registered(output: &str, organization: &str) -> bool {
    let needle = format!("{ORGANIZATION_PREFIX}{organization}");
    output.match_indices(&needle).any(|(idx, _)| {
        output[idx + needle.len()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace)
    })
}

#[must_use]
pub fn is_connected(output: &str) -> bool {
    output.contains(CONNECTED_MARKER)
}

#[must_use]
pub fn is_registration_missing(output: &str) -> bool {
    output.contains(REGISTRATION_MISSING_MARKER)
}

/// Classify the text returned by a probe of the given kind.
#[must_use]
pub fn classify(kind: ProbeKind, output: &str, organization: &str) -> ClientState {
    match kind {
        ProbeKind::Settings => {
            if is_registered(output, organization) {
                ClientState::Registered
            } else {
                ClientState::Unregistered
            }
        }
        ProbeKind::Status => {
            if is_registration_missing(output) {
                ClientState::RegistrationMissing
            } else if is_connected(output) {
                ClientState::Connected
            } else if output.contains(CONNECTING_MARKER) {
                ClientState::Connecting
            } else {
                ClientState::Unknown
            }
        }
    }
}
