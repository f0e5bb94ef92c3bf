//! Session lifecycle state.

/// Where a session is in its connect → authenticate → ready lifecycle.
///
/// ```text
/// Disconnected ──connect──→ Connecting ──open──→ AwaitingAuthRequirement
///      ↑                                              │
///      │                              required        │  not required
///      │                        ┌─── Authenticating ←─┤
///      │                failed  │         │ ok        │
///      │                        └────←────┤           │
///      └──────── close/error ──────────── Ready ←─────┘
/// ```
///
/// `Closed` is terminal: the application shut the session down on
/// purpose, as opposed to losing the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No live connection.
    Disconnected,
    /// The transport dial is in flight.
    Connecting,
    /// Connected; the auth-requirement query has not resolved yet, or a
    /// failed attempt is waiting on fresh challenge material.
    AwaitingAuthRequirement,
    /// An authentication attempt is in flight.
    Authenticating,
    /// Connected and (if required) authenticated; requests may flow.
    Ready,
    /// Deliberately shut down.
    Closed,
}

impl SessionState {
    /// `true` while a live connection exists, whatever the auth phase.
    pub fn is_connected(self) -> bool {
        matches!(
            self,
            SessionState::AwaitingAuthRequirement
                | SessionState::Authenticating
                | SessionState::Ready
        )
    }
}
