//! Connection lifecycle state surfaced alongside every published snapshot.

use time::OffsetDateTime;

/// Phase of the push-connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// A connection attempt is in flight.
    Connecting,
    /// The stream is established and delivering events.
    Open,
    /// No live connection. Check [`ConnectionState::exhausted`] to tell a
    /// pending automatic retry from a terminal stop.
    Closed,
}

/// Connection, error, and staleness metadata published with each store value.
///
/// Transitions are driven solely by connection lifecycle events; stream-level
/// errors are represented here as state, never thrown across the store
/// boundary, so uninvolved consumers keep rendering last-known data.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionState {
    pub phase: ConnectionPhase,
    /// Most recent transport error, cleared on a successful open.
    pub last_error: Option<String>,
    /// Reconnect attempts consumed since the last successful open.
    pub attempt_count: u32,
    /// The retry ceiling was reached; no automatic reconnect will fire until
    /// an explicit `reconnect()`.
    pub exhausted: bool,
    /// When the latest snapshot was applied, from the event timestamp when
    /// available, otherwise client arrival time.
    pub last_snapshot_time: Option<OffsetDateTime>,
}

impl ConnectionState {
    /// State before the session has started any connection attempt.
    pub(crate) fn idle() -> Self {
        Self {
            phase: ConnectionPhase::Closed,
            last_error: None,
            attempt_count: 0,
            exhausted: false,
            last_snapshot_time: None,
        }
    }

    /// Returns `true` while the stream is established.
    pub fn is_connected(&self) -> bool {
        self.phase == ConnectionPhase::Open
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::idle()
    }
}
