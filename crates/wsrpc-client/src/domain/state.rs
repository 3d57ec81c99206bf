//! Connection lifecycle states and transport events.
//!
//! ```text
//! CONNECTING ──Opened──▶ OPEN ──Closed──▶ CLOSED
//!      │                  │
//!      └────Errored───────┴───Errored───▶ ERRORED
//! ```
//!
//! `CLOSED` and `ERRORED` are terminal: there is no reconnection.

use std::fmt;

/// Lifecycle state of the single connection owned by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial state; the transport has not reported `Opened` yet.
    Connecting,
    /// Hello sent, keepalive running, messages dispatched.
    Open,
    /// Closed by either side.  Terminal.
    Closed,
    /// The transport reported an error.  Terminal.
    Errored,
}

impl ConnectionState {
    /// `true` for `Closed` and `Errored`.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Errored)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Open => "OPEN",
            ConnectionState::Closed => "CLOSED",
            ConnectionState::Errored => "ERRORED",
        };
        f.write_str(name)
    }
}

/// Events reported by the transport, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The socket is connected and writable.
    Opened,
    /// A text frame arrived.
    Message(String),
    /// The socket was closed.
    Closed,
    /// The socket failed; the string describes why.
    Errored(String),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
