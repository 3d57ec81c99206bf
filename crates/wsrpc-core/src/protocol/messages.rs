//! Envelope types and wire constants.
//!
//! Inbound envelopes are modelled as a tagged union keyed by the `"typ"` field
//! so that dispatch is an exhaustive `match` instead of ad hoc field checks.
//! Both `typ` and `action` are open enumerations on the wire: values this
//! client does not know map to an `Unrecognized` / `Unknown` variant rather
//! than a parse error.
//!
//! # Serde representation
//!
//! ```json
//! {"typ":"call","action":"eval","id":"42","data":"1+1"}
//! {"typ":"notify","action":"show","data":"hello"}
//! {"id":"42","typ":"result","data":2}
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Wire constants ────────────────────────────────────────────────────────────

/// Out-of-band liveness probe.  Sent by the client and echoed by the peer.
pub const LIVENESS_SENTINEL: &str = "ping-pong";

/// Sent exactly once, immediately after the connection opens.
pub const HELLO_MESSAGE: &str = "myws,connected!";

/// Path the peer serves the websocket endpoint on.
pub const DEFAULT_ENDPOINT_PATH: &str = "/_myws/_conn/";

/// Port the peer listens on by default.
pub const DEFAULT_PORT: u16 = 17680;

/// Default keepalive period in milliseconds.
pub const DEFAULT_KEEPALIVE_MS: u64 = 2000;

// ── Correlation id ────────────────────────────────────────────────────────────

/// Correlation identifier of a call.
///
/// The client never interprets the id; it only copies it into the result.
/// Peers are free to use strings (`"42"`) or numbers (`42`), so the raw JSON
/// value is kept and echoed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub Value);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

impl From<&str> for CallId {
    fn from(id: &str) -> Self {
        Self(Value::String(id.to_string()))
    }
}

impl From<u64> for CallId {
    fn from(id: u64) -> Self {
        Self(Value::from(id))
    }
}

// ── Peer → client ─────────────────────────────────────────────────────────────

/// A decoded structured message received from the peer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "typ")]
pub enum InboundMessage {
    /// The peer asks the client to evaluate something and reply.
    #[serde(rename = "call")]
    Call(CallRequest),

    /// The peer pushes a one-way update.
    #[serde(rename = "notify")]
    Notify(Notification),

    /// Any other `typ` value, including `"result"`.  Ignored by dispatch.
    #[serde(other)]
    Unrecognized,
}

impl InboundMessage {
    /// Short kind name for log lines; never includes payload data.
    pub fn kind_name(&self) -> &'static str {
        match self {
            InboundMessage::Call(_) => "call",
            InboundMessage::Notify(_) => "notify",
            InboundMessage::Unrecognized => "unrecognized",
        }
    }
}

/// Remote-invocation request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallRequest {
    /// Echoed back in the [`CallResult`].  `None` only when the key is
    /// absent; an explicit `null` is kept as `Some(CallId(Value::Null))`.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<CallId>,
    #[serde(default)]
    pub action: CallAction,
    /// For `eval`, the expression string.
    #[serde(default)]
    pub data: Value,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<CallId>, D::Error>
where
    D: Deserializer<'de>,
{
    CallId::deserialize(deserializer).map(Some)
}

/// Operations a call may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallAction {
    /// Evaluate `data` as an expression.
    Eval,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One-way notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub action: NotifyAction,
    /// For `show`, the content to append to the display log.
    #[serde(default)]
    pub data: Value,
}

/// Operations a notification may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyAction {
    /// Append `data` to the display log.
    Show,
    #[default]
    #[serde(other)]
    Unknown,
}

// ── Client → peer ─────────────────────────────────────────────────────────────

/// Discriminant of a [`CallResult`].  Always serializes as `"result"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    #[default]
    Result,
}

/// Response to a [`CallRequest`].
///
/// Field order matters: the wire form is `{"id":…,"typ":"result","data":…}`.
/// `id` is left out entirely when the request carried none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CallId>,
    pub typ: ResultKind,
    pub data: Value,
}

impl CallResult {
    /// Builds the result for the call identified by `id`.
    pub fn new(id: Option<CallId>, data: Value) -> Self {
        Self {
            id,
            typ: ResultKind::Result,
            data,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
