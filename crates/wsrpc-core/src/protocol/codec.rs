//! Text-frame codec.
//!
//! Every frame received from the peer is classified exactly once:
//!
//! ```text
//! "ping-pong"        → Frame::Liveness          (never reaches the JSON parser)
//! valid envelope     → Frame::Envelope(msg)
//! anything else      → Frame::Malformed(err)    (logged by the caller, non-fatal)
//! ```

use thiserror::Error;

use crate::protocol::messages::{CallResult, InboundMessage, LIVENESS_SENTINEL};

/// Errors that can occur while decoding or encoding envelopes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is not the sentinel and not a valid envelope.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    /// An outgoing envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Classification of one inbound text frame.
#[derive(Debug)]
pub enum Frame {
    /// The liveness sentinel (probe or echo).  Needs no further processing.
    Liveness,
    /// A structurally invalid frame.
    Malformed(CodecError),
    /// A decoded envelope, ready for dispatch.
    Envelope(InboundMessage),
}

/// Returns `true` when `raw` is exactly the liveness sentinel.
pub fn is_liveness(raw: &str) -> bool {
    raw == LIVENESS_SENTINEL
}

/// Classifies a raw text frame.
///
/// The sentinel check happens first, so the JSON parser is never invoked on
/// a liveness frame.
///
/// # Examples
///
/// ```rust
/// use wsrpc_core::{classify, Frame};
///
/// assert!(matches!(classify("ping-pong"), Frame::Liveness));
/// assert!(matches!(classify("{not json"), Frame::Malformed(_)));
/// ```
pub fn classify(raw: &str) -> Frame {
    if is_liveness(raw) {
        return Frame::Liveness;
    }
    match decode_envelope(raw) {
        Ok(msg) => Frame::Envelope(msg),
        Err(e) => Frame::Malformed(e),
    }
}

/// Parses a structured envelope.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if `raw` is not a JSON object with a
/// string `"typ"` field.
pub fn decode_envelope(raw: &str) -> Result<InboundMessage, CodecError> {
    serde_json::from_str(raw).map_err(CodecError::Malformed)
}

/// Serializes a call result to its wire form.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use wsrpc_core::{encode_result, CallId, CallResult};
///
/// let result = CallResult::new(Some(CallId::from("42")), serde_json::json!(2));
/// assert_eq!(encode_result(&result).unwrap(), r#"{"id":"42","typ":"result","data":2}"#);
/// ```
pub fn encode_result(result: &CallResult) -> Result<String, CodecError> {
    serde_json::to_string(result).map_err(CodecError::Encode)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
