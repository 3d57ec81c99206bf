//! # wsrpc-core
//!
//! Shared protocol definitions for the websocket RPC client: wire constants,
//! the typed envelope model, and the text-frame codec.
//!
//! This crate has zero dependencies on sockets, async runtimes, or UI code.
//! It only knows how a text frame is classified and how envelopes map to and
//! from JSON.
//!
//! # Protocol overview
//!
//! The peer and the client share a single duplex text channel.  Three kinds
//! of frames travel over it:
//!
//! - **Liveness sentinel**: the literal `"ping-pong"`.  The client sends it
//!   periodically; the peer echoes it back.  It is never parsed as JSON.
//! - **Hello**: the literal `"myws,connected!"`, sent once by the client right
//!   after the connection opens.
//! - **Envelopes**: JSON objects discriminated by their `"typ"` field
//!   (`call`, `notify`, and `result` on the way back).
//!
//! ```text
//! peer → client   {"typ":"call","action":"eval","id":"42","data":"1+1"}
//! client → peer   {"id":"42","typ":"result","data":2}
//! peer → client   {"typ":"notify","action":"show","data":"1 + 1 = 2"}
//! ```

pub mod protocol;

pub use protocol::codec::{classify, decode_envelope, encode_result, CodecError, Frame};
pub use protocol::messages::{
    CallAction, CallId, CallRequest, CallResult, InboundMessage, Notification, NotifyAction,
    HELLO_MESSAGE, LIVENESS_SENTINEL,
};
