//! Transport adapters.
//!
//! - [`ws`] – the production WebSocket transport.
//! - [`recording`] – records sent frames in memory; used by tests and by
//!   anyone embedding the connection without a socket.

pub mod recording;
pub mod ws;

pub use recording::{RecordingTransport, SentFrame};
pub use ws::{spawn_ws_io, WsTransport};
