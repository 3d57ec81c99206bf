//! Infrastructure layer for wsrpc-client.
//!
//! Implements the application ports against real I/O:
//!
//! - **`transport`** – the tokio-tungstenite WebSocket pump and `WsTransport`,
//!   plus `RecordingTransport`, which keeps every sent frame in memory.
//! - **`display`** – display surfaces: the in-memory `DisplayLog` and a
//!   line-oriented writer (stdout in the binary).
//! - **`evaluator`** – `ArithmeticEvaluator`, the default `Evaluator`.
//! - **`config_file`** – optional TOML configuration file.
//! - **`ws_client`** – wires everything together for one connection.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `wsrpc_core`, but MUST NOT be imported by the `application` or domain
//! layers outside of tests.

pub mod config_file;
pub mod display;
pub mod evaluator;
pub mod transport;
pub mod ws_client;

pub use ws_client::run_client;
