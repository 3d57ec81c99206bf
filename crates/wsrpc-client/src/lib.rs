//! wsrpc-client library crate.
//!
//! The client endpoint of the websocket RPC protocol: it connects to a peer,
//! announces itself, keeps the connection alive with a liveness sentinel,
//! evaluates `eval` calls and returns correlated results, and appends `show`
//! notifications to a display surface.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Peer (JSON text frames over WebSocket)
//!         ↕
//! [wsrpc-client]
//!   ├── domain/           Pure types: ClientConfig, ConnectionState, arithmetic language
//!   ├── application/      Connection state machine, keepalive, dispatch, ports
//!   └── infrastructure/
//!         ├── transport/  WebSocket I/O pump (tokio-tungstenite), recording transport
//!         ├── display     Display log and line writer
//!         ├── evaluator   Arithmetic evaluator
//!         └── config_file TOML configuration
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `wsrpc-core`, and talks to the
//!   outside world only through the `Transport`, `Evaluator` and
//!   `DisplaySurface` traits.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tokio-tungstenite`.

/// Domain layer: pure types (no I/O).
pub mod domain;

/// Application layer: connection lifecycle and message handling.
pub mod application;

/// Infrastructure layer: WebSocket transport, display, evaluator, config file.
pub mod infrastructure;
