//! Client configuration types.
//!
//! [`ClientConfig`] is the single source of truth for runtime settings.  The
//! binary builds it from defaults, an optional TOML file, and CLI flags (see
//! `infrastructure::config_file` and `main.rs`); tests build it directly.

use std::time::Duration;

use wsrpc_core::protocol::messages::{DEFAULT_ENDPOINT_PATH, DEFAULT_KEEPALIVE_MS, DEFAULT_PORT};

/// All runtime configuration for the client endpoint.
///
/// # Example
///
/// ```rust
/// use wsrpc_client::domain::ClientConfig;
///
/// let cfg = ClientConfig::default();
/// assert_eq!(cfg.url, "ws://localhost:17680/_myws/_conn/");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// WebSocket URL of the peer endpoint.
    pub url: String,

    /// Period between two liveness sentinels while the connection is open.
    pub keepalive_interval: Duration,
}

/// URL the peer serves by default.
pub fn default_url() -> String {
    format!("ws://localhost:{DEFAULT_PORT}{DEFAULT_ENDPOINT_PATH}")
}

impl Default for ClientConfig {
    /// | Field              | Default                              |
    /// |--------------------|--------------------------------------|
    /// | url                | `ws://localhost:17680/_myws/_conn/`  |
    /// | keepalive_interval | 2000 ms                              |
    fn default() -> Self {
        Self {
            url: default_url(),
            keepalive_interval: Duration::from_millis(DEFAULT_KEEPALIVE_MS),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
