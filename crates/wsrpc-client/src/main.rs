//! wsrpc-client: entry point.
//!
//! Connects to a websocket RPC peer, answers its `eval` calls and prints its
//! `show` notifications to stdout, one per line.
//!
//! # Usage
//!
//! ```text
//! wsrpc-client [OPTIONS]
//!
//! Options:
//!   --url <URL>             Peer endpoint [default: ws://localhost:17680/_myws/_conn/]
//!   --keepalive-ms <MS>     Liveness sentinel period in milliseconds [default: 2000]
//!   --config <PATH>         Optional TOML configuration file
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable             | Flag             |
//! |----------------------|------------------|
//! | `WSRPC_URL`          | `--url`          |
//! | `WSRPC_KEEPALIVE_MS` | `--keepalive-ms` |
//! | `WSRPC_CONFIG`       | `--config`       |
//!
//! Flags (or their variables) override the config file, which overrides the
//! built-in defaults.  Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::http::Uri;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wsrpc_client::domain::{ClientConfig, ConnectionState};
use wsrpc_client::infrastructure::config_file::{load_config, FileConfig};
use wsrpc_client::infrastructure::display::LineWriterDisplay;
use wsrpc_client::infrastructure::evaluator::ArithmeticEvaluator;
use wsrpc_client::infrastructure::run_client;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Client endpoint for the websocket RPC protocol.
#[derive(Debug, Parser)]
#[command(
    name = "wsrpc-client",
    about = "Client endpoint for the websocket RPC protocol",
    version
)]
struct Cli {
    /// WebSocket URL of the peer endpoint.
    ///
    /// Only plain `ws://` URLs are accepted.
    #[arg(long, env = "WSRPC_URL")]
    url: Option<String>,

    /// Period between liveness sentinels, in milliseconds.  Must be non-zero.
    #[arg(long, env = "WSRPC_KEEPALIVE_MS")]
    keepalive_ms: Option<u64>,

    /// Path to a TOML configuration file.
    #[arg(long, env = "WSRPC_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Merges defaults, the optional config file and the flags into a
    /// validated [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded, the URL is not a
    /// `ws://` URL, or the keepalive period is zero.
    fn into_client_config(self) -> anyhow::Result<ClientConfig> {
        let file = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => FileConfig::default(),
        };

        let url = self.url.unwrap_or(file.url);
        let keepalive_ms = self.keepalive_ms.unwrap_or(file.keepalive_interval_ms);

        let uri: Uri = url
            .parse()
            .with_context(|| format!("invalid peer URL: '{url}'"))?;
        match uri.scheme_str() {
            Some("ws") => {}
            Some(other) => bail!("unsupported URL scheme '{other}' in '{url}' (expected ws)"),
            None => bail!("peer URL '{url}' has no scheme (expected ws://)"),
        }
        if uri.host().is_none() {
            bail!("peer URL '{url}' has no host");
        }
        if keepalive_ms == 0 {
            bail!("keepalive period must be greater than zero");
        }

        Ok(ClientConfig {
            url,
            keepalive_interval: Duration::from_millis(keepalive_ms),
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_client_config()?;

    info!("wsrpc-client starting, peer={}", config.url);

    // ── Graceful shutdown ─────────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, closing connection");
                let _ = shutdown_tx.send(true);
            }
            // Dropping the sender only disarms the shutdown branch of the loop.
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    let display = Arc::new(LineWriterDisplay::new(std::io::stdout()));
    let state = run_client(&config, Arc::new(ArithmeticEvaluator), display, shutdown_rx).await?;

    if state == ConnectionState::Errored {
        bail!("connection to {} ended with an error", config.url);
    }

    info!("wsrpc-client stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
