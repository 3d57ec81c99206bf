//! Top-level runner: one WebSocket connection from connect to terminal state.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tracing::info;

use crate::application::{Connection, DisplaySurface, Dispatcher, Evaluator};
use crate::domain::{ClientConfig, ConnectionState};
use crate::infrastructure::transport::spawn_ws_io;

/// Capacity of the transport event queue.
const EVENT_CAPACITY: usize = 128;

/// Connects to `config.url` and runs the connection until it closes, errors,
/// or `shutdown` is set to `true`.
///
/// A connect failure is not an `Err`: the connection goes from CONNECTING to
/// ERRORED and that state is returned.
///
/// # Errors
///
/// Returns an error if `config.url` is not a valid WebSocket request URL.
pub async fn run_client(
    config: &ClientConfig,
    evaluator: Arc<dyn Evaluator>,
    display: Arc<dyn DisplaySurface>,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<ConnectionState> {
    config
        .url
        .as_str()
        .into_client_request()
        .with_context(|| format!("invalid websocket url {}", config.url))?;

    info!(
        "connecting to {} (keepalive every {} ms)",
        config.url,
        config.keepalive_interval.as_millis()
    );

    let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
    let transport = spawn_ws_io(config.url.clone(), events_tx);
    let dispatcher = Dispatcher::new(evaluator, display);
    let mut connection = Connection::new(transport, dispatcher, config.keepalive_interval);

    let state = connection.run(events_rx, shutdown).await;
    info!("connection finished in state {state}");
    Ok(state)
}
