//! WebSocket transport over tokio-tungstenite.
//!
//! [`spawn_ws_io`] starts the I/O pump for one connection and returns the
//! [`WsTransport`] handle used to send.  The pump:
//!
//! 1. Connects with `connect_async`.  A failure is reported as
//!    `TransportEvent::Errored` and the pump ends.
//! 2. Reports `TransportEvent::Opened`.
//! 3. Splits the socket.  A writer task drains the outbound channel into the
//!    sink; the reader loop forwards every text frame as
//!    `TransportEvent::Message`.
//! 4. Reports exactly one terminal event when the socket ends, then stops:
//!    `Closed` for a close frame, end of stream or a reset without closing
//!    handshake; `Errored` for any other read failure, including peer
//!    protocol violations.
//!
//! WebSocket-level ping/pong frames are answered by tungstenite itself and are
//! unrelated to the protocol's liveness sentinel.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{error::ProtocolError, Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};

use crate::application::{Transport, TransportError};
use crate::domain::TransportEvent;

/// Capacity of the outbound frame queue.
const OUTBOUND_CAPACITY: usize = 64;

/// Sending half of a WebSocket connection.
///
/// Frames are queued to the writer task in order.  Dropping the handle closes
/// the queue, which makes the writer close the socket.
#[derive(Debug, Clone)]
pub struct WsTransport {
    outbound: mpsc::Sender<WsMessage>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.outbound
            .send(WsMessage::Text(text))
            .await
            .map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.outbound
            .send(WsMessage::Close(None))
            .await
            .map_err(|_| TransportError::Closed)
    }
}

/// Connects to `url` in a background task and returns the send handle.
///
/// Lifecycle events for the connection are delivered on `events` in the order
/// they happen.  Must be called from within a Tokio runtime.
pub fn spawn_ws_io(url: String, events: mpsc::Sender<TransportEvent>) -> WsTransport {
    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
    tokio::spawn(run_ws_io(url, events, outbound_rx));
    WsTransport {
        outbound: outbound_tx,
    }
}

async fn run_ws_io(
    url: String,
    events: mpsc::Sender<TransportEvent>,
    mut outbound: mpsc::Receiver<WsMessage>,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            error!("failed to connect to {url}: {e}");
            let _ = events.send(TransportEvent::Errored(e.to_string())).await;
            return;
        }
    };

    info!("connected to {url}");
    if events.send(TransportEvent::Opened).await.is_err() {
        debug!("connection dropped before open was delivered");
        return;
    }

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    // ── Writer ────────────────────────────────────────────────────────────────
    tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let is_close = matches!(message, WsMessage::Close(_));
            if let Err(e) = ws_tx.send(message).await {
                debug!("websocket send failed: {e}");
                break;
            }
            if is_close {
                break;
            }
        }
        // Queue closed or close frame written: make sure the peer sees a close.
        let _ = ws_tx.close().await;
    });

    // ── Reader ────────────────────────────────────────────────────────────────
    let terminal = loop {
        let message = match ws_rx.next().await {
            Some(Ok(message)) => message,
            Some(Err(
                WsError::ConnectionClosed
                | WsError::AlreadyClosed
                | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake),
            )) => {
                debug!("websocket closed");
                break TransportEvent::Closed;
            }
            Some(Err(e)) => {
                warn!("websocket read error: {e}");
                break TransportEvent::Errored(e.to_string());
            }
            None => {
                debug!("websocket stream ended");
                break TransportEvent::Closed;
            }
        };

        match message {
            WsMessage::Text(text) => {
                debug!(len = text.len(), "text frame received");
                if events.send(TransportEvent::Message(text)).await.is_err() {
                    // Nobody is listening anymore; the connection is done.
                    return;
                }
            }
            WsMessage::Binary(data) => {
                warn!("unexpected binary frame ({} bytes, ignored)", data.len());
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) => {
                debug!("websocket control frame received");
            }
            WsMessage::Close(frame) => {
                debug!(?frame, "close frame received");
                break TransportEvent::Closed;
            }
            WsMessage::Frame(_) => {
                debug!("raw frame (ignored)");
            }
        }
    };

    let _ = events.send(terminal).await;
}
