//! Connection lifecycle controller.
//!
//! [`Connection`] is the single owner of everything per-connection: the
//! lifecycle state, the transport handle, the keepalive timer and the
//! dispatcher.  It is driven by [`TransportEvent`]s and by keepalive ticks,
//! one at a time, from [`Connection::run`].
//!
//! # Lifecycle
//!
//! | Event             | From         | To        | Side effects                     |
//! |-------------------|--------------|-----------|----------------------------------|
//! | `Opened`          | CONNECTING   | OPEN      | send hello, start keepalive      |
//! | `Message(text)`   | OPEN         | OPEN      | classify, dispatch, maybe reply  |
//! | `Closed`          | non-terminal | CLOSED    | stop keepalive                   |
//! | `Errored(reason)` | non-terminal | ERRORED   | stop keepalive                   |
//!
//! Events arriving after a terminal state are ignored.  A text frame arriving
//! outside OPEN cannot happen with a well-behaved transport; it is logged and
//! dropped.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use wsrpc_core::{classify, encode_result, CallResult, Frame, HELLO_MESSAGE, LIVENESS_SENTINEL};

use crate::application::dispatcher::{DispatchOutcome, Dispatcher};
use crate::application::keepalive::KeepaliveScheduler;
use crate::domain::{ConnectionState, TransportEvent};

/// Errors reported by a [`Transport`] when sending.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying socket is gone.
    #[error("transport is closed")]
    Closed,

    /// The frame could not be written.
    #[error("send failed: {0}")]
    Send(String),
}

/// Send capability of the underlying socket.
///
/// Receiving is not part of this trait: inbound traffic arrives as
/// [`TransportEvent`]s on the channel passed to [`Connection::run`].
#[async_trait]
pub trait Transport: Send {
    /// Sends one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Starts a graceful close of the socket.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// The client's single connection.
pub struct Connection<T: Transport> {
    state: ConnectionState,
    transport: T,
    keepalive: KeepaliveScheduler,
    dispatcher: Dispatcher,
}

impl<T: Transport> Connection<T> {
    /// Creates a connection in the CONNECTING state.
    pub fn new(transport: T, dispatcher: Dispatcher, keepalive_interval: Duration) -> Self {
        Self {
            state: ConnectionState::Connecting,
            transport,
            keepalive: KeepaliveScheduler::new(keepalive_interval),
            dispatcher,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// `true` while the keepalive timer exists (only ever in OPEN).
    pub fn keepalive_active(&self) -> bool {
        self.keepalive.is_active()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Applies one transport event to the state machine.
    pub async fn handle_event(&mut self, event: TransportEvent) {
        if self.state.is_terminal() {
            debug!(state = %self.state, ?event, "ignoring transport event after terminal state");
            return;
        }

        match event {
            TransportEvent::Opened if self.state == ConnectionState::Connecting => {
                self.on_open().await;
            }
            TransportEvent::Opened => {
                warn!(state = %self.state, "ignoring duplicate open event");
            }
            TransportEvent::Message(text) if self.state == ConnectionState::Open => {
                self.on_message(text).await;
            }
            TransportEvent::Message(_) => {
                warn!(state = %self.state, "dropping frame received before the connection opened");
            }
            TransportEvent::Closed => {
                self.enter_terminal(ConnectionState::Closed);
                info!("websocket closed");
            }
            TransportEvent::Errored(reason) => {
                self.enter_terminal(ConnectionState::Errored);
                warn!("websocket error: {reason}");
            }
        }
    }

    /// Sends one liveness sentinel.  Called on every keepalive tick.
    pub async fn send_liveness(&mut self) {
        if let Err(e) = self.transport.send_text(LIVENESS_SENTINEL.to_string()).await {
            warn!("failed to send liveness probe: {e}");
        }
    }

    /// Closes the connection from this side and enters CLOSED.
    pub async fn shutdown(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        info!("closing connection on local request");
        if let Err(e) = self.transport.close().await {
            warn!("failed to close transport cleanly: {e}");
        }
        self.enter_terminal(ConnectionState::Closed);
    }

    /// Runs the control loop until the connection reaches a terminal state.
    ///
    /// Inbound events, keepalive ticks and the shutdown signal are handled one
    /// at a time; each is processed to completion (including any reply) before
    /// the next is looked at.  A dropped event sender counts as `Closed`.
    /// Setting `shutdown` to `true` closes the connection locally.
    pub async fn run(
        &mut self,
        mut events: mpsc::Receiver<TransportEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> ConnectionState {
        if *shutdown.borrow_and_update() {
            self.shutdown().await;
        }
        let mut shutdown_armed = true;

        while !self.state.is_terminal() {
            tokio::select! {
                event = events.recv() => {
                    let event = event.unwrap_or(TransportEvent::Closed);
                    self.handle_event(event).await;
                }
                _ = self.keepalive.tick() => {
                    self.send_liveness().await;
                }
                changed = shutdown.changed(), if shutdown_armed => {
                    match changed {
                        Ok(()) => {
                            if *shutdown.borrow_and_update() {
                                self.shutdown().await;
                            }
                        }
                        // Sender dropped: no shutdown can be requested anymore.
                        Err(_) => shutdown_armed = false,
                    }
                }
            }
        }

        self.state
    }

    async fn on_open(&mut self) {
        self.transition(ConnectionState::Open);
        info!("websocket connected");
        if let Err(e) = self.transport.send_text(HELLO_MESSAGE.to_string()).await {
            warn!("failed to send hello: {e}");
        }
        self.keepalive.start();
    }

    async fn on_message(&mut self, text: String) {
        match classify(&text) {
            Frame::Liveness => debug!("liveness echo received"),
            Frame::Malformed(e) => warn!("dropping malformed frame: {e}"),
            Frame::Envelope(message) => {
                debug!(kind = message.kind_name(), "dispatching envelope");
                if let DispatchOutcome::Reply(result) = self.dispatcher.dispatch(message) {
                    self.send_result(&result).await;
                }
            }
        }
    }

    async fn send_result(&mut self, result: &CallResult) {
        let text = match encode_result(result) {
            Ok(text) => text,
            Err(e) => {
                warn!("failed to encode call result: {e}");
                return;
            }
        };
        if let Err(e) = self.transport.send_text(text).await {
            warn!("failed to send call result: {e}");
        }
    }

    fn enter_terminal(&mut self, state: ConnectionState) {
        if self.keepalive.stop() {
            debug!("keepalive stopped");
        }
        self.transition(state);
    }

    fn transition(&mut self, to: ConnectionState) {
        debug!(from = %self.state, %to, "connection state change");
        self.state = to;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::infrastructure::display::DisplayLog;
    use crate::infrastructure::evaluator::ArithmeticEvaluator;
    use crate::infrastructure::transport::RecordingTransport;

    const PERIOD: Duration = Duration::from_millis(2000);

    fn connection() -> (Connection<RecordingTransport>, Arc<DisplayLog>) {
        let log = Arc::new(DisplayLog::new());
        let dispatcher = Dispatcher::new(Arc::new(ArithmeticEvaluator), log.clone());
        (
            Connection::new(RecordingTransport::new(), dispatcher, PERIOD),
            log,
        )
    }

    async fn open_connection() -> (Connection<RecordingTransport>, Arc<DisplayLog>) {
        let (mut conn, log) = connection();
        conn.handle_event(TransportEvent::Opened).await;
        (conn, log)
    }

    #[test]
    fn test_new_connection_is_connecting_without_timer() {
        let (conn, _) = connection();
        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert!(!conn.keepalive_active());
        assert!(conn.transport().texts().is_empty());
    }

    #[tokio::test]
    async fn test_open_sends_hello_and_starts_keepalive() {
        // Arrange / Act
        let (conn, _) = open_connection().await;

        // Assert
        assert_eq!(conn.state(), ConnectionState::Open);
        assert!(conn.keepalive_active());
        assert_eq!(conn.transport().texts(), vec![HELLO_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_open_sends_hello_once() {
        let (mut conn, _) = open_connection().await;
        conn.handle_event(TransportEvent::Opened).await;
        assert_eq!(conn.transport().texts().len(), 1);
        assert!(conn.keepalive_active());
    }

    #[tokio::test]
    async fn test_close_stops_keepalive() {
        let (mut conn, _) = open_connection().await;

        conn.handle_event(TransportEvent::Closed).await;

        assert_eq!(conn.state(), ConnectionState::Closed);
        assert!(!conn.keepalive_active());
    }

    #[tokio::test]
    async fn test_error_stops_keepalive() {
        let (mut conn, _) = open_connection().await;

        conn.handle_event(TransportEvent::Errored("reset by peer".into()))
            .await;

        assert_eq!(conn.state(), ConnectionState::Errored);
        assert!(!conn.keepalive_active());
    }

    #[tokio::test]
    async fn test_connect_failure_enters_errored() {
        let (mut conn, _) = connection();
        conn.handle_event(TransportEvent::Errored("connection refused".into()))
            .await;
        assert_eq!(conn.state(), ConnectionState::Errored);
        assert!(conn.transport().texts().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_states_are_final() {
        let (mut conn, _) = open_connection().await;
        conn.handle_event(TransportEvent::Closed).await;

        conn.handle_event(TransportEvent::Opened).await;
        conn.handle_event(TransportEvent::Errored("late".into())).await;

        assert_eq!(conn.state(), ConnectionState::Closed);
        assert!(!conn.keepalive_active());
    }

    #[tokio::test]
    async fn test_message_before_open_is_dropped() {
        let (mut conn, _) = connection();
        conn.handle_event(TransportEvent::Message(
            r#"{"typ":"call","action":"eval","id":"1","data":"1+1"}"#.into(),
        ))
        .await;
        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert!(conn.transport().texts().is_empty());
    }

    #[tokio::test]
    async fn test_eval_call_sends_exact_result() {
        // Arrange
        let (mut conn, _) = open_connection().await;

        // Act
        conn.handle_event(TransportEvent::Message(
            r#"{"typ":"call","action":"eval","id":"42","data":"1+1"}"#.into(),
        ))
        .await;

        // Assert
        assert_eq!(
            conn.transport().texts().last().map(String::as_str),
            Some(r#"{"id":"42","typ":"result","data":2}"#)
        );
    }

    #[tokio::test]
    async fn test_non_string_call_data_is_echoed_as_result() {
        // Arrange
        let (mut conn, _) = open_connection().await;

        // Act
        conn.handle_event(TransportEvent::Message(
            r#"{"typ":"call","action":"eval","id":"n","data":42}"#.into(),
        ))
        .await;

        // Assert
        assert_eq!(
            conn.transport().texts(),
            vec![
                HELLO_MESSAGE.to_string(),
                r#"{"id":"n","typ":"result","data":42}"#.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_call_action_sends_nothing() {
        let (mut conn, _) = open_connection().await;
        conn.handle_event(TransportEvent::Message(
            r#"{"typ":"call","action":"noop","id":"1","data":"1+1"}"#.into(),
        ))
        .await;
        assert_eq!(conn.transport().texts(), vec![HELLO_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_frame_changes_nothing() {
        let (mut conn, _) = open_connection().await;

        conn.handle_event(TransportEvent::Message("{oops".into())).await;

        assert_eq!(conn.state(), ConnectionState::Open);
        assert!(conn.keepalive_active());
        assert_eq!(conn.transport().texts().len(), 1);
    }

    #[tokio::test]
    async fn test_liveness_echo_is_not_dispatched() {
        let (mut conn, log) = open_connection().await;
        conn.handle_event(TransportEvent::Message(LIVENESS_SENTINEL.into()))
            .await;
        assert_eq!(conn.transport().texts().len(), 1);
        assert!(log.fragments().is_empty());
    }

    #[tokio::test]
    async fn test_failed_evaluation_keeps_connection_open() {
        let (mut conn, _) = open_connection().await;
        conn.handle_event(TransportEvent::Message(
            r#"{"typ":"call","action":"eval","id":"9","data":"1/0"}"#.into(),
        ))
        .await;
        assert_eq!(conn.state(), ConnectionState::Open);
        assert_eq!(conn.transport().texts().len(), 1);
    }

    #[tokio::test]
    async fn test_send_failure_does_not_change_state() {
        let (mut conn, _) = connection();
        conn.transport.fail_sends(true);

        conn.handle_event(TransportEvent::Opened).await;
        conn.send_liveness().await;

        assert_eq!(conn.state(), ConnectionState::Open);
        assert!(conn.keepalive_active());
    }

    #[tokio::test]
    async fn test_shutdown_closes_transport() {
        let (mut conn, _) = open_connection().await;

        conn.shutdown().await;

        assert_eq!(conn.state(), ConnectionState::Closed);
        assert!(conn.transport().is_closed());
        assert!(!conn.keepalive_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_emits_sentinel_every_period() {
        // Arrange
        let (conn, _) = connection();
        let (tx, rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let start = tokio::time::Instant::now();
        tx.send(TransportEvent::Opened).await.unwrap();

        let task = tokio::spawn(async move {
            let mut conn = conn;
            let state = conn.run(rx, shutdown_rx).await;
            (state, conn)
        });

        // Act: stay open for 11 s (5 full periods), then close
        tokio::time::sleep(Duration::from_millis(11_000)).await;
        tx.send(TransportEvent::Closed).await.unwrap();
        let (state, conn) = task.await.unwrap();

        // Assert
        assert_eq!(state, ConnectionState::Closed);
        let probes: Vec<_> = conn
            .transport()
            .sent()
            .into_iter()
            .filter(|f| f.text == LIVENESS_SENTINEL)
            .collect();
        assert_eq!(probes.len(), 5);
        for (i, probe) in probes.iter().enumerate() {
            assert_eq!(probe.at - start, PERIOD * (i as u32 + 1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_sentinels_after_close() {
        let (conn, _) = connection();
        let (tx, rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        tx.send(TransportEvent::Opened).await.unwrap();
        tx.send(TransportEvent::Closed).await.unwrap();

        let mut conn = conn;
        let state = conn.run(rx, shutdown_rx).await;
        tokio::time::sleep(Duration::from_millis(10_000)).await;

        assert_eq!(state, ConnectionState::Closed);
        assert_eq!(conn.transport().texts(), vec![HELLO_MESSAGE.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exits_on_shutdown_signal() {
        let (conn, _) = connection();
        let (tx, rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tx.send(TransportEvent::Opened).await.unwrap();

        let task = tokio::spawn(async move {
            let mut conn = conn;
            let state = conn.run(rx, shutdown_rx).await;
            (state, conn)
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(true).unwrap();
        let (state, conn) = task.await.unwrap();

        assert_eq!(state, ConnectionState::Closed);
        assert!(conn.transport().is_closed());
        drop(tx);
    }

    #[tokio::test]
    async fn test_run_treats_dropped_sender_as_close() {
        let (mut conn, _) = connection();
        let (tx, rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        tx.send(TransportEvent::Opened).await.unwrap();
        drop(tx);

        let state = conn.run(rx, shutdown_rx).await;

        assert_eq!(state, ConnectionState::Closed);
    }
}
