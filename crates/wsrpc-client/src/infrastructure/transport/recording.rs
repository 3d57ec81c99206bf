//! In-memory transport that records every frame it is asked to send.
//!
//! Each frame is stamped with `tokio::time::Instant::now()`, so under a
//! paused test clock the recorded instants are exact and keepalive spacing
//! can be asserted to the millisecond.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::application::{Transport, TransportError};

/// One frame handed to [`RecordingTransport::send_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFrame {
    pub at: Instant,
    pub text: String,
}

/// [`Transport`] that keeps sent frames in memory.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentFrame>>,
    closed: AtomicBool,
    should_fail: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every subsequent send fails with [`TransportError::Send`].
    pub fn fail_sends(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// All successfully sent frames, oldest first.
    pub fn sent(&self) -> Vec<SentFrame> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Text of all successfully sent frames, oldest first.
    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|f| f.text).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(TransportError::Send("recording transport set to fail".into()));
        }
        let frame = SentFrame {
            at: Instant::now(),
            text,
        };
        self.sent
            .lock()
            .map_err(|_| TransportError::Send("frame log poisoned".into()))?
            .push(frame);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
