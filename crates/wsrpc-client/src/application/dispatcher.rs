//! Envelope dispatch.
//!
//! Routes purely on the envelope kind:
//!
//! ```text
//! Call(req)      → CallExecutor         → Reply / EvaluationFailed / Ignored
//! Notify(n)      → NotificationHandler  → Displayed / Ignored
//! Unrecognized   →                        Ignored
//! ```
//!
//! Dispatch never panics and never produces a reply for an unrecognised kind
//! or action.  Evaluation failures are logged here and degrade to "no reply".

use std::sync::Arc;

use tracing::warn;
use wsrpc_core::{CallResult, InboundMessage};

use crate::application::call_executor::{CallExecutor, Evaluator};
use crate::application::notification::{DisplaySurface, NotificationHandler};

/// What dispatching one envelope produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A result that must be sent back to the peer.
    Reply(CallResult),
    /// A notification was appended to the display.
    Displayed,
    /// Evaluation failed; logged, nothing to send.
    EvaluationFailed,
    /// Unrecognised kind or action, or a display that could not be written.
    Ignored,
}

/// Routes decoded envelopes to their handler.
pub struct Dispatcher {
    calls: CallExecutor,
    notifications: NotificationHandler,
}

impl Dispatcher {
    pub fn new(evaluator: Arc<dyn Evaluator>, display: Arc<dyn DisplaySurface>) -> Self {
        Self {
            calls: CallExecutor::new(evaluator),
            notifications: NotificationHandler::new(display),
        }
    }

    /// Dispatches one envelope to completion.
    pub fn dispatch(&self, message: InboundMessage) -> DispatchOutcome {
        match message {
            InboundMessage::Call(request) => {
                let id = request.id.clone();
                match self.calls.execute(request) {
                    Ok(Some(result)) => DispatchOutcome::Reply(result),
                    Ok(None) => DispatchOutcome::Ignored,
                    Err(e) => {
                        match id {
                            Some(id) => warn!("call {id}: evaluation failed: {e}"),
                            None => warn!("call without id: evaluation failed: {e}"),
                        }
                        DispatchOutcome::EvaluationFailed
                    }
                }
            }
            InboundMessage::Notify(notification) => {
                if self.notifications.handle(notification) {
                    DispatchOutcome::Displayed
                } else {
                    DispatchOutcome::Ignored
                }
            }
            InboundMessage::Unrecognized => DispatchOutcome::Ignored,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
