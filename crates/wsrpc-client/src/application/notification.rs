//! Notification handling: applies `show` notifications to a display surface.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use wsrpc_core::{Notification, NotifyAction};

/// Error type for display output.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Append-only surface that shows notification content.
///
/// The surface is owned by the host; the client only appends to it, one
/// fragment per `show` notification, in arrival order.  Implementations
/// separate consecutive fragments with a line break.
pub trait DisplaySurface: Send + Sync {
    /// Appends one fragment after the existing content.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError`] if the surface could not be written.
    fn append(&self, fragment: &str) -> Result<(), DisplayError>;
}

/// Applies notifications to a [`DisplaySurface`].
pub struct NotificationHandler {
    display: Arc<dyn DisplaySurface>,
}

impl NotificationHandler {
    pub fn new(display: Arc<dyn DisplaySurface>) -> Self {
        Self { display }
    }

    /// Applies `notification`.  Returns `true` when something was displayed.
    pub fn handle(&self, notification: Notification) -> bool {
        match notification.action {
            NotifyAction::Show => {
                let fragment = render_fragment(&notification.data);
                match self.display.append(&fragment) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("failed to display notification: {e}");
                        false
                    }
                }
            }
            NotifyAction::Unknown => {
                debug!("ignoring notification with unrecognised action");
                false
            }
        }
    }
}

/// Text shown for a notification payload: strings verbatim, anything else
/// as compact JSON.
pub fn render_fragment(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingDisplay {
        fragments: Mutex<Vec<String>>,
        should_fail: bool,
    }

    impl DisplaySurface for CapturingDisplay {
        fn append(&self, fragment: &str) -> Result<(), DisplayError> {
            if self.should_fail {
                return Err(std::io::Error::other("mock failure").into());
            }
            self.fragments.lock().unwrap().push(fragment.to_string());
            Ok(())
        }
    }

    fn show(data: Value) -> Notification {
        Notification {
            action: NotifyAction::Show,
            data,
        }
    }

    #[test]
    fn test_show_appends_fragments_in_order() {
        // Arrange
        let display = Arc::new(CapturingDisplay::default());
        let handler = NotificationHandler::new(display.clone());

        // Act
        assert!(handler.handle(show(json!("A"))));
        assert!(handler.handle(show(json!("B"))));

        // Assert
        assert_eq!(*display.fragments.lock().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_action_displays_nothing() {
        let display = Arc::new(CapturingDisplay::default());
        let handler = NotificationHandler::new(display.clone());

        let applied = handler.handle(Notification {
            action: NotifyAction::Unknown,
            data: json!("A"),
        });

        assert!(!applied);
        assert!(display.fragments.lock().unwrap().is_empty());
    }

    #[test]
    fn test_display_failure_is_reported_not_raised() {
        let display = Arc::new(CapturingDisplay {
            should_fail: true,
            ..Default::default()
        });
        let handler = NotificationHandler::new(display);

        assert!(!handler.handle(show(json!("A"))));
    }

    #[test]
    fn test_render_fragment_formats() {
        assert_eq!(render_fragment(&json!("12 + 30 = 42\n")), "12 + 30 = 42\n");
        assert_eq!(render_fragment(&json!(42)), "42");
        assert_eq!(render_fragment(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
        assert_eq!(render_fragment(&Value::Null), "null");
    }
}
