//! Display surfaces for `show` notifications.
//!
//! - [`DisplayLog`] keeps fragments in memory.  Its rendered form separates
//!   fragments with a line break, so `A` then `B` renders as `"A\nB"`.
//! - [`LineWriterDisplay`] writes each fragment as one line to any
//!   `io::Write` (stdout in the binary).

use std::io::Write;
use std::sync::Mutex;

use crate::application::{DisplayError, DisplaySurface};

/// Separator placed between consecutive fragments.
pub const LINE_BREAK: &str = "\n";

/// Append-only in-memory display.
#[derive(Debug, Default)]
pub struct DisplayLog {
    fragments: Mutex<Vec<String>>,
}

impl DisplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments in arrival order.
    pub fn fragments(&self) -> Vec<String> {
        self.fragments.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// The full display content.
    pub fn render(&self) -> String {
        self.fragments().join(LINE_BREAK)
    }
}

impl DisplaySurface for DisplayLog {
    fn append(&self, fragment: &str) -> Result<(), DisplayError> {
        self.fragments
            .lock()
            .map_err(|_| DisplayError::Io(std::io::Error::other("display log poisoned")))?
            .push(fragment.to_string());
        Ok(())
    }
}

/// Writes one line per fragment and flushes after each.
#[derive(Debug)]
pub struct LineWriterDisplay<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> LineWriterDisplay<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> DisplaySurface for LineWriterDisplay<W> {
    fn append(&self, fragment: &str) -> Result<(), DisplayError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| DisplayError::Io(std::io::Error::other("display writer poisoned")))?;
        writer.write_all(fragment.as_bytes())?;
        writer.write_all(LINE_BREAK.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
