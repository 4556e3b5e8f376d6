//! Scrollback log and persistent error status.
//!
//! Mirrors sketch `print` output and frame-loop error reports. The most recent
//! error stays in the status slot until an explicit clear or the next run
//! starts; it is never cleared automatically.

use crate::error::SketchError;
use log::error;

/// Oldest lines are dropped past this point.
const SCROLLBACK_LIMIT: usize = 1000;

#[derive(Debug, Default)]
pub struct Console {
    lines: Vec<String>,
    status: Option<SketchError>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line to the scrollback.
    pub fn log(&mut self, line: impl Into<String>) {
        if self.lines.len() == SCROLLBACK_LIMIT {
            self.lines.remove(0);
        }
        self.lines.push(line.into());
    }

    /// Records an error: scrollback entry plus the persistent status slot.
    pub fn report(&mut self, err: SketchError) {
        error!("{}", err);
        self.log(err.to_string());
        self.status = Some(err);
    }

    /// Most recent error, if any run since the last clear produced one.
    pub fn status(&self) -> Option<&SketchError> {
        self.status.as_ref()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Explicit clear: wipes both the scrollback and the status.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.status = None;
    }
}
