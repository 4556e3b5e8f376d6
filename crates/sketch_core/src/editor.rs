//! Text-editing surface contract and the in-memory implementation.
//!
//! The sandbox only needs five things from whatever widget hosts the panes:
//! read the text, replace the text, lock it while a sketch runs, focus it, and
//! learn that it changed. Syntax highlighting, undo and keybindings are the
//! widget's business.

use crate::program::Sources;

/// Minimal contract required from a text-editing surface.
pub trait TextSurface {
    fn value(&self) -> &str;
    fn set_value(&mut self, text: &str);
    fn set_read_only(&mut self, read_only: bool);
    fn focus(&mut self);
}

/// Plain in-memory pane. The change flag is consumable: a caller that wants
/// change notifications polls [`take_changed`](BufferEditor::take_changed)
/// instead of registering a callback.
#[derive(Debug, Default)]
pub struct BufferEditor {
    text: String,
    read_only: bool,
    focused: bool,
    changed: bool,
}

impl BufferEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Returns and clears the changed flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

impl TextSurface for BufferEditor {
    fn value(&self) -> &str {
        &self.text
    }

    // Read-only blocks interactive edits, not programmatic ones, so load and
    // new-project flows work while a sketch is running.
    fn set_value(&mut self, text: &str) {
        if self.text != text {
            self.text = text.to_string();
            self.changed = true;
        }
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

/// The three panes as one unit.
#[derive(Debug, Default)]
pub struct EditorPanes {
    pub start: BufferEditor,
    pub update: BufferEditor,
    pub draw: BufferEditor,
}

impl EditorPanes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the pane contents in build order.
    pub fn sources(&self) -> Sources {
        Sources::new(
            self.start.value(),
            self.update.value(),
            self.draw.value(),
        )
    }

    pub fn set_sources(&mut self, sources: &Sources) {
        self.start.set_value(&sources.start);
        self.update.set_value(&sources.update);
        self.draw.set_value(&sources.draw);
    }

    /// Locks or unlocks all three panes around a run session.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.start.set_read_only(read_only);
        self.update.set_read_only(read_only);
        self.draw.set_read_only(read_only);
    }

    /// True if any pane changed since the last poll.
    pub fn take_changed(&mut self) -> bool {
        // No short-circuit: every flag must be consumed.
        let start = self.start.take_changed();
        let update = self.update.take_changed();
        let draw = self.draw.take_changed();
        start || update || draw
    }
}
