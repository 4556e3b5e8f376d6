//! The language-neutral compiled-program seam.
//!
//! The runner drives anything implementing [`Program`]; the scripting crate
//! provides the Lua implementation. Keeping the contract behind traits means
//! the scheduling semantics are testable with stub programs and the sketch
//! language could be swapped without touching the runner.

use crate::error::SketchResult;
use crate::input::InputState;

/// The three editable source panes, in build order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sources {
    /// Runs once at program-scope when the unit is built.
    pub start: String,
    /// Body of `update(deltaTime, width, height, mouse, key)`.
    pub update: String,
    /// Body of `draw(width, height)`.
    pub draw: String,
}

impl Sources {
    pub fn new(
        start: impl Into<String>,
        update: impl Into<String>,
        draw: impl Into<String>,
    ) -> Self {
        Self {
            start: start.into(),
            update: update.into(),
            draw: draw.into(),
        }
    }

    /// Whether there is anything for the frame loop to do. With both update
    /// and draw empty the runner auto-stops after one build attempt instead
    /// of idling forever.
    pub fn is_runnable(&self) -> bool {
        !self.update.is_empty() || !self.draw.is_empty()
    }
}

/// A built, runnable unit. Valid for the lifetime of one run; the runner
/// discards it entirely on stop (clean-slate rule: no sketch state survives a
/// stop/start cycle).
pub trait Program {
    /// One fixed-size simulation step. `delta_time` is the frame interval in
    /// seconds; the runner fully controls every value entering the tick.
    fn update(
        &mut self,
        delta_time: f64,
        width: u32,
        height: u32,
        input: &InputState,
    ) -> SketchResult<()>;

    /// One render pass, called exactly once per frame callback.
    fn draw(&mut self, width: u32, height: u32) -> SketchResult<()>;
}

impl std::fmt::Debug for dyn Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Program")
    }
}

/// Compiles the three panes into a [`Program`].
///
/// Injected constants and asset accessors are fixed at builder construction;
/// `build` fails with a Compile error when the combined source is not a valid
/// executable unit (including errors raised by start code, which runs during
/// construction).
pub trait ProgramBuilder {
    fn build(&self, sources: &Sources) -> SketchResult<Box<dyn Program>>;
}
