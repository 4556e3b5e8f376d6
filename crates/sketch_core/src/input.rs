//! Keyboard and pointer state fed to sketch code.
//!
//! Raw input callbacks mutate this state; the running sketch reads it once per
//! tick and never writes to it. The `released` flags (keys and pointer) are
//! edge-triggered: true for exactly one rendered frame, cleared by
//! [`InputState::end_frame`] after each draw.

use std::collections::HashSet;

/// Numeric key identifier, matching the codes used in saved/exported projects.
pub type KeyCode = u32;

/// Pointer position and button state, relative to the drawing surface.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    /// Held down right now.
    pub pressed: bool,
    /// Released during the current frame (edge-triggered).
    pub released: bool,
}

/// Current input state for the sketch surface.
#[derive(Debug, Default)]
pub struct InputState {
    pub pointer: PointerState,
    keys_down: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw key-down callback.
    pub fn key_down(&mut self, code: KeyCode) {
        self.keys_down.insert(code);
    }

    /// Raw key-up callback.
    pub fn key_up(&mut self, code: KeyCode) {
        self.keys_down.remove(&code);
        self.keys_released.insert(code);
    }

    /// Raw pointer-down callback.
    pub fn pointer_down(&mut self) {
        self.pointer.pressed = true;
    }

    /// Raw pointer-up callback.
    pub fn pointer_up(&mut self) {
        self.pointer.pressed = false;
        self.pointer.released = true;
    }

    /// Raw pointer-move callback, coordinates relative to the surface.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.x = x;
        self.pointer.y = y;
    }

    /// Is the key currently held?
    pub fn pressed(&self, code: KeyCode) -> bool {
        self.keys_down.contains(&code)
    }

    /// Was the key released this frame?
    pub fn released(&self, code: KeyCode) -> bool {
        self.keys_released.contains(&code)
    }

    /// Snapshot of the held-key set, for bridging into script scope.
    pub fn keys_down_snapshot(&self) -> HashSet<KeyCode> {
        self.keys_down.clone()
    }

    /// Snapshot of the released-this-frame set.
    pub fn keys_released_snapshot(&self) -> HashSet<KeyCode> {
        self.keys_released.clone()
    }

    /// Clears edge-triggered state. Called once at the end of every rendered
    /// frame; held keys and the pointer position survive.
    pub fn end_frame(&mut self) {
        self.keys_released.clear();
        self.pointer.released = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_hold_and_release() {
        let mut input = InputState::new();
        input.key_down(32);
        assert!(input.pressed(32));
        assert!(!input.released(32));

        input.key_up(32);
        assert!(!input.pressed(32));
        assert!(input.released(32));
    }

    #[test]
    fn test_released_lasts_one_frame() {
        let mut input = InputState::new();
        input.key_down(65);
        input.key_up(65);
        assert!(input.released(65));

        input.end_frame();
        assert!(!input.released(65));
    }

    #[test]
    fn test_held_key_survives_end_frame() {
        let mut input = InputState::new();
        input.key_down(40);
        input.end_frame();
        assert!(input.pressed(40));
    }

    #[test]
    fn test_pointer_edge_flag() {
        let mut input = InputState::new();
        input.pointer_moved(12.0, 34.0);
        input.pointer_down();
        assert!(input.pointer.pressed);

        input.pointer_up();
        assert!(!input.pointer.pressed);
        assert!(input.pointer.released);

        input.end_frame();
        assert!(!input.pointer.released);
        assert_eq!(input.pointer.x, 12.0);
        assert_eq!(input.pointer.y, 34.0);
    }
}
