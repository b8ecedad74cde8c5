//! Frame-coherent keyboard state.
//!
//! [`KeyboardState`] accumulates winit key events and answers, for any
//! physical key: is it held, did it go down this frame, did it come up this
//! frame. Physical key codes are used throughout so WASD steering works the
//! same on every keyboard layout.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Minimal description of a key event, decoupled from winit for tests.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    /// The physical key involved.
    pub key: PhysicalKey,
    /// Whether the key was pressed or released.
    pub state: ElementState,
    /// Whether this is an OS auto-repeat event.
    pub repeat: bool,
}

/// Tracks held / just-pressed / just-released keys across a frame.
///
/// Forward every [`KeyEvent`] via [`process_event`](Self::process_event),
/// query during the update step, and call
/// [`clear_transients`](Self::clear_transients) once the frame is done.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<PhysicalKey>,
    just_pressed: HashSet<PhysicalKey>,
    just_released: HashSet<PhysicalKey>,
}

impl KeyboardState {
    /// New state with no keys held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a winit [`KeyEvent`], updating internal state.
    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Process a [`RawKeyEvent`]. OS auto-repeats are ignored; held state is
    /// tracked from the initial press until release.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                self.pressed.insert(event.key);
                self.just_pressed.insert(event.key);
            }
            ElementState::Released => {
                self.pressed.remove(&event.key);
                self.just_released.insert(event.key);
            }
        }
    }

    /// `true` while the key is held down.
    #[must_use]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&PhysicalKey::Code(key))
    }

    /// `true` only during the frame the key went down.
    #[must_use]
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&PhysicalKey::Code(key))
    }

    /// `true` only during the frame the key came up.
    #[must_use]
    pub fn just_released(&self, key: KeyCode) -> bool {
        self.just_released.contains(&PhysicalKey::Code(key))
    }

    /// Steering direction from the held arrow/WASD keys, one unit per axis:
    /// +x right, +y up. Opposite keys cancel.
    #[must_use]
    pub fn steer_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.is_pressed(KeyCode::ArrowRight) || self.is_pressed(KeyCode::KeyD) {
            axis.x += 1.0;
        }
        if self.is_pressed(KeyCode::ArrowLeft) || self.is_pressed(KeyCode::KeyA) {
            axis.x -= 1.0;
        }
        if self.is_pressed(KeyCode::ArrowUp) || self.is_pressed(KeyCode::KeyW) {
            axis.y += 1.0;
        }
        if self.is_pressed(KeyCode::ArrowDown) || self.is_pressed(KeyCode::KeyS) {
            axis.y -= 1.0;
        }
        axis
    }

    /// Clear the just-pressed / just-released sets. Call once per frame.
    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
