//! Keyboard input tracking for tileproto.
//!
//! The scroll camera only needs to know which direction keys are held each
//! fixed step, plus edge detection for one-shot keys like Escape. Everything
//! here is fed from winit keyboard events and queried by the frame driver.

mod keyboard;

pub use keyboard::{KeyboardState, RawKeyEvent};
