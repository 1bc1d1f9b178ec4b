//! Keyboard and virtual-button input
//!
//! Arrow keys, WASD and Space plus the on-screen left/right/jump buttons all
//! feed one [`InputMapper`]. Sources are OR-composed; a jump press is latched
//! until the next sample so a quick tap between frames is not lost.

use std::collections::HashSet;

use crate::sim::TickInput;

/// Logical control a key or button drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Jump,
}

/// Map a `KeyboardEvent.key` value to a control
pub fn control_for_key(key: &str) -> Option<Control> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(Control::Left),
        "ArrowRight" | "d" | "D" => Some(Control::Right),
        "ArrowUp" | "w" | "W" | " " | "Spacebar" => Some(Control::Jump),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct InputMapper {
    /// Mapped keys currently down
    keys: HashSet<String>,
    /// Virtual buttons currently down
    buttons: HashSet<Control>,
    jump_latched: bool,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false for keys that map to nothing
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(control) = control_for_key(key) else {
            return false;
        };
        // Auto-repeat keydowns are not new presses
        if self.keys.insert(key.to_owned()) && control == Control::Jump {
            self.jump_latched = true;
        }
        true
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.remove(key);
    }

    pub fn button_down(&mut self, control: Control) {
        if self.buttons.insert(control) && control == Control::Jump {
            self.jump_latched = true;
        }
    }

    pub fn button_up(&mut self, control: Control) {
        self.buttons.remove(&control);
    }

    /// Forget everything held, e.g. when the page loses focus
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.buttons.clear();
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.buttons.contains(&control)
            || self
                .keys
                .iter()
                .any(|key| control_for_key(key) == Some(control))
    }

    /// Build this frame's input and consume the latched press
    pub fn sample(&mut self) -> TickInput {
        TickInput {
            left: self.is_held(Control::Left),
            right: self.is_held(Control::Right),
            jump_held: self.is_held(Control::Jump),
            jump_pressed: std::mem::take(&mut self.jump_latched),
        }
    }
}
