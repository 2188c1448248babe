//! Input seam.
//!
//! Raw device wiring lives outside the core. An input source translates
//! device events into [`InputEvent`]s in arena coordinates (already
//! adjusted for any camera offset) and hands them to
//! [`Simulation::handle_input`](crate::simulation::Simulation::handle_input).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A key the simulation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    /// Move up.
    Up,
    /// Move down.
    Down,
    /// Move left.
    Left,
    /// Move right.
    Right,
    /// Activate the Disperse power-up.
    Disperse,
    /// Activate the Boost power-up.
    Boost,
}

impl Key {
    /// Map a browser-style key name to a key.
    ///
    /// Both WASD and the arrow keys move; `q` is Disperse and space is Boost.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "w" | "ArrowUp" => Some(Key::Up),
            "s" | "ArrowDown" => Some(Key::Down),
            "a" | "ArrowLeft" => Some(Key::Left),
            "d" | "ArrowRight" => Some(Key::Right),
            "q" => Some(Key::Disperse),
            " " => Some(Key::Boost),
            _ => None,
        }
    }
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    /// Primary button.
    Left,
    /// Middle button.
    Middle,
    /// Secondary button; toggles auto-fire.
    Right,
}

/// A device event in arena coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// A key went down.
    KeyDown(Key),
    /// A key went up.
    KeyUp(Key),
    /// The pointer moved to a point in the arena.
    PointerMove(Vec2),
    /// A pointer button went down.
    PointerDown(PointerButton),
    /// A primary click: fire at the pointer.
    Click,
}

/// Held state for the four movement directions.
///
/// Aliased names (`w` and `ArrowUp`, and so on) resolve to the same
/// [`Key`] and share one flag, so releasing either alias clears the
/// direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveIntent {
    /// Up held.
    pub up: bool,
    /// Down held.
    pub down: bool,
    /// Left held.
    pub left: bool,
    /// Right held.
    pub right: bool,
}

impl MoveIntent {
    /// Record a key press or release. Non-movement keys are ignored.
    pub fn set(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Up => self.up = pressed,
            Key::Down => self.down = pressed,
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
            Key::Disperse | Key::Boost => {}
        }
    }

    /// Raw direction from the held keys, each axis in `{-1, 0, 1}`.
    #[must_use]
    pub fn axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.up {
            axis.y -= 1.0;
        }
        if self.left {
            axis.x -= 1.0;
        }
        if self.down {
            axis.y += 1.0;
        }
        if self.right {
            axis.x += 1.0;
        }
        axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("w"), Some(Key::Up));
        assert_eq!(Key::from_name("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_name("q"), Some(Key::Disperse));
        assert_eq!(Key::from_name(" "), Some(Key::Boost));
        assert_eq!(Key::from_name("x"), None);
    }

    #[test]
    fn test_aliases_share_one_flag() {
        let mut intent = MoveIntent::default();
        let (wasd, arrow) = (Key::from_name("w").unwrap(), Key::from_name("ArrowUp").unwrap());
        intent.set(wasd, true);
        intent.set(arrow, true);
        intent.set(arrow, false);
        assert_eq!(intent.axis(), Vec2::ZERO);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut intent = MoveIntent::default();
        intent.set(Key::Up, true);
        intent.set(Key::Down, true);
        intent.set(Key::Right, true);
        assert_eq!(intent.axis(), Vec2::new(1.0, 0.0));

        intent.set(Key::Right, false);
        intent.set(Key::Boost, true);
        assert_eq!(intent.axis(), Vec2::ZERO);
    }
}
