//! Per-tick tank steering.
//!
//! Held movement keys produce a direction vector that is normalized and
//! scaled by `speed × 24 / 1000` arena units per tick. The hull turns
//! toward the direction of travel by at most `speed / 15` degrees per
//! tick, snapping onto the target once within one step.

use glam::Vec2;

use crate::geometry::{normalize_angle, to_degrees, wrap_degrees};
use crate::input::MoveIntent;

/// Arena units moved per tick per point of speed.
pub const MOVE_SCALE: f32 = 24.0 / 1000.0;

/// Divisor turning speed into a hull turn rate in degrees per tick.
pub const TURN_DIVISOR: f32 = 15.0;

/// Displacement for one tick. Zero when no direction is held or opposite
/// keys cancel.
#[must_use]
pub fn displacement(intent: &MoveIntent, speed: f32) -> Vec2 {
    let axis = intent.axis();
    if axis == Vec2::ZERO {
        return Vec2::ZERO;
    }
    axis.normalize() * speed * MOVE_SCALE
}

/// Turn `current` degrees toward `target` degrees by at most `rate`.
///
/// The result is normalized to `[0, 360)`.
#[must_use]
pub fn turn_toward(current: f32, target: f32, rate: f32) -> f32 {
    let diff = wrap_degrees(normalize_angle(target - current));
    let turned = if diff.abs() < rate {
        target
    } else {
        current + rate * diff.signum()
    };
    normalize_angle(turned)
}

/// Heading in degrees of a displacement.
#[must_use]
pub fn heading_degrees(displacement: Vec2) -> f32 {
    to_degrees(displacement.y.atan2(displacement.x))
}

/// Angle in radians from `from` toward `to`.
#[must_use]
pub fn aim_angle(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    #[test]
    fn test_diagonal_is_normalized() {
        let mut intent = MoveIntent::default();
        intent.set(Key::Up, true);
        intent.set(Key::Right, true);

        let step = displacement(&intent, 100.0);
        assert!((step.length() - 2.4).abs() < 1e-5);
        assert!(step.x > 0.0 && step.y < 0.0);
    }

    #[test]
    fn test_idle_does_not_move() {
        assert_eq!(displacement(&MoveIntent::default(), 100.0), Vec2::ZERO);
    }

    #[test]
    fn test_turn_takes_shortest_way() {
        // 350 -> 10 goes forward through 0
        let turned = turn_toward(350.0, 10.0, 5.0);
        assert!((turned - 355.0).abs() < 1e-4);

        // 10 -> 350 goes backward through 0
        let turned = turn_toward(10.0, 350.0, 5.0);
        assert!((turned - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_turn_snaps_when_close() {
        assert_eq!(turn_toward(88.0, 90.0, 5.0), 90.0);
        // Negative targets come out normalized
        assert_eq!(turn_toward(268.0, -90.0, 5.0), 270.0);
    }

    #[test]
    fn test_heading_and_aim() {
        assert!((heading_degrees(Vec2::new(0.0, -1.0)) + 90.0).abs() < 1e-4);
        let angle = aim_angle(Vec2::ZERO, Vec2::new(0.0, 10.0));
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
