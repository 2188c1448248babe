//! Firing and damage rules.
//!
//! This module implements:
//! - Cooldown-gated firing (`60000 / attack_speed` ms between volleys)
//! - Shot patterns: fixed angular offsets fired simultaneously
//! - Timed power-ups that swap the pattern and scale stats
//! - Integer health arithmetic for damage, recoil and heals
//!
//! Fractions of health are computed in basis points so that e.g. 15% of
//! 20 is exactly 3, with truncation toward zero.

use serde::{Deserialize, Serialize};

use crate::geometry::{to_degrees, to_radians};
use crate::schedule::SimTime;
use crate::tank::TankId;

/// Angular offsets, in degrees, fired by one volley.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShotPattern {
    /// A single projectile along the aim.
    #[default]
    Normal,
    /// Three-way spread.
    Disperse,
    /// Five-way spread.
    FiveDisperse,
    /// Six directions, 60° apart.
    SixDisperse,
    /// Twelve directions, 30° apart.
    TwelveDisperse,
}

impl ShotPattern {
    /// Offsets in degrees, added to the aim angle.
    #[must_use]
    pub fn offsets_degrees(self) -> &'static [f32] {
        match self {
            ShotPattern::Normal => &[0.0],
            ShotPattern::Disperse => &[0.0, -15.0, 15.0],
            ShotPattern::FiveDisperse => &[0.0, -10.0, 10.0, -20.0, 20.0],
            ShotPattern::SixDisperse => &[0.0, 60.0, -60.0, 120.0, -120.0, -180.0],
            ShotPattern::TwelveDisperse => &[
                0.0, 30.0, -30.0, 60.0, -60.0, 90.0, -90.0, 120.0, -120.0, 150.0, -150.0, 180.0,
            ],
        }
    }

    /// Projectile angles in radians for a volley aimed at `aim` radians.
    #[must_use]
    pub fn volley_angles(self, aim: f32) -> Vec<f32> {
        let aim_degrees = to_degrees(aim);
        self.offsets_degrees()
            .iter()
            .map(|offset| to_radians(aim_degrees + offset))
            .collect()
    }
}

/// Timed power-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUp {
    /// Faster firing, movement and projectiles with a five-way spread.
    Boost,
    /// Three-way spread.
    Disperse,
}

impl PowerUp {
    /// Pattern the power-up switches to.
    #[must_use]
    pub const fn pattern(self) -> ShotPattern {
        match self {
            PowerUp::Boost => ShotPattern::FiveDisperse,
            PowerUp::Disperse => ShotPattern::Disperse,
        }
    }
}

/// Minimum time between volleys, in milliseconds.
#[must_use]
pub fn cooldown_ms(attack_speed: f32) -> f64 {
    60_000.0 / f64::from(attack_speed)
}

/// Whether a tank that last fired at `last_shot` may fire at `now`.
///
/// A tank with no attack speed never fires.
#[must_use]
pub fn cooldown_ready(last_shot: Option<SimTime>, now: SimTime, attack_speed: f32) -> bool {
    if attack_speed <= 0.0 {
        return false;
    }
    match last_shot {
        None => true,
        Some(last) => now.millis_since(last) >= cooldown_ms(attack_speed),
    }
}

/// `fraction` of `amount`, truncated toward zero.
#[must_use]
pub fn fraction_of(amount: i32, fraction: f32) -> i32 {
    let basis_points = (f64::from(fraction) * 10_000.0).round() as i64;
    let scaled = i128::from(amount) * i128::from(basis_points) / 10_000;
    scaled.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
}

/// Recoil the shooter takes for landing a hit.
#[must_use]
pub fn recoil_damage(attack: u32, fraction: f32) -> i32 {
    fraction_of(i32::try_from(attack).unwrap_or(i32::MAX), fraction)
}

/// Heal of `fraction` of the missing health, truncated.
#[must_use]
pub fn missing_health_heal(hp: i32, max_hp: i32, fraction: f32) -> i32 {
    fraction_of(max_hp - hp, fraction)
}

/// One projectile connecting with one tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitEvent {
    /// Tank that fired the projectile.
    pub attacker: TankId,
    /// Tank that was hit.
    pub target: TankId,
    /// Damage dealt to the target.
    pub damage: i32,
    /// Recoil taken by the attacker.
    pub recoil: i32,
    /// The target rolled an immediate heal.
    pub target_healed: bool,
    /// The attacker rolled an immediate heal.
    pub attacker_healed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_offsets() {
        assert_eq!(ShotPattern::Normal.offsets_degrees(), &[0.0]);
        assert_eq!(ShotPattern::Disperse.offsets_degrees().len(), 3);
        assert_eq!(ShotPattern::FiveDisperse.offsets_degrees().len(), 5);
        assert_eq!(ShotPattern::SixDisperse.offsets_degrees().len(), 6);
        assert_eq!(ShotPattern::TwelveDisperse.offsets_degrees().len(), 12);
    }

    #[test]
    fn test_disperse_volley_from_zero() {
        let angles: Vec<f32> = ShotPattern::Disperse
            .volley_angles(0.0)
            .into_iter()
            .map(to_degrees)
            .collect();
        assert_eq!(angles.len(), 3);
        assert!(angles[0].abs() < 1e-4);
        assert!((angles[1] + 15.0).abs() < 1e-4);
        assert!((angles[2] - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_cooldown() {
        // 120 shots per minute = 500 ms
        assert_eq!(cooldown_ms(120.0), 500.0);
        let last = Some(SimTime::from_millis(1_000));
        assert!(cooldown_ready(None, SimTime::ZERO, 120.0));
        assert!(!cooldown_ready(last, SimTime::from_millis(1_499), 120.0));
        assert!(cooldown_ready(last, SimTime::from_millis(1_500), 120.0));
        assert!(!cooldown_ready(None, SimTime::ZERO, 0.0));
    }

    #[test]
    fn test_recoil_is_floor_of_fifteen_percent() {
        assert_eq!(recoil_damage(286, 0.15), 42);
        assert_eq!(recoil_damage(20, 0.15), 3);
        assert_eq!(recoil_damage(100, 0.15), 15);
        assert_eq!(recoil_damage(6, 0.15), 0);
    }

    #[test]
    fn test_huge_attack_saturates_instead_of_wrapping() {
        // i32::MAX × 0.15, truncated
        assert_eq!(recoil_damage(u32::MAX, 0.15), 322_122_547);
        assert!(recoil_damage(u32::MAX, 1.0) > 0);
        assert_eq!(fraction_of(i32::MAX, 1.0e30), i32::MAX);
        assert_eq!(fraction_of(i32::MIN, 1.0e30), i32::MIN);
    }

    #[test]
    fn test_missing_health_heal_truncates() {
        assert_eq!(missing_health_heal(900, 1_000, 0.1), 10);
        assert_eq!(missing_health_heal(995, 1_000, 0.1), 0);
        assert_eq!(missing_health_heal(-50, 1_000, 0.1), 105);
        assert_eq!(missing_health_heal(1_000, 1_000, 0.1), 0);
    }

    #[test]
    fn test_power_up_patterns() {
        assert_eq!(PowerUp::Boost.pattern(), ShotPattern::FiveDisperse);
        assert_eq!(PowerUp::Disperse.pattern(), ShotPattern::Disperse);
    }
}
