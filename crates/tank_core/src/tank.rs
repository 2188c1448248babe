//! Tanks: the only actors in the arena.
//!
//! A tank is built once per match from a validated [`TankConfig`] and is
//! never destroyed. Death flips it to a dead state it only leaves through
//! a revive, which restores full health in place.
//!
//! # Health
//!
//! Every health mutation goes through [`Tank::set_health`]. It returns a
//! [`HealthChange`] carrying the damage-number request and whether the
//! call killed the tank; the owner of the tank forwards both (spawning the
//! number and scheduling the revive). Nothing happens behind the caller's
//! back.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use tank_core::tank::{Tank, TankConfig, TankStats, Team};
//!
//! let config = TankConfig {
//!     position: Vec2::new(100.0, 100.0),
//!     stats: TankStats {
//!         max_hp: 100,
//!         atk: 20,
//!         ..TankStats::default()
//!     },
//!     ..TankConfig::new("scout", Team::Enemies)
//! };
//! let mut tank = Tank::new(0, config).unwrap();
//!
//! let change = tank.set_health(0);
//! assert!(change.died);
//! assert!(tank.is_dead());
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::TankImagery;
use crate::combat::{cooldown_ready, PowerUp, ShotPattern};
use crate::config::BoostConfig;
use crate::effects::{DamageNumbers, EffectRequest, NumberTone};
use crate::error::{GameError, Result};
use crate::geometry::{normalize_angle, Circle};
use crate::input::{Key, MoveIntent};
use crate::movement;
use crate::schedule::SimTime;

/// Unique identifier for a tank: its index in the simulation.
pub type TankId = u32;

/// Damage-number text size as a fraction of the tank's diameter.
pub const DAMAGE_FONT_FRACTION: f32 = 0.16;

/// Which side a tank fights on. Projectiles only hit the other side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Team {
    /// The player's side.
    #[default]
    Allies,
    /// Everyone else.
    Enemies,
}

impl Team {
    /// Check whether two teams are hostile to each other.
    #[must_use]
    pub fn opposes(self, other: Team) -> bool {
        self != other
    }
}

/// Combat and movement statistics.
///
/// `pen` and `armor` are carried for data compatibility and play no part
/// in damage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankStats {
    /// Maximum (and starting) health.
    pub max_hp: i32,
    /// Damage per hit.
    pub atk: u32,
    /// Penetration. Unused.
    pub pen: u32,
    /// Armor. Unused.
    pub armor: u32,
    /// Movement speed.
    pub speed: f32,
    /// Volleys per minute.
    pub attack_speed: f32,
    /// Distance a projectile travels before expiring.
    pub bullet_range: f32,
    /// Projectile speed in arena units per tick.
    pub bullet_speed: f32,
}

impl Default for TankStats {
    fn default() -> Self {
        Self {
            max_hp: 100,
            atk: 0,
            pen: 0,
            armor: 0,
            speed: 0.0,
            attack_speed: 0.0,
            bullet_range: 0.0,
            bullet_speed: 0.0,
        }
    }
}

/// Everything needed to build a [`Tank`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankConfig {
    /// Display name.
    pub name: String,
    /// Side the tank fights on.
    pub team: Team,
    /// Whether this is the locally controlled tank.
    #[serde(default)]
    pub is_player: bool,
    /// Starting center.
    #[serde(default)]
    pub position: Vec2,
    /// Collision radius.
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Starting hull rotation in degrees.
    #[serde(default)]
    pub rotation: f32,
    /// Starting turret rotation in radians.
    #[serde(default)]
    pub head_rotation: f32,
    /// Statistics.
    #[serde(default)]
    pub stats: TankStats,
    /// Images, resolved by the caller.
    #[serde(skip)]
    pub imagery: TankImagery,
}

fn default_radius() -> f32 {
    75.0
}

impl TankConfig {
    /// A config with default placement and stats.
    #[must_use]
    pub fn new(name: impl Into<String>, team: Team) -> Self {
        Self {
            name: name.into(),
            team,
            is_player: false,
            position: Vec2::ZERO,
            radius: default_radius(),
            rotation: 0.0,
            head_rotation: 0.0,
            stats: TankStats::default(),
            imagery: TankImagery::default(),
        }
    }

    /// Reject configurations that would put NaN or a dead-on-arrival tank
    /// into the arena.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(GameError::InvalidConfig(format!(
                "tank '{}': {reason}",
                self.name
            )))
        };

        if self.stats.max_hp <= 0 {
            return invalid("max_hp must be positive");
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return invalid("radius must be positive");
        }
        if !(self.position.is_finite() && self.rotation.is_finite() && self.head_rotation.is_finite())
        {
            return invalid("placement must be finite");
        }
        let stats = [
            ("speed", self.stats.speed),
            ("attack_speed", self.stats.attack_speed),
            ("bullet_range", self.stats.bullet_range),
            ("bullet_speed", self.stats.bullet_speed),
        ];
        for (field, value) in stats {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(&format!("{field} must be finite and non-negative"));
            }
        }
        Ok(())
    }
}

/// Outcome of a health mutation, for the caller to forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthChange {
    /// Damage number to display, present whenever health actually changed.
    pub effect: Option<EffectRequest>,
    /// The mutation moved the tank from alive to dead.
    pub died: bool,
    /// Death generation after the mutation.
    pub generation: u32,
}

/// Stats captured when Boost started, restored when it ends.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BoostRestore {
    attack_speed: f32,
    speed: f32,
    bullet_speed: f32,
}

/// A tank in the arena.
#[derive(Debug, Clone)]
pub struct Tank {
    id: TankId,
    name: String,
    team: Team,
    is_player: bool,
    /// Center.
    pub position: Vec2,
    /// Hull rotation in degrees, in `[0, 360)`.
    pub rotation: f32,
    /// Turret rotation in radians.
    pub head_rotation: f32,
    radius: f32,
    hp: i32,
    stats: TankStats,
    dead: bool,
    generation: u32,
    intent: MoveIntent,
    aim: Option<Vec2>,
    auto_fire: bool,
    pattern: ShotPattern,
    last_shot: Option<SimTime>,
    boost: Option<BoostRestore>,
    disperse: bool,
    damage_numbers: DamageNumbers,
    imagery: TankImagery,
}

impl Tank {
    /// Build a tank at full health.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] when the config fails
    /// [`TankConfig::validate`].
    pub fn new(id: TankId, config: TankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id,
            name: config.name,
            team: config.team,
            is_player: config.is_player,
            position: config.position,
            rotation: normalize_angle(config.rotation),
            head_rotation: config.head_rotation,
            radius: config.radius,
            hp: config.stats.max_hp,
            stats: config.stats,
            dead: false,
            generation: 0,
            intent: MoveIntent::default(),
            aim: None,
            auto_fire: false,
            pattern: ShotPattern::Normal,
            last_shot: None,
            boost: None,
            disperse: false,
            damage_numbers: DamageNumbers::new(),
            imagery: config.imagery,
        })
    }

    /// Identifier.
    #[must_use]
    pub fn id(&self) -> TankId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Side.
    #[must_use]
    pub fn team(&self) -> Team {
        self.team
    }

    /// Whether this is the locally controlled tank.
    #[must_use]
    pub fn is_player(&self) -> bool {
        self.is_player
    }

    /// Collision radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Drawn width and height.
    #[must_use]
    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    /// Collision shape.
    #[must_use]
    pub fn circle(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }

    /// Current health.
    #[must_use]
    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Maximum health.
    #[must_use]
    pub fn max_hp(&self) -> i32 {
        self.stats.max_hp
    }

    /// Current statistics, including any active Boost.
    #[must_use]
    pub fn stats(&self) -> &TankStats {
        &self.stats
    }

    /// Check if the tank is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Check if the tank is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Number of times the tank has died.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Held movement keys.
    #[must_use]
    pub fn intent(&self) -> &MoveIntent {
        &self.intent
    }

    /// Point the turret tracks, if any.
    #[must_use]
    pub fn aim(&self) -> Option<Vec2> {
        self.aim
    }

    /// Whether auto-fire is on.
    #[must_use]
    pub fn auto_fire(&self) -> bool {
        self.auto_fire
    }

    /// Active shot pattern.
    #[must_use]
    pub fn pattern(&self) -> ShotPattern {
        self.pattern
    }

    /// Set the shot pattern directly.
    pub fn set_pattern(&mut self, pattern: ShotPattern) {
        self.pattern = pattern;
    }

    /// When the tank last fired.
    #[must_use]
    pub fn last_shot(&self) -> Option<SimTime> {
        self.last_shot
    }

    /// Floating damage numbers.
    #[must_use]
    pub fn damage_numbers(&self) -> &DamageNumbers {
        &self.damage_numbers
    }

    pub(crate) fn damage_numbers_mut(&mut self) -> &mut DamageNumbers {
        &mut self.damage_numbers
    }

    /// Images.
    #[must_use]
    pub fn imagery(&self) -> &TankImagery {
        &self.imagery
    }

    /// Set the health to `hp`, clamped to `[0, max_hp]`.
    ///
    /// Any non-zero change produces a damage-number request showing
    /// `|delta|` before the floor at zero, so overkill shows the full hit.
    /// Reaching `hp <= 0` while alive kills the tank and bumps the death
    /// generation; a dead tank stays dead until revived.
    pub fn set_health(&mut self, hp: i32) -> HealthChange {
        let hp = hp.min(self.stats.max_hp);
        let delta = hp - self.hp;
        let effect = (delta != 0).then(|| EffectRequest::DamageNumber {
            tank: self.id,
            value: delta.unsigned_abs(),
            tone: if delta > 0 {
                NumberTone::Heal
            } else {
                NumberTone::Damage
            },
            origin: self.position,
            direction: self.damage_numbers.next_direction(),
            font_size: self.diameter() * DAMAGE_FONT_FRACTION,
        });

        self.hp = hp.max(0);

        let died = hp <= 0 && !self.dead;
        if died {
            self.dead = true;
            self.generation += 1;
        }

        HealthChange {
            effect,
            died,
            generation: self.generation,
        }
    }

    /// Lose `amount` health.
    pub fn damage(&mut self, amount: i32) -> HealthChange {
        self.set_health(self.hp.saturating_sub(amount))
    }

    /// Gain `amount` health, capped at the missing health.
    pub fn heal(&mut self, amount: i32) -> HealthChange {
        let missing = self.stats.max_hp - self.hp;
        self.set_health(self.hp + amount.min(missing))
    }

    /// Come back at full health.
    pub fn revive(&mut self) {
        self.dead = false;
        self.hp = self.stats.max_hp;
    }

    /// Record a key press. Dead tanks ignore presses but still record
    /// releases.
    pub fn press(&mut self, key: Key, pressed: bool) {
        if pressed && self.dead {
            return;
        }
        self.intent.set(key, pressed);
    }

    /// Track `point` with the turret.
    pub fn aim_at(&mut self, point: Vec2) {
        self.aim = Some(point);
        self.head_rotation = movement::aim_angle(self.position, point);
    }

    /// Flip auto-fire.
    pub fn toggle_auto_fire(&mut self) {
        self.auto_fire = !self.auto_fire;
    }

    /// Whether a volley may go out at `now`.
    #[must_use]
    pub fn can_fire(&self, now: SimTime) -> bool {
        !self.dead && cooldown_ready(self.last_shot, now, self.stats.attack_speed)
    }

    pub(crate) fn mark_fired(&mut self, now: SimTime) {
        self.last_shot = Some(now);
    }

    /// Advance one tick of movement: steer the hull toward the held
    /// direction, move, and point the turret at the aim.
    pub fn drive(&mut self) {
        if self.dead {
            return;
        }

        let step = movement::displacement(&self.intent, self.stats.speed);
        if step != glam::Vec2::ZERO {
            let heading = movement::heading_degrees(step);
            let rate = self.stats.speed / movement::TURN_DIVISOR;
            self.rotation = movement::turn_toward(self.rotation, heading, rate);
            self.position += step;
        }

        if let Some(aim) = self.aim {
            self.head_rotation = movement::aim_angle(self.position, aim);
        }
    }

    /// Check whether `power_up` is running.
    #[must_use]
    pub fn has_power_up(&self, power_up: PowerUp) -> bool {
        match power_up {
            PowerUp::Boost => self.boost.is_some(),
            PowerUp::Disperse => self.disperse,
        }
    }

    /// Start `power_up`. Returns false, changing nothing, when it is
    /// already running.
    pub fn activate_power_up(&mut self, power_up: PowerUp, boost: &BoostConfig) -> bool {
        if self.has_power_up(power_up) {
            return false;
        }

        match power_up {
            PowerUp::Boost => {
                self.boost = Some(BoostRestore {
                    attack_speed: self.stats.attack_speed,
                    speed: self.stats.speed,
                    bullet_speed: self.stats.bullet_speed,
                });
                self.stats.attack_speed *= boost.attack_speed_multiplier;
                self.stats.speed *= boost.speed_multiplier;
                self.stats.bullet_speed *= boost.bullet_speed_multiplier;
            }
            PowerUp::Disperse => self.disperse = true,
        }
        self.pattern = power_up.pattern();
        true
    }

    /// End `power_up`, restoring what it changed.
    ///
    /// The pattern only goes back to [`ShotPattern::Normal`] if it is still
    /// the one this power-up set. Returns false when it was not running.
    pub fn expire_power_up(&mut self, power_up: PowerUp) -> bool {
        match power_up {
            PowerUp::Boost => {
                let Some(restore) = self.boost.take() else {
                    return false;
                };
                self.stats.attack_speed = restore.attack_speed;
                self.stats.speed = restore.speed;
                self.stats.bullet_speed = restore.bullet_speed;
            }
            PowerUp::Disperse => {
                if !self.disperse {
                    return false;
                }
                self.disperse = false;
            }
        }
        if self.pattern == power_up.pattern() {
            self.pattern = ShotPattern::Normal;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TankConfig {
        TankConfig {
            position: Vec2::new(50.0, 50.0),
            radius: 10.0,
            stats: TankStats {
                max_hp: 1_000,
                atk: 100,
                speed: 150.0,
                attack_speed: 120.0,
                bullet_range: 500.0,
                bullet_speed: 10.0,
                ..TankStats::default()
            },
            ..TankConfig::new("test", Team::Allies)
        }
    }

    #[test]
    fn test_new_starts_full_and_alive() {
        let tank = Tank::new(4, config()).unwrap();
        assert_eq!(tank.id(), 4);
        assert_eq!(tank.hp(), 1_000);
        assert!(tank.is_alive());
        assert_eq!(tank.pattern(), ShotPattern::Normal);
        assert!(tank.last_shot().is_none());
    }

    #[test]
    fn test_rejects_bad_configs() {
        let mut zero_hp = config();
        zero_hp.stats.max_hp = 0;
        assert!(matches!(
            Tank::new(0, zero_hp),
            Err(GameError::InvalidConfig(_))
        ));

        let mut nan_speed = config();
        nan_speed.stats.speed = f32::NAN;
        assert!(Tank::new(0, nan_speed).is_err());

        let mut negative_range = config();
        negative_range.stats.bullet_range = -1.0;
        assert!(Tank::new(0, negative_range).is_err());

        let mut no_radius = config();
        no_radius.radius = 0.0;
        assert!(Tank::new(0, no_radius).is_err());
    }

    #[test]
    fn test_set_health_reports_delta() {
        let mut tank = Tank::new(0, config()).unwrap();
        let change = tank.set_health(900);

        match change.effect {
            Some(EffectRequest::DamageNumber {
                value,
                tone,
                font_size,
                ..
            }) => {
                assert_eq!(value, 100);
                assert_eq!(tone, NumberTone::Damage);
                assert!((font_size - 3.2).abs() < 1e-5);
            }
            other => panic!("unexpected effect {other:?}"),
        }
        assert!(!change.died);

        let change = tank.heal(50);
        assert!(matches!(
            change.effect,
            Some(EffectRequest::DamageNumber {
                value: 50,
                tone: NumberTone::Heal,
                ..
            })
        ));
        assert_eq!(tank.hp(), 950);
    }

    #[test]
    fn test_unchanged_health_makes_no_number() {
        let mut tank = Tank::new(0, config()).unwrap();
        assert!(tank.heal(10).effect.is_none());
        assert!(tank.set_health(1_000).effect.is_none());
        assert!(tank.set_health(5_000).effect.is_none());
        assert_eq!(tank.hp(), 1_000);
    }

    #[test]
    fn test_death_only_on_transition() {
        let mut tank = Tank::new(0, config()).unwrap();
        let change = tank.set_health(0);
        assert!(change.died);
        assert_eq!(change.generation, 1);
        assert!(tank.is_dead());

        let change = tank.damage(10);
        assert!(!change.died);
        assert_eq!(tank.generation(), 1);

        tank.revive();
        assert!(tank.is_alive());
        assert_eq!(tank.hp(), 1_000);
    }

    #[test]
    fn test_overkill_floors_health_at_zero() {
        let mut tank = Tank::new(0, config()).unwrap();
        let change = tank.damage(1_500);

        assert!(change.died);
        assert_eq!(tank.hp(), 0);
        assert!(matches!(
            change.effect,
            Some(EffectRequest::DamageNumber { value: 1_500, .. })
        ));

        // Further hits on the wreck stay at zero
        tank.damage(i32::MAX);
        assert_eq!(tank.hp(), 0);
    }

    #[test]
    fn test_dead_tank_ignores_presses_but_records_releases() {
        let mut tank = Tank::new(0, config()).unwrap();
        tank.press(Key::Up, true);
        tank.set_health(0);

        tank.press(Key::Left, true);
        assert!(!tank.intent().left);

        tank.press(Key::Up, false);
        assert!(!tank.intent().up);
    }

    #[test]
    fn test_drive_moves_and_turns() {
        let mut tank = Tank::new(0, config()).unwrap();
        tank.press(Key::Down, true);
        tank.drive();

        // speed 150 -> 3.6 units per tick, turn rate 10 deg per tick
        assert!((tank.position.y - 53.6).abs() < 1e-4);
        assert!((tank.rotation - 10.0).abs() < 1e-4);

        tank.press(Key::Down, false);
        let before = (tank.position, tank.rotation);
        tank.drive();
        assert_eq!((tank.position, tank.rotation), before);
    }

    #[test]
    fn test_turret_follows_aim() {
        let mut tank = Tank::new(0, config()).unwrap();
        tank.aim_at(Vec2::new(50.0, 150.0));
        assert!((tank.head_rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_boost_round_trip() {
        let mut tank = Tank::new(0, config()).unwrap();
        let boost = BoostConfig::default();

        assert!(tank.activate_power_up(PowerUp::Boost, &boost));
        assert_eq!(tank.stats().attack_speed, 240.0);
        assert_eq!(tank.stats().speed, 225.0);
        assert_eq!(tank.stats().bullet_speed, 15.0);
        assert_eq!(tank.pattern(), ShotPattern::FiveDisperse);

        // Re-trigger is a no-op
        assert!(!tank.activate_power_up(PowerUp::Boost, &boost));
        assert_eq!(tank.stats().attack_speed, 240.0);

        assert!(tank.expire_power_up(PowerUp::Boost));
        assert_eq!(tank.stats().attack_speed, 120.0);
        assert_eq!(tank.stats().speed, 150.0);
        assert_eq!(tank.pattern(), ShotPattern::Normal);
    }

    #[test]
    fn test_expiry_keeps_pattern_set_by_another_power_up() {
        let mut tank = Tank::new(0, config()).unwrap();
        let boost = BoostConfig::default();

        tank.activate_power_up(PowerUp::Disperse, &boost);
        tank.activate_power_up(PowerUp::Boost, &boost);
        assert_eq!(tank.pattern(), ShotPattern::FiveDisperse);

        tank.expire_power_up(PowerUp::Disperse);
        assert_eq!(tank.pattern(), ShotPattern::FiveDisperse);

        tank.expire_power_up(PowerUp::Boost);
        assert_eq!(tank.pattern(), ShotPattern::Normal);
    }

    #[test]
    fn test_team_hostility() {
        assert!(Team::Allies.opposes(Team::Enemies));
        assert!(!Team::Enemies.opposes(Team::Enemies));
    }
}
