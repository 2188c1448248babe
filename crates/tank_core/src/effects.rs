//! Short-lived presentation effects.
//!
//! Two kinds of effect exist:
//! - [`ImpactEffect`]: a flash at the point where a projectile connected.
//!   Holds full opacity until 45% of its life, then fades linearly while
//!   growing to 1.5× size. Owned by the [`EffectScheduler`].
//! - [`DamageNumber`]: a floating health delta above a tank. Drifts along
//!   one of three directions for the first 75% of its life and eases out
//!   over the last 20%. Owned by the tank it belongs to, in
//!   [`DamageNumbers`].
//!
//! Effects never feed back into the simulation. They are created from
//! [`EffectRequest`]s, advanced once per tick, and purged once expired,
//! both inline and by the periodic sweep.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::ImageHandle;
use crate::render::Color;
use crate::schedule::SimTime;
use crate::tank::TankId;

/// Lifetime of a damage number.
pub const DAMAGE_NUMBER_DURATION_MS: u64 = 500;

/// Distance a damage number drifts per tick.
pub const DAMAGE_NUMBER_SPEED: f32 = 2.5;

/// Default lifetime of an impact effect.
pub const IMPACT_DEFAULT_DURATION_MS: u64 = 250;

/// Largest size an impact image is drawn at.
pub const IMPACT_MAX_SIZE: Vec2 = Vec2::new(40.0, 40.0);

/// Radius of the fallback impact marker when no image is available.
pub const IMPACT_FALLBACK_RADIUS: f32 = 10.0;

/// Ease-out curve `t(2 - t)`.
#[inline]
#[must_use]
pub fn ease_out(t: f32) -> f32 {
    t * (2.0 - t)
}

fn progress_at(created: SimTime, duration_ms: u64, now: SimTime) -> f32 {
    if duration_ms == 0 {
        return 1.0;
    }
    (now.millis_since(created) / duration_ms as f64) as f32
}

/// Whether a health change was a heal or damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberTone {
    /// Health went up.
    Heal,
    /// Health went down.
    Damage,
}

impl NumberTone {
    /// Text color for this tone.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            NumberTone::Heal => Color::rgb(0, 180, 0),
            NumberTone::Damage => Color::rgb(240, 0, 0),
        }
    }
}

/// Drift direction of a damage number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Straight up.
    Up,
    /// Diagonally up and to the left.
    UpLeft,
    /// Diagonally up and to the right.
    UpRight,
}

impl Direction {
    /// Per-tick displacement for the given speed.
    #[must_use]
    pub fn step(self, speed: f32) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -speed),
            Direction::UpLeft => Vec2::new(-speed, -speed),
            Direction::UpRight => Vec2::new(speed, -speed),
        }
    }
}

/// Round-robin pool of drift directions, refilled when exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionPool {
    remaining: VecDeque<Direction>,
}

impl DirectionPool {
    const DEFAULT: [Direction; 3] = [Direction::Up, Direction::UpLeft, Direction::UpRight];

    /// Create a full pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining: VecDeque::from(Self::DEFAULT),
        }
    }

    /// Take the next direction, refilling the pool first if it is empty.
    pub fn next_direction(&mut self) -> Direction {
        if self.remaining.is_empty() {
            self.remaining.extend(Self::DEFAULT);
        }
        self.remaining.pop_front().unwrap_or(Direction::Up)
    }
}

impl Default for DirectionPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A request to spawn an effect, produced by state changes and forwarded
/// to the effect owners by the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectRequest {
    /// A floating health delta above a tank.
    DamageNumber {
        /// Tank the number belongs to.
        tank: TankId,
        /// Magnitude of the health change.
        value: u32,
        /// Heal or damage.
        tone: NumberTone,
        /// Starting position (the tank's center).
        origin: Vec2,
        /// Drift direction.
        direction: Direction,
        /// Text size.
        font_size: f32,
    },
    /// An impact flash where a projectile connected.
    Impact {
        /// Contact point.
        point: Vec2,
        /// Image to draw, if the shooter has one.
        image: Option<ImageHandle>,
    },
}

/// Impact flash at a collision point.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactEffect {
    /// Contact point.
    pub point: Vec2,
    /// Creation time.
    pub created: SimTime,
    /// Lifetime in milliseconds.
    pub duration_ms: u64,
    /// Image to draw; a filled circle is drawn when absent.
    pub image: Option<ImageHandle>,
}

impl ImpactEffect {
    /// Create an impact effect at an explicit point.
    #[must_use]
    pub fn new(point: Vec2, created: SimTime, duration_ms: u64, image: Option<ImageHandle>) -> Self {
        Self {
            point,
            created,
            duration_ms,
            image,
        }
    }

    /// Fraction of the lifetime elapsed.
    #[must_use]
    pub fn progress(&self, now: SimTime) -> f32 {
        progress_at(self.created, self.duration_ms, now)
    }

    /// Opacity: 1 until 45% progress, then linear to 0.
    #[must_use]
    pub fn opacity(&self, now: SimTime) -> f32 {
        let progress = self.progress(now);
        if progress <= 0.45 {
            1.0
        } else {
            (1.0 - (progress - 0.45) / 0.55).clamp(0.0, 1.0)
        }
    }

    /// Scale factor: grows linearly from 1 to 1.5 over the lifetime.
    #[must_use]
    pub fn scale(&self, now: SimTime) -> f32 {
        1.0 + 0.5 * self.progress(now).min(1.0)
    }

    /// Expired once the elapsed time exceeds the duration.
    #[must_use]
    pub fn is_expired(&self, now: SimTime) -> bool {
        now.millis_since(self.created) > self.duration_ms as f64
    }

    /// Drawn size of the impact image, fitted inside [`IMPACT_MAX_SIZE`]
    /// with its aspect ratio preserved.
    #[must_use]
    pub fn fitted_size(image: &ImageHandle) -> Vec2 {
        let aspect = image.width / image.height;
        let mut size = Vec2::new(image.width, image.height);
        if size.x > IMPACT_MAX_SIZE.x {
            size.x = IMPACT_MAX_SIZE.x;
            size.y = size.x / aspect;
        }
        if size.y > IMPACT_MAX_SIZE.y {
            size.y = IMPACT_MAX_SIZE.y;
            size.x = size.y * aspect;
        }
        size
    }
}

/// Floating damage or heal number.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageNumber {
    /// Displayed magnitude.
    pub value: u32,
    /// Heal or damage.
    pub tone: NumberTone,
    /// Current position.
    pub position: Vec2,
    /// Drift direction.
    pub direction: Direction,
    /// Text size.
    pub font_size: f32,
    /// Current opacity.
    pub opacity: f32,
    /// Creation time.
    pub created: SimTime,
    /// Lifetime in milliseconds.
    pub duration_ms: u64,
}

impl DamageNumber {
    /// Create a damage number.
    #[must_use]
    pub fn new(
        value: u32,
        tone: NumberTone,
        origin: Vec2,
        direction: Direction,
        font_size: f32,
        created: SimTime,
    ) -> Self {
        Self {
            value,
            tone,
            position: origin,
            direction,
            font_size,
            opacity: 1.0,
            created,
            duration_ms: DAMAGE_NUMBER_DURATION_MS,
        }
    }

    /// Fraction of the lifetime elapsed.
    #[must_use]
    pub fn progress(&self, now: SimTime) -> f32 {
        progress_at(self.created, self.duration_ms, now)
    }

    /// Advance one tick. Returns true once the number has expired.
    pub fn update(&mut self, now: SimTime) -> bool {
        let progress = self.progress(now);

        if progress < 0.75 {
            self.position += self.direction.step(DAMAGE_NUMBER_SPEED);
        }

        if progress >= 0.8 {
            let fade = ((progress - 0.8) / 0.2).min(1.0);
            self.opacity = 1.0 - ease_out(fade);
        }

        self.is_expired(now)
    }

    /// Expired once the elapsed time exceeds the duration.
    #[must_use]
    pub fn is_expired(&self, now: SimTime) -> bool {
        now.millis_since(self.created) > self.duration_ms as f64
    }
}

/// The damage numbers floating above one tank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DamageNumbers {
    active: Vec<DamageNumber>,
    pool: DirectionPool,
}

impl DamageNumbers {
    /// Create an empty set with a full direction pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next drift direction from the pool.
    pub fn next_direction(&mut self) -> Direction {
        self.pool.next_direction()
    }

    /// Add a number.
    pub fn push(&mut self, number: DamageNumber) {
        self.active.push(number);
    }

    /// Advance every number one tick, dropping the expired ones.
    pub fn update(&mut self, now: SimTime) {
        self.active.retain_mut(|number| !number.update(now));
    }

    /// Drop expired numbers without advancing. Returns how many were removed.
    pub fn sweep(&mut self, now: SimTime) -> usize {
        let before = self.active.len();
        self.active.retain(|number| !number.is_expired(now));
        before - self.active.len()
    }

    /// Numbers currently on screen.
    #[must_use]
    pub fn active(&self) -> &[DamageNumber] {
        &self.active
    }

    /// Number of numbers on screen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Check if nothing is on screen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Owner of the arena-wide impact effects.
#[derive(Debug, Clone, Default)]
pub struct EffectScheduler {
    impacts: Vec<ImpactEffect>,
}

impl EffectScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an impact effect.
    pub fn spawn_impact(&mut self, effect: ImpactEffect) {
        self.impacts.push(effect);
    }

    /// Drop expired impacts inline during the tick.
    pub fn update(&mut self, now: SimTime) {
        self.impacts.retain(|effect| !effect.is_expired(now));
    }

    /// Periodic sweep. Returns how many impacts were removed.
    pub fn sweep(&mut self, now: SimTime) -> usize {
        let before = self.impacts.len();
        self.update(now);
        before - self.impacts.len()
    }

    /// Live impact effects.
    #[must_use]
    pub fn impacts(&self) -> &[ImpactEffect] {
        &self.impacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_ms(ms: u64) -> SimTime {
        SimTime::from_millis(ms)
    }

    #[test]
    fn test_direction_pool_round_robin() {
        let mut pool = DirectionPool::new();
        let drawn: Vec<_> = (0..7).map(|_| pool.next_direction()).collect();
        assert_eq!(
            drawn,
            vec![
                Direction::Up,
                Direction::UpLeft,
                Direction::UpRight,
                Direction::Up,
                Direction::UpLeft,
                Direction::UpRight,
                Direction::Up,
            ]
        );
    }

    #[test]
    fn test_impact_opacity_and_scale_curve() {
        let effect = ImpactEffect::new(Vec2::ZERO, at_ms(0), 200, None);

        assert_eq!(effect.opacity(at_ms(0)), 1.0);
        assert_eq!(effect.opacity(at_ms(90)), 1.0); // 45%
        assert!((effect.opacity(at_ms(145)) - 0.5).abs() < 1e-4); // 72.5%
        assert!(effect.opacity(at_ms(200)).abs() < 1e-4);

        assert_eq!(effect.scale(at_ms(0)), 1.0);
        assert!((effect.scale(at_ms(100)) - 1.25).abs() < 1e-4);
        assert!((effect.scale(at_ms(200)) - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_impact_expiry_is_strict() {
        let effect = ImpactEffect::new(Vec2::ZERO, at_ms(100), 200, None);
        assert!(!effect.is_expired(at_ms(300)));
        assert!(effect.is_expired(SimTime::from_micros(300_001)));
    }

    #[test]
    fn test_fitted_size_keeps_aspect() {
        let wide = ImageHandle::new(1, 80.0, 20.0);
        assert_eq!(ImpactEffect::fitted_size(&wide), Vec2::new(40.0, 10.0));

        let tall = ImageHandle::new(2, 10.0, 100.0);
        assert_eq!(ImpactEffect::fitted_size(&tall), Vec2::new(4.0, 40.0));

        let small = ImageHandle::new(3, 16.0, 16.0);
        assert_eq!(ImpactEffect::fitted_size(&small), Vec2::new(16.0, 16.0));
    }

    #[test]
    fn test_damage_number_drifts_then_fades() {
        let mut number = DamageNumber::new(
            42,
            NumberTone::Damage,
            Vec2::new(100.0, 100.0),
            Direction::UpRight,
            24.0,
            at_ms(0),
        );

        assert!(!number.update(at_ms(100)));
        assert_eq!(number.position, Vec2::new(102.5, 97.5));
        assert_eq!(number.opacity, 1.0);

        // Past 75%: no more drift
        assert!(!number.update(at_ms(390)));
        assert_eq!(number.position, Vec2::new(102.5, 97.5));
        assert_eq!(number.opacity, 1.0);

        // 90% progress: fade = 0.5, ease_out = 0.75
        assert!(!number.update(at_ms(450)));
        assert!((number.opacity - 0.25).abs() < 1e-4);

        assert!(number.update(at_ms(501)));
    }

    #[test]
    fn test_damage_numbers_purge_inline_and_by_sweep() {
        let mut numbers = DamageNumbers::new();
        let direction = numbers.next_direction();
        numbers.push(DamageNumber::new(
            5,
            NumberTone::Heal,
            Vec2::ZERO,
            direction,
            10.0,
            at_ms(0),
        ));
        numbers.push(DamageNumber::new(
            7,
            NumberTone::Damage,
            Vec2::ZERO,
            direction,
            10.0,
            at_ms(400),
        ));

        assert_eq!(numbers.sweep(at_ms(600)), 1);
        assert_eq!(numbers.len(), 1);

        numbers.update(at_ms(1_000));
        assert!(numbers.is_empty());
    }

    #[test]
    fn test_scheduler_sweep_counts_removed() {
        let mut scheduler = EffectScheduler::new();
        scheduler.spawn_impact(ImpactEffect::new(Vec2::ZERO, at_ms(0), 200, None));
        scheduler.spawn_impact(ImpactEffect::new(Vec2::ONE, at_ms(1_000), 200, None));

        assert_eq!(scheduler.sweep(at_ms(500)), 1);
        assert_eq!(scheduler.impacts().len(), 1);
        assert_eq!(scheduler.impacts()[0].point, Vec2::ONE);
    }

    #[test]
    fn test_tone_colors() {
        assert_eq!(NumberTone::Heal.color(), Color::rgb(0, 180, 0));
        assert_eq!(NumberTone::Damage.color(), Color::rgb(240, 0, 0));
    }
}
