//! Projectiles in flight.
//!
//! A projectile is a rotated rectangle moving in a straight line. It
//! remembers who fired it as plain values captured at spawn, so it never
//! holds on to the shooter.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::ImageHandle;
use crate::geometry::RotatedRect;
use crate::tank::{Tank, TankId, Team};

/// Result of advancing a projectile one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    /// The projectile has flown past its range and should be removed.
    pub expired: bool,
}

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Tank that fired it.
    pub owner: TankId,
    /// Shooter's team at spawn.
    pub team: Team,
    /// Spawn point.
    pub origin: Vec2,
    /// Current center.
    pub position: Vec2,
    /// Direction of travel in radians.
    pub angle: f32,
    /// Arena units per tick.
    pub speed: f32,
    /// Maximum travel distance.
    pub range: f32,
    /// Distance flown so far.
    pub traveled: f32,
    /// Footprint length along the direction of travel.
    pub width: f32,
    /// Footprint thickness.
    pub height: f32,
    /// Image to draw.
    pub image: Option<ImageHandle>,
    /// Image for the impact effect when it connects.
    pub impact_image: Option<ImageHandle>,
}

impl Projectile {
    /// Spawn a projectile from `shooter`'s center along `angle`, using the
    /// shooter's current bullet stats and imagery.
    #[must_use]
    pub fn fired_by(shooter: &Tank, angle: f32, size: (f32, f32)) -> Self {
        let stats = shooter.stats();
        let imagery = shooter.imagery();
        Self {
            owner: shooter.id(),
            team: shooter.team(),
            origin: shooter.position,
            position: shooter.position,
            angle,
            speed: stats.bullet_speed,
            range: stats.bullet_range,
            traveled: 0.0,
            width: size.0,
            height: size.1,
            image: imagery.bullet,
            impact_image: imagery.impact,
        }
    }

    /// Move one tick along the heading.
    pub fn advance(&mut self) -> Advance {
        self.position += Vec2::from_angle(self.angle) * self.speed;
        self.traveled += self.speed;
        Advance {
            expired: self.traveled >= self.range + self.width / 2.0,
        }
    }

    /// Collision footprint.
    #[must_use]
    pub fn footprint(&self) -> RotatedRect {
        RotatedRect::new(self.position, self.width, self.height, self.angle)
    }

    /// Leading point where impacts are drawn:
    /// `(x + cos(angle)·width/2, y + sin(angle)·height/2)`.
    #[must_use]
    pub fn contact_point(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.angle.cos() * self.width / 2.0,
            self.position.y + self.angle.sin() * self.height / 2.0,
        )
    }

    /// Check whether the center has left the `size` rectangle anchored at
    /// the origin.
    #[must_use]
    pub fn is_outside(&self, size: Vec2) -> bool {
        self.position.x < 0.0
            || self.position.x > size.x
            || self.position.y < 0.0
            || self.position.y > size.y
    }
}
