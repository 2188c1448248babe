//! Collision geometry for the arena.
//!
//! Pure, stateless predicates over circles, rotated rectangles and
//! axis-aligned rectangles. Every collision decision the simulation makes
//! reduces to [`circle_rect_intersect`] (tank vs projectile) and
//! [`rect_rect_intersect`] (projectile vs wall).
//!
//! Conventions:
//! - Screen coordinates: +x right, +y down.
//! - Rotated rectangles are centered on `center` and rotated by `angle`
//!   radians (clockwise on screen, as `atan2` on +y-down coordinates).
//! - Axis-aligned rectangles are anchored at their top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A circle, used as the collision shape of tanks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center point.
    pub center: Vec2,
    /// Radius.
    pub radius: f32,
}

impl Circle {
    /// Create a new circle.
    #[must_use]
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// A rectangle rotated about its center, used as the projectile footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    /// Center point.
    pub center: Vec2,
    /// Extent along the local x axis.
    pub width: f32,
    /// Extent along the local y axis.
    pub height: f32,
    /// Rotation in radians.
    pub angle: f32,
}

impl RotatedRect {
    /// Create a new rotated rectangle.
    #[must_use]
    pub const fn new(center: Vec2, width: f32, height: f32, angle: f32) -> Self {
        Self {
            center,
            width,
            height,
            angle,
        }
    }

    /// Half extents as a vector.
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Transform a world point into this rectangle's unrotated local frame
    /// (origin at the center).
    #[must_use]
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        Vec2::from_angle(-self.angle).rotate(point - self.center)
    }

    /// Check whether a point already in the local frame lies inside
    /// (edges included).
    #[must_use]
    pub fn contains_local_point(&self, local: Vec2) -> bool {
        let half = self.half_extents();
        local.x.abs() <= half.x && local.y.abs() <= half.y
    }

    /// Check whether a world point lies inside the rectangle (edges included).
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.contains_local_point(self.to_local(point))
    }

    /// The four world-space corners.
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        let rotation = Vec2::from_angle(self.angle);
        let half = self.half_extents();
        [
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
        ]
        .map(|offset| self.center + rotation.rotate(offset))
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Aabb {
    /// Create a new axis-aligned rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check whether a point lies inside the rectangle (edges included).
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The same rectangle as an unrotated [`RotatedRect`].
    #[must_use]
    pub fn to_rotated(&self) -> RotatedRect {
        RotatedRect::new(self.center(), self.width, self.height, 0.0)
    }

    /// The four corners, clockwise from the top-left.
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y),
            Vec2::new(self.x + self.width, self.y + self.height),
            Vec2::new(self.x, self.y + self.height),
        ]
    }
}

/// Squared distance from the circle's center to the closest point of the
/// rectangle. Zero when the center is inside.
#[must_use]
pub fn circle_rect_gap_squared(circle: &Circle, rect: &RotatedRect) -> f32 {
    let local = rect.to_local(circle.center);
    let half = rect.half_extents();
    let closest = local.clamp(-half, half);
    local.distance_squared(closest)
}

/// Circle vs rotated rectangle.
///
/// The circle's center is moved into the rectangle's local frame, clamped
/// to the half extents to find the nearest boundary point, and the squared
/// distance is compared against `radius²`.
///
/// The comparison is strict: a circle exactly tangent to the rectangle does
/// not collide.
#[must_use]
pub fn circle_rect_intersect(circle: &Circle, rect: &RotatedRect) -> bool {
    circle_rect_gap_squared(circle, rect) < circle.radius * circle.radius
}

/// Rotated rectangle vs axis-aligned rectangle.
///
/// Two-way corner containment: reports an intersection when any corner of
/// either shape lies inside the other (edges included).
///
/// # Limitations
///
/// This is not a separating-axis test. Overlaps where only edges cross and
/// no corner is contained are missed, e.g. a long thin projectile piercing
/// straight through the middle of a wall.
#[must_use]
pub fn rect_rect_intersect(rotated: &RotatedRect, aabb: &Aabb) -> bool {
    rotated
        .corners()
        .iter()
        .any(|&corner| aabb.contains_point(corner))
        || aabb
            .corners()
            .iter()
            .any(|&corner| rotated.contains_point(corner))
}

/// Degrees to radians.
#[inline]
#[must_use]
pub fn to_radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Radians to degrees.
#[inline]
#[must_use]
pub fn to_degrees(radians: f32) -> f32 {
    radians / std::f32::consts::PI * 180.0
}

/// Normalize an angle in degrees to `[0, 360)`.
#[inline]
#[must_use]
pub fn normalize_angle(degrees: f32) -> f32 {
    // `rem_euclid` can round up to exactly 360.0 for tiny negative inputs
    ((degrees % 360.0) + 360.0) % 360.0
}

/// Wrap an angle difference in degrees into `[-180, 180]`.
#[inline]
#[must_use]
pub fn wrap_degrees(delta: f32) -> f32 {
    let delta = normalize_angle(delta);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_circle_inside_rect_collides() {
        let circle = Circle::new(Vec2::ZERO, 10.0);
        let rect = RotatedRect::new(Vec2::ZERO, 20.0, 10.0, 0.0);
        assert!(circle_rect_intersect(&circle, &rect));
    }

    #[test]
    fn test_distant_rect_misses() {
        let circle = Circle::new(Vec2::ZERO, 10.0);
        let rect = RotatedRect::new(Vec2::new(100.0, 100.0), 20.0, 10.0, 0.0);
        assert!(!circle_rect_intersect(&circle, &rect));
    }

    #[test]
    fn test_tangent_circle_does_not_collide() {
        // Right edge of the rect at x = 10, circle reaches exactly x = 10
        let rect = RotatedRect::new(Vec2::ZERO, 20.0, 10.0, 0.0);
        let circle = Circle::new(Vec2::new(15.0, 0.0), 5.0);
        assert!(!circle_rect_intersect(&circle, &rect));

        let touching = Circle::new(Vec2::new(14.9, 0.0), 5.0);
        assert!(circle_rect_intersect(&touching, &rect));
    }

    #[test]
    fn test_rotation_changes_reach() {
        // A long thin rect pointing along +x misses a circle above its center,
        // but rotated 90 degrees it points straight at it.
        let circle = Circle::new(Vec2::new(0.0, 40.0), 5.0);
        let flat = RotatedRect::new(Vec2::ZERO, 100.0, 4.0, 0.0);
        let upright = RotatedRect::new(Vec2::ZERO, 100.0, 4.0, std::f32::consts::FRAC_PI_2);
        assert!(!circle_rect_intersect(&circle, &flat));
        assert!(circle_rect_intersect(&circle, &upright));
    }

    #[test]
    fn test_corners_of_unrotated_rect() {
        let rect = RotatedRect::new(Vec2::new(10.0, 20.0), 4.0, 2.0, 0.0);
        let corners = rect.corners();
        assert!(corners.contains(&Vec2::new(12.0, 21.0)));
        assert!(corners.contains(&Vec2::new(8.0, 19.0)));
    }

    #[test]
    fn test_rect_rect_corner_inside_wall() {
        let wall = Aabb::new(0.0, 0.0, 100.0, 100.0);
        let projectile = RotatedRect::new(Vec2::new(-5.0, 50.0), 20.0, 6.0, 0.0);
        assert!(rect_rect_intersect(&projectile, &wall));
    }

    #[test]
    fn test_rect_rect_wall_corner_inside_projectile() {
        // Projectile bigger than a tiny wall: only the wall's corners are contained
        let wall = Aabb::new(-1.0, -1.0, 2.0, 2.0);
        let projectile = RotatedRect::new(Vec2::ZERO, 50.0, 50.0, 0.3);
        assert!(rect_rect_intersect(&projectile, &wall));
    }

    #[test]
    fn test_rect_rect_separated() {
        let wall = Aabb::new(500.0, 500.0, 100.0, 300.0);
        let projectile = RotatedRect::new(Vec2::new(200.0, 200.0), 100.0, 33.0, 0.7);
        assert!(!rect_rect_intersect(&projectile, &wall));
    }

    #[test]
    fn test_rect_rect_misses_edge_only_crossing() {
        // A thin projectile crossing a tall wall through its middle: no corner
        // of either shape is inside the other, so the overlap is not reported.
        let wall = Aabb::new(-5.0, -100.0, 10.0, 200.0);
        let projectile = RotatedRect::new(Vec2::ZERO, 60.0, 2.0, 0.0);
        assert!(!rect_rect_intersect(&projectile, &wall));
    }

    #[test]
    fn test_angle_conversions() {
        assert!((to_radians(180.0) - std::f32::consts::PI).abs() < EPSILON);
        assert!((to_degrees(std::f32::consts::FRAC_PI_2) - 90.0).abs() < EPSILON);
        assert!((to_degrees(to_radians(-15.0)) + 15.0).abs() < EPSILON);
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(725.0), 5.0);
        assert!(normalize_angle(-1e-9) < 360.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-45.0), -45.0);
    }
}
