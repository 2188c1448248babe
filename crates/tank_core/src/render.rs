//! Drawing seam.
//!
//! The core never touches a canvas. Anything drawable implements
//! [`Render`] and paints itself onto a [`RenderSurface`] supplied by the
//! front end (a browser canvas, a GPU layer, or the headless ASCII
//! rasterizer). Rendering only reads state; expiry is decided by the
//! simulation, not by painting.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::ImageHandle;
use crate::effects::{DamageNumber, ImpactEffect, IMPACT_FALLBACK_RADIUS};
use crate::geometry::{to_radians, RotatedRect};
use crate::map::{ArenaMap, Obstacle};
use crate::projectile::Projectile;
use crate::schedule::SimTime;
use crate::tank::{Tank, Team};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Debug outline for projectiles.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Fallback impact marker.
    pub const RED: Self = Self::rgb(255, 0, 0);

    /// Opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Resolve a wall color name. Unknown names fall back to black.
    #[must_use]
    pub fn named(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "white" => Self::WHITE,
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "red" => Self::RED,
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::BLUE,
            "brown" => Self::rgb(139, 69, 19),
            _ => Self::BLACK,
        }
    }

    /// Team tint used when a tank has no hull image.
    #[must_use]
    pub const fn team(team: Team) -> Self {
        match team {
            Team::Allies => Self::rgb(40, 120, 220),
            Team::Enemies => Self::rgb(200, 60, 40),
        }
    }
}

/// Drawing primitives a front end provides.
///
/// Rotations are in radians; sizes are full extents centered on the given
/// point. `alpha` is in `[0, 1]`.
pub trait RenderSurface {
    /// Draw an image centered on `center`.
    fn draw_image(&mut self, image: &ImageHandle, center: Vec2, size: Vec2, rotation: f32, alpha: f32);

    /// Fill a circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color, alpha: f32);

    /// Outline a circle.
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: &RotatedRect, color: Color, alpha: f32);

    /// Outline a rectangle.
    fn stroke_rect(&mut self, rect: &RotatedRect, color: Color);

    /// Draw text centered on `position`.
    fn draw_text(&mut self, text: &str, position: Vec2, size: f32, color: Color, alpha: f32);
}

/// Per-frame drawing context.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    /// Simulation time being drawn.
    pub now: SimTime,
    /// Outline collision shapes.
    pub debug: bool,
}

/// Something that can paint itself.
pub trait Render {
    /// Paint onto `surface`.
    fn render(&self, surface: &mut dyn RenderSurface, frame: &Frame);
}

impl Render for Obstacle {
    fn render(&self, surface: &mut dyn RenderSurface, _frame: &Frame) {
        surface.fill_rect(&self.aabb().to_rotated(), Color::named(&self.color), 1.0);
    }
}

impl Render for ArenaMap {
    fn render(&self, surface: &mut dyn RenderSurface, frame: &Frame) {
        if let Some(background) = &self.background {
            surface.draw_image(background, self.size / 2.0, self.size, 0.0, 1.0);
        }
        for wall in &self.walls {
            wall.render(surface, frame);
        }
    }
}

impl Render for DamageNumber {
    fn render(&self, surface: &mut dyn RenderSurface, _frame: &Frame) {
        surface.draw_text(
            &self.value.to_string(),
            self.position,
            self.font_size,
            self.tone.color(),
            self.opacity,
        );
    }
}

impl Render for Tank {
    /// Dead tanks are not drawn.
    fn render(&self, surface: &mut dyn RenderSurface, frame: &Frame) {
        if self.is_dead() {
            return;
        }

        let size = Vec2::splat(self.diameter());
        let imagery = self.imagery();
        match &imagery.body {
            Some(body) => surface.draw_image(body, self.position, size, to_radians(self.rotation), 1.0),
            None => surface.fill_circle(self.position, self.radius(), Color::team(self.team()), 1.0),
        }
        if let Some(head) = &imagery.head {
            surface.draw_image(head, self.position, size, self.head_rotation, 1.0);
        }

        for number in self.damage_numbers().active() {
            number.render(surface, frame);
        }

        if frame.debug {
            surface.stroke_circle(self.position, self.radius(), Color::WHITE);
        }
    }
}

impl Render for Projectile {
    fn render(&self, surface: &mut dyn RenderSurface, frame: &Frame) {
        let footprint = self.footprint();
        match &self.image {
            Some(image) => surface.draw_image(
                image,
                self.position,
                Vec2::new(self.width, self.height),
                self.angle,
                1.0,
            ),
            None => surface.fill_rect(&footprint, Color::BLACK, 1.0),
        }

        if frame.debug {
            surface.stroke_rect(&footprint, Color::BLUE);
        }
    }
}

impl Render for ImpactEffect {
    fn render(&self, surface: &mut dyn RenderSurface, frame: &Frame) {
        let opacity = self.opacity(frame.now);
        let scale = self.scale(frame.now);
        match &self.image {
            Some(image) => {
                let size = ImpactEffect::fitted_size(image) * scale;
                surface.draw_image(image, self.point, size, 0.0, opacity);
            }
            None => {
                surface.fill_circle(self.point, IMPACT_FALLBACK_RADIUS * scale, Color::RED, opacity);
            }
        }
    }
}
