//! Arena maps.
//!
//! A map is a size and a list of static walls. Maps are plain data and can
//! be loaded from RON:
//!
//! ```ron
//! (
//!     name: "box",
//!     size: (800.0, 600.0),
//!     walls: [
//!         (x: 100.0, y: 100.0, width: 50.0, height: 200.0),
//!         (x: 400.0, y: 300.0, width: 200.0, height: 40.0, color: "gray"),
//!     ],
//! )
//! ```

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::ImageHandle;
use crate::error::{GameError, Result};
use crate::geometry::Aabb;

fn default_color() -> String {
    "black".to_string()
}

/// A static wall: an axis-aligned rectangle anchored at its top-left
/// corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
    /// Fill color name.
    #[serde(default = "default_color")]
    pub color: String,
}

impl Obstacle {
    /// Create a black wall.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color: default_color(),
        }
    }

    /// Collision rectangle.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }
}

/// Playing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaMap {
    /// Map name.
    pub name: String,
    /// Width and height. The playable area spans `(0, 0)` to `size`.
    pub size: Vec2,
    /// Walls.
    #[serde(default)]
    pub walls: Vec<Obstacle>,
    /// Background image, resolved by the caller.
    #[serde(skip)]
    pub background: Option<ImageHandle>,
}

impl ArenaMap {
    /// Create an empty map.
    #[must_use]
    pub fn new(name: impl Into<String>, size: Vec2) -> Self {
        Self {
            name: name.into(),
            size,
            walls: Vec::new(),
            background: None,
        }
    }

    /// 2000×2000 with four walls.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            walls: vec![
                Obstacle::new(500.0, 500.0, 100.0, 300.0),
                Obstacle::new(800.0, 200.0, 200.0, 100.0),
                Obstacle::new(1000.0, 700.0, 300.0, 100.0),
                Obstacle::new(200.0, 800.0, 100.0, 400.0),
            ],
            ..Self::new("demo", Vec2::new(2000.0, 2000.0))
        }
    }

    /// The open field: a 2560×1940 backdrop scaled down by 1.2, no walls.
    #[must_use]
    pub fn open_field() -> Self {
        Self::new("01", Vec2::new(2560.0 / 1.2, 1940.0 / 1.2))
    }

    /// Look up a built-in map.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "demo" | "Demo map" => Some(Self::demo()),
            "01" => Some(Self::open_field()),
            _ => None,
        }
    }

    /// Names accepted by [`ArenaMap::by_name`].
    pub const BUILT_IN: [&'static str; 2] = ["demo", "01"];

    /// Load a map from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents, &path.display().to_string())
    }

    /// Parse a map from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        Self::parse(ron, "<inline>")
    }

    fn parse(ron: &str, origin: &str) -> Result<Self> {
        let map: Self = ron::from_str(ron).map_err(|e| GameError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        map.validate().map_err(|e| GameError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        Ok(map)
    }

    /// Reject a non-positive size or a wall with a negative extent.
    pub fn validate(&self) -> Result<()> {
        if !(self.size.is_finite() && self.size.x > 0.0 && self.size.y > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "map '{}' must have a positive size",
                self.name
            )));
        }
        for (index, wall) in self.walls.iter().enumerate() {
            if !(wall.width >= 0.0 && wall.height >= 0.0) {
                return Err(GameError::InvalidConfig(format!(
                    "wall {index} has a negative extent"
                )));
            }
        }
        Ok(())
    }

    /// Check whether `point` lies inside the playable area (edges included).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.size.x && point.y >= 0.0 && point.y <= self.size.y
    }
}

impl Default for ArenaMap {
    fn default() -> Self {
        Self::demo()
    }
}
