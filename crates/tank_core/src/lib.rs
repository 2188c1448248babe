//! # Tank Core
//!
//! Deterministic combat simulation for a top-down tank arena.
//!
//! This crate contains **only** simulation logic:
//! - No rendering (drawing goes through the [`render::RenderSurface`] seam)
//! - No IO beyond loading RON maps and configs
//! - No system randomness (heal rolls use a seeded PCG)
//! - No wall-clock time (every timer runs on [`schedule::SimTime`])
//!
//! This separation enables:
//! - Headless match runs and batch testing
//! - Replaying a match from its seed and inputs
//! - Determinism testing via [`simulation::Simulation::state_hash`]
//!
//! ## Crate Structure
//!
//! - [`geometry`] - Collision predicates and angle helpers
//! - [`tank`], [`projectile`], [`map`] - Arena entities
//! - [`movement`] - Per-tick steering
//! - [`combat`] - Cooldowns, shot patterns, power-ups, damage arithmetic
//! - [`effects`] - Impact flashes and floating damage numbers
//! - [`schedule`] - Simulation clock and timed events
//! - [`simulation`] - Core simulation loop
//! - [`input`], [`assets`], [`render`] - Seams to the front end

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod assets;
pub mod combat;
pub mod config;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod input;
pub mod map;
pub mod movement;
pub mod projectile;
pub mod render;
pub mod schedule;
pub mod simulation;
pub mod tank;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::assets::{AssetProvider, AssetTable, ImageHandle, TankImagery};
    pub use crate::combat::{HitEvent, PowerUp, ShotPattern};
    pub use crate::config::{BoostConfig, RecoilRule, SimConfig};
    pub use crate::effects::{DamageNumber, EffectRequest, EffectScheduler, ImpactEffect};
    pub use crate::error::{GameError, Result};
    pub use crate::geometry::{Aabb, Circle, RotatedRect};
    pub use crate::input::{InputEvent, Key, PointerButton};
    pub use crate::map::{ArenaMap, Obstacle};
    pub use crate::projectile::Projectile;
    pub use crate::render::{Color, Frame, Render, RenderSurface};
    pub use crate::schedule::SimTime;
    pub use crate::simulation::{Simulation, TickEvents};
    pub use crate::tank::{Tank, TankConfig, TankId, TankStats, Team};
}
