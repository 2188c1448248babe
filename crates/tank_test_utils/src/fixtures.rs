//! Test fixtures and helpers.
//!
//! The standard roster mirrors the stock match: one player tank, two
//! enemy damage sinks and an idle ally on the open field. Enemies and the
//! ally have no attack speed, so they never fire.

use glam::Vec2;
use tank_core::config::SimConfig;
use tank_core::input::{InputEvent, Key, PointerButton};
use tank_core::map::ArenaMap;
use tank_core::simulation::Simulation;
use tank_core::tank::{TankConfig, TankId, TankStats, Team};

/// Radius every stock tank uses.
pub const STOCK_RADIUS: f32 = 75.0;

/// Stats shared by the non-player stock tanks.
#[must_use]
pub fn sink_stats(max_hp: i32) -> TankStats {
    TankStats {
        max_hp,
        atk: 186,
        pen: 10,
        armor: 40,
        speed: 15.0,
        ..TankStats::default()
    }
}

/// The player tank.
#[must_use]
pub fn player_config() -> TankConfig {
    TankConfig {
        is_player: true,
        position: Vec2::new(200.0, 1_000.0),
        radius: STOCK_RADIUS,
        stats: TankStats {
            max_hp: 4_181,
            atk: 286,
            pen: 20,
            armor: 40,
            speed: 170.0,
            attack_speed: 120.0,
            bullet_range: 336.0,
            bullet_speed: 10.0,
        },
        ..TankConfig::new("player", Team::Allies)
    }
}

/// The heavier of the two stock enemies.
#[must_use]
pub fn heavy_enemy_config() -> TankConfig {
    TankConfig {
        position: Vec2::new(1_000.0, 700.0),
        radius: STOCK_RADIUS,
        rotation: 90.0,
        stats: sink_stats(9_533),
        ..TankConfig::new("heavy", Team::Enemies)
    }
}

/// The lighter of the two stock enemies.
#[must_use]
pub fn light_enemy_config() -> TankConfig {
    TankConfig {
        position: Vec2::new(990.0, 900.0),
        radius: STOCK_RADIUS,
        rotation: 40.0,
        stats: sink_stats(5_981),
        ..TankConfig::new("light", Team::Enemies)
    }
}

/// The idle ally.
#[must_use]
pub fn ally_config() -> TankConfig {
    TankConfig {
        position: Vec2::new(300.0, 300.0),
        radius: STOCK_RADIUS,
        rotation: 180.0,
        stats: sink_stats(2_981),
        ..TankConfig::new("ally", Team::Allies)
    }
}

/// Default config with the on-hit heal rolls disabled, so damage totals
/// are exact.
#[must_use]
pub fn no_heal_config() -> SimConfig {
    SimConfig {
        heal_on_hit_chance: 0.0,
        ..SimConfig::default()
    }
}

/// A tank that fires once a second with a long range.
#[must_use]
pub fn gunner_config(name: &str, team: Team, position: Vec2) -> TankConfig {
    TankConfig {
        position,
        radius: 50.0,
        stats: TankStats {
            max_hp: 1_000,
            atk: 100,
            speed: 100.0,
            attack_speed: 60.0,
            bullet_range: 2_000.0,
            bullet_speed: 20.0,
            ..TankStats::default()
        },
        ..TankConfig::new(name, team)
    }
}

/// Ids of the stock roster, in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRoster {
    /// Player tank.
    pub player: TankId,
    /// Heavy enemy.
    pub heavy: TankId,
    /// Light enemy.
    pub light: TankId,
    /// Idle ally.
    pub ally: TankId,
}

/// The stock match on map `"01"`.
///
/// # Panics
///
/// Panics if `config` is invalid.
#[must_use]
pub fn stock_match(config: SimConfig) -> (Simulation, StockRoster) {
    let mut sim = Simulation::new(config, ArenaMap::open_field()).expect("valid config");
    let roster = StockRoster {
        player: sim.spawn_tank(player_config()).expect("stock player"),
        heavy: sim.spawn_tank(heavy_enemy_config()).expect("stock enemy"),
        light: sim.spawn_tank(light_enemy_config()).expect("stock enemy"),
        ally: sim.spawn_tank(ally_config()).expect("stock ally"),
    };
    (sim, roster)
}

/// Two gunners facing each other 400 units apart on an open map.
///
/// # Panics
///
/// Panics if `config` is invalid.
#[must_use]
pub fn duel(config: SimConfig) -> (Simulation, TankId, TankId) {
    let mut sim = Simulation::new(config, ArenaMap::new("open", Vec2::new(2_000.0, 2_000.0)))
        .expect("valid config");
    let left = sim
        .spawn_tank(gunner_config("left", Team::Allies, Vec2::new(600.0, 1_000.0)))
        .expect("gunner");
    let right = sim
        .spawn_tank(gunner_config("right", Team::Enemies, Vec2::new(1_000.0, 1_000.0)))
        .expect("gunner");
    (sim, left, right)
}

/// Point `tank` at `target` and switch auto-fire on.
///
/// # Panics
///
/// Panics if `tank` does not exist.
pub fn auto_fire_at(sim: &mut Simulation, tank: TankId, target: Vec2) {
    sim.handle_input(tank, InputEvent::PointerMove(target))
        .expect("known tank");
    sim.handle_input(tank, InputEvent::PointerDown(PointerButton::Right))
        .expect("known tank");
}

/// The stock match with the player driving right while auto-firing at
/// the heavy enemy.
#[must_use]
pub fn stock_skirmish(seed: u64) -> Simulation {
    let (mut sim, roster) = stock_match(SimConfig {
        seed,
        ..SimConfig::default()
    });
    sim.handle_input(roster.player, InputEvent::KeyDown(Key::Right))
        .expect("known tank");
    auto_fire_at(&mut sim, roster.player, heavy_enemy_config().position);
    sim
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_roster_spawns_in_order() {
        let (sim, roster) = stock_match(SimConfig::default());
        assert_eq!(roster.player, 0);
        assert_eq!(roster.ally, 3);
        assert_eq!(sim.tanks().len(), 4);
        assert!(sim.get_tank(roster.player).unwrap().is_player());
        assert_eq!(sim.get_tank(roster.heavy).unwrap().hp(), 9_533);
    }

    #[test]
    fn test_sinks_never_fire() {
        let (sim, roster) = stock_match(SimConfig::default());
        assert!(!sim.get_tank(roster.light).unwrap().can_fire(sim.now()));
    }
}
