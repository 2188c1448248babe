//! Core simulation loop.
//!
//! The simulation owns every tank, projectile and effect in one arena and
//! advances them at a fixed tick rate. All timed behavior runs through a
//! single [`EventQueue`] keyed by [`SimTime`], so a match is a pure
//! function of its config, map, seed and inputs.
//!
//! # Determinism
//!
//! - Simulation time is an integer microsecond clock
//! - Tanks are processed in id order, projectiles in spawn order
//! - The only randomness (heal-on-hit rolls) comes from a seeded
//!   [`Pcg32`], and every hit consumes its rolls whether or not they apply
//! - Same inputs always produce the same [`Simulation::state_hash`]
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use tank_core::config::SimConfig;
//! use tank_core::input::{InputEvent, Key};
//! use tank_core::map::ArenaMap;
//! use tank_core::simulation::Simulation;
//! use tank_core::tank::{TankConfig, TankStats, Team};
//!
//! let mut sim = Simulation::new(SimConfig::default(), ArenaMap::demo()).unwrap();
//!
//! let player = sim
//!     .spawn_tank(TankConfig {
//!         position: Vec2::new(100.0, 100.0),
//!         stats: TankStats {
//!             speed: 100.0,
//!             ..TankStats::default()
//!         },
//!         ..TankConfig::new("player", Team::Allies)
//!     })
//!     .unwrap();
//!
//! sim.handle_input(player, InputEvent::KeyDown(Key::Right)).unwrap();
//! sim.tick();
//!
//! assert!(sim.get_tank(player).unwrap().position.x > 100.0);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::combat::{missing_health_heal, recoil_damage, HitEvent, PowerUp};
use crate::config::{RecoilRule, SimConfig};
use crate::effects::{DamageNumber, EffectRequest, EffectScheduler, ImpactEffect};
use crate::error::{GameError, Result};
use crate::geometry::{circle_rect_intersect, rect_rect_intersect};
use crate::input::{InputEvent, Key, PointerButton};
use crate::map::ArenaMap;
use crate::movement;
use crate::projectile::Projectile;
use crate::schedule::{EventQueue, ScheduledEvent, SimTime};
use crate::tank::{HealthChange, Tank, TankConfig, TankId};

/// A volley that left a barrel this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volley {
    /// Tank that fired.
    pub tank: TankId,
    /// Projectiles spawned.
    pub projectiles: usize,
}

/// Events generated during a simulation tick.
///
/// Front ends use these for sounds and HUD updates; the headless runner
/// aggregates them into match metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Projectile hits on tanks.
    pub hits: Vec<HitEvent>,
    /// Projectiles stopped by walls.
    pub wall_impacts: usize,
    /// Projectiles that flew past their range.
    pub expired: usize,
    /// Projectiles that left the map.
    pub out_of_bounds: usize,
    /// Tanks that died.
    pub deaths: Vec<TankId>,
    /// Tanks that came back.
    pub revivals: Vec<TankId>,
    /// Auto-fire volleys.
    pub volleys: Vec<Volley>,
    /// Power-up windows that closed.
    pub power_ups_ended: Vec<(TankId, PowerUp)>,
}

impl TickEvents {
    /// Append another tick's events.
    pub fn merge(&mut self, other: TickEvents) {
        self.hits.extend(other.hits);
        self.wall_impacts += other.wall_impacts;
        self.expired += other.expired;
        self.out_of_bounds += other.out_of_bounds;
        self.deaths.extend(other.deaths);
        self.revivals.extend(other.revivals);
        self.volleys.extend(other.volleys);
        self.power_ups_ended.extend(other.power_ups_ended);
    }
}

/// The combat simulation for one arena.
///
/// # System Execution Order
///
/// Each tick runs, in order:
/// 1. Scheduled events due at the current time (regen, sweep, revive,
///    power-up expiry)
/// 2. Auto-fire
/// 3. Projectile flight and collisions
/// 4. Tank movement and turret tracking
/// 5. Effect updates
///
/// and then advances the clock by one tick.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    map: ArenaMap,
    now: SimTime,
    tick: u64,
    tanks: Vec<Tank>,
    projectiles: Vec<Projectile>,
    effects: EffectScheduler,
    events: EventQueue,
    rng: Pcg32,
    pending_deaths: Vec<TankId>,
}

impl Simulation {
    /// Create an empty arena and schedule the periodic regen and sweep.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] when `config` fails
    /// [`SimConfig::validate`] or `map` fails [`ArenaMap::validate`].
    pub fn new(config: SimConfig, map: ArenaMap) -> Result<Self> {
        config.validate()?;
        map.validate()?;

        let mut events = EventQueue::new();
        events.schedule(
            SimTime::ZERO.plus_millis(config.regen_interval_ms),
            ScheduledEvent::Regen,
        );
        events.schedule(
            SimTime::ZERO.plus_millis(config.effect_sweep_interval_ms),
            ScheduledEvent::EffectSweep,
        );

        tracing::debug!(map = %map.name, seed = config.seed, "Simulation created");

        Ok(Self {
            rng: Pcg32::seed_from_u64(config.seed),
            config,
            map,
            now: SimTime::ZERO,
            tick: 0,
            tanks: Vec::new(),
            projectiles: Vec::new(),
            effects: EffectScheduler::new(),
            events,
            pending_deaths: Vec::new(),
        })
    }

    /// Add a tank. Ids are assigned in spawn order starting at 0.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] for an invalid tank config.
    pub fn spawn_tank(&mut self, config: TankConfig) -> Result<TankId> {
        let id = TankId::try_from(self.tanks.len())
            .map_err(|_| GameError::InvalidState("too many tanks".into()))?;
        let tank = Tank::new(id, config)?;
        tracing::debug!(tank = id, name = tank.name(), team = ?tank.team(), "Tank spawned");
        self.tanks.push(tank);
        Ok(id)
    }

    /// Current tick number.
    #[must_use]
    pub fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Settings.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Arena.
    #[must_use]
    pub fn map(&self) -> &ArenaMap {
        &self.map
    }

    /// Every tank, indexed by id.
    #[must_use]
    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    /// Look up a tank.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::TankNotFound`] for an unknown id.
    pub fn get_tank(&self, id: TankId) -> Result<&Tank> {
        self.tanks.get(id as usize).ok_or(GameError::TankNotFound(id))
    }

    fn tank_mut(&mut self, id: TankId) -> Result<&mut Tank> {
        self.tanks
            .get_mut(id as usize)
            .ok_or(GameError::TankNotFound(id))
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Impact effects.
    #[must_use]
    pub fn effects(&self) -> &EffectScheduler {
        &self.effects
    }

    /// Scheduled events.
    #[must_use]
    pub fn scheduled(&self) -> &EventQueue {
        &self.events
    }

    /// Apply one input event to a tank.
    ///
    /// Dead tanks ignore key presses, clicks and power-up keys but still
    /// record key releases and pointer movement.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::TankNotFound`] for an unknown id.
    pub fn handle_input(&mut self, id: TankId, event: InputEvent) -> Result<()> {
        let alive = self.get_tank(id)?.is_alive();
        match event {
            InputEvent::KeyDown(key) => {
                if !alive {
                    return Ok(());
                }
                self.tank_mut(id)?.press(key, true);
                match key {
                    Key::Disperse => {
                        self.trigger_power_up(id, PowerUp::Disperse)?;
                    }
                    Key::Boost => {
                        self.trigger_power_up(id, PowerUp::Boost)?;
                    }
                    _ => {}
                }
            }
            InputEvent::KeyUp(key) => self.tank_mut(id)?.press(key, false),
            InputEvent::PointerMove(point) => self.tank_mut(id)?.aim_at(point),
            InputEvent::PointerDown(PointerButton::Right) => {
                let tank = self.tank_mut(id)?;
                tank.toggle_auto_fire();
                tracing::debug!(tank = id, auto_fire = tank.auto_fire(), "Auto-fire toggled");
            }
            InputEvent::PointerDown(_) => {}
            InputEvent::Click => {
                if alive {
                    self.fire(id)?;
                }
            }
        }
        Ok(())
    }

    /// Fire one volley at the tank's aim point, or along its turret when it
    /// has none. Returns the number of projectiles spawned, zero while the
    /// cooldown runs.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::TankNotFound`] for an unknown id and
    /// [`GameError::InvalidState`] when the tank is dead.
    pub fn fire(&mut self, id: TankId) -> Result<usize> {
        let tank = self.get_tank(id)?;
        if tank.is_dead() {
            return Err(GameError::InvalidState(format!("tank {id} is dead")));
        }
        if !tank.can_fire(self.now) {
            return Ok(0);
        }
        Ok(self.spawn_volley(id))
    }

    fn spawn_volley(&mut self, id: TankId) -> usize {
        let now = self.now;
        let size = self.config.projectile_size;
        let Some(tank) = self.tanks.get_mut(id as usize) else {
            return 0;
        };

        let aim = tank
            .aim()
            .map_or(tank.head_rotation, |point| movement::aim_angle(tank.position, point));
        let shooter: &Tank = tank;
        let spawned: Vec<Projectile> = shooter
            .pattern()
            .volley_angles(aim)
            .into_iter()
            .map(|angle| Projectile::fired_by(shooter, angle, size))
            .collect();
        tank.mark_fired(now);

        let count = spawned.len();
        tracing::debug!(tank = id, projectiles = count, pattern = ?tank.pattern(), "Volley fired");
        self.projectiles.extend(spawned);
        count
    }

    /// Start a power-up window. Returns false when it is already running.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::TankNotFound`] for an unknown id and
    /// [`GameError::InvalidState`] when the tank is dead.
    pub fn trigger_power_up(&mut self, id: TankId, power_up: PowerUp) -> Result<bool> {
        let boost = self.config.boost;
        let duration_ms = match power_up {
            PowerUp::Boost => boost.duration_ms,
            PowerUp::Disperse => self.config.disperse_duration_ms,
        };

        let tank = self.tank_mut(id)?;
        if tank.is_dead() {
            return Err(GameError::InvalidState(format!("tank {id} is dead")));
        }
        if !tank.activate_power_up(power_up, &boost) {
            return Ok(false);
        }

        let until = self.now.plus_millis(duration_ms);
        self.events
            .schedule(until, ScheduledEvent::PowerUpExpired { tank: id, power_up });
        tracing::debug!(tank = id, ?power_up, until_ms = until.as_millis_f64(), "Power-up started");
        Ok(true)
    }

    /// Set a tank's health, forwarding the damage number and scheduling a
    /// revive if it dies.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::TankNotFound`] for an unknown id.
    pub fn set_health(&mut self, id: TankId, hp: i32) -> Result<()> {
        let change = self.tank_mut(id)?.set_health(hp);
        self.forward(id, change);
        Ok(())
    }

    /// Revive a tank immediately at full health. Any revive already
    /// scheduled for its current death becomes a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::TankNotFound`] for an unknown id.
    pub fn revive(&mut self, id: TankId) -> Result<()> {
        self.tank_mut(id)?.revive();
        tracing::debug!(tank = id, "Tank revived manually");
        Ok(())
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) -> TickEvents {
        let mut events = TickEvents::default();

        // 1. Timers
        self.run_scheduled_events(&mut events);

        // 2. Auto-fire
        self.run_auto_fire(&mut events);

        // 3. Projectiles
        self.run_projectiles(&mut events);

        // 4. Movement
        for tank in &mut self.tanks {
            tank.drive();
        }

        // 5. Effects
        self.effects.update(self.now);
        for tank in &mut self.tanks {
            tank.damage_numbers_mut().update(self.now);
        }

        events.deaths.append(&mut self.pending_deaths);

        #[cfg(feature = "debug-validation")]
        self.validate_invariants();

        self.tick += 1;
        self.now = self.now.plus_micros(self.config.tick_micros());

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    /// Run ticks until at least `millis` of simulation time have passed.
    pub fn run_for_millis(&mut self, millis: u64) -> TickEvents {
        let until = self.now.plus_millis(millis);
        let mut events = TickEvents::default();
        while self.now < until {
            events.merge(self.tick());
        }
        events
    }

    fn run_scheduled_events(&mut self, events: &mut TickEvents) {
        while let Some((at, event)) = self.events.pop_due(self.now) {
            match event {
                ScheduledEvent::Regen => {
                    self.regenerate();
                    self.events.schedule(
                        at.plus_millis(self.config.regen_interval_ms),
                        ScheduledEvent::Regen,
                    );
                }
                ScheduledEvent::EffectSweep => {
                    let mut removed = self.effects.sweep(self.now);
                    for tank in &mut self.tanks {
                        removed += tank.damage_numbers_mut().sweep(self.now);
                    }
                    tracing::debug!(removed, "Effect sweep");
                    self.events.schedule(
                        at.plus_millis(self.config.effect_sweep_interval_ms),
                        ScheduledEvent::EffectSweep,
                    );
                }
                ScheduledEvent::Revive { tank, generation } => {
                    let Some(target) = self.tanks.get_mut(tank as usize) else {
                        continue;
                    };
                    if target.is_dead() && target.generation() == generation {
                        target.revive();
                        events.revivals.push(tank);
                        tracing::debug!(tank, "Tank revived");
                    } else {
                        tracing::debug!(tank, generation, "Stale revive ignored");
                    }
                }
                ScheduledEvent::PowerUpExpired { tank, power_up } => {
                    let Some(target) = self.tanks.get_mut(tank as usize) else {
                        continue;
                    };
                    if target.expire_power_up(power_up) {
                        events.power_ups_ended.push((tank, power_up));
                        tracing::debug!(tank, ?power_up, pattern = ?target.pattern(), "Power-up ended");
                    }
                }
            }
        }
    }

    fn regenerate(&mut self) {
        let fraction = self.config.regen_fraction;
        for id in 0..self.tanks.len() {
            let tank = &mut self.tanks[id];
            if tank.is_dead() {
                continue;
            }
            let amount = missing_health_heal(tank.hp(), tank.max_hp(), fraction);
            if amount > 0 {
                let change = tank.heal(amount);
                self.forward(id as TankId, change);
            }
        }
    }

    fn run_auto_fire(&mut self, events: &mut TickEvents) {
        for id in 0..self.tanks.len() {
            let tank = &self.tanks[id];
            if !tank.auto_fire() || tank.aim().is_none() || !tank.can_fire(self.now) {
                continue;
            }
            let projectiles = self.spawn_volley(id as TankId);
            events.volleys.push(Volley {
                tank: id as TankId,
                projectiles,
            });
        }
    }

    fn run_projectiles(&mut self, events: &mut TickEvents) {
        let in_flight = std::mem::take(&mut self.projectiles);
        let mut surviving = Vec::with_capacity(in_flight.len());

        for mut projectile in in_flight {
            if projectile.advance().expired {
                events.expired += 1;
                continue;
            }

            let footprint = projectile.footprint();
            let mut hit_any = false;
            for target in 0..self.tanks.len() {
                let tank = &self.tanks[target];
                if tank.is_dead()
                    || !projectile.team.opposes(tank.team())
                    || !circle_rect_intersect(&tank.circle(), &footprint)
                {
                    continue;
                }

                hit_any = true;
                self.apply_effect(EffectRequest::Impact {
                    point: projectile.contact_point(),
                    image: projectile.impact_image,
                });
                let hit = self.resolve_hit(&projectile, target as TankId);
                tracing::debug!(
                    attacker = hit.attacker,
                    target = hit.target,
                    damage = hit.damage,
                    recoil = hit.recoil,
                    "Projectile hit"
                );
                events.hits.push(hit);

                if !self.config.multi_hit {
                    break;
                }
            }
            if hit_any {
                continue;
            }

            if self
                .map
                .walls
                .iter()
                .any(|wall| rect_rect_intersect(&footprint, &wall.aabb()))
            {
                self.apply_effect(EffectRequest::Impact {
                    point: projectile.contact_point(),
                    image: projectile.impact_image,
                });
                events.wall_impacts += 1;
                tracing::debug!(owner = projectile.owner, "Projectile hit a wall");
                continue;
            }

            if projectile.is_outside(self.map.size) {
                events.out_of_bounds += 1;
                tracing::debug!(owner = projectile.owner, "Projectile left the map");
                continue;
            }

            surviving.push(projectile);
        }

        self.projectiles = surviving;
    }

    /// Apply one projectile hit: damage the target, roll its heal, then
    /// charge the attacker recoil and roll its heal.
    fn resolve_hit(&mut self, projectile: &Projectile, target: TankId) -> HitEvent {
        let attacker = projectile.owner;
        let atk = self
            .tanks
            .get(attacker as usize)
            .map_or(0, |tank| tank.stats().atk);
        let damage = i32::try_from(atk).unwrap_or(i32::MAX);

        let change = self.tanks[target as usize].damage(damage);
        self.forward(target, change);
        let target_healed = self.roll_heal(target);

        let mut recoil = 0;
        let mut attacker_healed = false;
        let pays_recoil = self.tanks.get(attacker as usize).is_some_and(|tank| {
            tank.is_alive()
                && match self.config.recoil_rule {
                    RecoilRule::Symmetric => true,
                    RecoilRule::PlayerOnly => tank.is_player(),
                }
        });
        if pays_recoil {
            recoil = recoil_damage(atk, self.config.recoil_fraction);
            let change = self.tanks[attacker as usize].damage(recoil);
            self.forward(attacker, change);
            attacker_healed = self.roll_heal(attacker);
        }

        HitEvent {
            attacker,
            target,
            damage,
            recoil,
            target_healed,
            attacker_healed,
        }
    }

    /// Roll the on-hit heal for one side. The roll is always consumed; the
    /// heal only lands on a live tank.
    fn roll_heal(&mut self, id: TankId) -> bool {
        let rolled = self.rng.random_bool(self.config.heal_on_hit_chance);
        let fraction = self.config.heal_on_hit_fraction;
        let Some(tank) = self.tanks.get_mut(id as usize) else {
            return false;
        };
        if !rolled || tank.is_dead() {
            return false;
        }
        let amount = missing_health_heal(tank.hp(), tank.max_hp(), fraction);
        let change = tank.heal(amount);
        self.forward(id, change);
        true
    }

    /// Hand a health change's side effects to their owners.
    fn forward(&mut self, id: TankId, change: HealthChange) {
        if let Some(request) = change.effect {
            self.apply_effect(request);
        }
        if change.died {
            let at = self.now.plus_millis(self.config.revive_delay_ms);
            self.events.schedule(
                at,
                ScheduledEvent::Revive {
                    tank: id,
                    generation: change.generation,
                },
            );
            self.pending_deaths.push(id);
            tracing::debug!(tank = id, revive_at_ms = at.as_millis_f64(), "Tank destroyed");
        }
    }

    fn apply_effect(&mut self, request: EffectRequest) {
        let now = self.now;
        match request {
            EffectRequest::DamageNumber {
                tank,
                value,
                tone,
                origin,
                direction,
                font_size,
            } => {
                if let Some(tank) = self.tanks.get_mut(tank as usize) {
                    tank.damage_numbers_mut().push(DamageNumber::new(
                        value, tone, origin, direction, font_size, now,
                    ));
                }
            }
            EffectRequest::Impact { point, image } => {
                self.effects.spawn_impact(ImpactEffect::new(
                    point,
                    now,
                    self.config.impact_duration_ms,
                    image,
                ));
            }
        }
    }

    #[cfg(feature = "debug-validation")]
    fn validate_invariants(&self) {
        for tank in &self.tanks {
            assert!(
                tank.hp() <= tank.max_hp(),
                "tank {} above max health: {} > {}",
                tank.id(),
                tank.hp(),
                tank.max_hp()
            );
            assert!(
                tank.hp() >= 0,
                "tank {} below zero health: {}",
                tank.id(),
                tank.hp()
            );
            assert!(
                tank.is_dead() || tank.hp() > 0,
                "tank {} alive with {} health",
                tank.id(),
                tank.hp()
            );
        }
        for projectile in &self.projectiles {
            assert!(
                projectile.traveled < projectile.range + projectile.width / 2.0,
                "projectile from tank {} kept past its range",
                projectile.owner
            );
        }
    }

    /// Compute a hash of the simulation state for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.now.hash(&mut hasher);

        self.tanks.len().hash(&mut hasher);
        for tank in &self.tanks {
            tank.id().hash(&mut hasher);
            tank.position.x.to_bits().hash(&mut hasher);
            tank.position.y.to_bits().hash(&mut hasher);
            tank.rotation.to_bits().hash(&mut hasher);
            tank.head_rotation.to_bits().hash(&mut hasher);
            tank.hp().hash(&mut hasher);
            tank.is_dead().hash(&mut hasher);
            tank.generation().hash(&mut hasher);
            tank.pattern().hash(&mut hasher);
            tank.last_shot().hash(&mut hasher);
        }

        self.projectiles.len().hash(&mut hasher);
        for projectile in &self.projectiles {
            projectile.owner.hash(&mut hasher);
            projectile.position.x.to_bits().hash(&mut hasher);
            projectile.position.y.to_bits().hash(&mut hasher);
            projectile.traveled.to_bits().hash(&mut hasher);
        }

        self.effects.impacts().len().hash(&mut hasher);
        self.events.len().hash(&mut hasher);

        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::combat::ShotPattern;
    use crate::tank::{TankStats, Team};

    fn quiet_config() -> SimConfig {
        SimConfig {
            heal_on_hit_chance: 0.0,
            ..SimConfig::default()
        }
    }

    fn open_map() -> ArenaMap {
        ArenaMap::new("open", Vec2::new(2_000.0, 2_000.0))
    }

    fn gunner(position: Vec2, team: Team) -> TankConfig {
        TankConfig {
            position,
            radius: 50.0,
            stats: TankStats {
                max_hp: 1_000,
                atk: 100,
                speed: 100.0,
                attack_speed: 60.0,
                bullet_range: 1_000.0,
                bullet_speed: 20.0,
                ..TankStats::default()
            },
            ..TankConfig::new("gunner", team)
        }
    }

    #[test]
    fn test_simulation_new() {
        let sim = Simulation::new(SimConfig::default(), open_map()).unwrap();
        assert_eq!(sim.get_tick(), 0);
        assert_eq!(sim.now(), SimTime::ZERO);
        assert!(sim.tanks().is_empty());
        assert_eq!(sim.scheduled().len(), 2);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimConfig {
            tick_rate_hz: 0,
            ..SimConfig::default()
        };
        assert!(Simulation::new(config, open_map()).is_err());
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut sim = Simulation::new(SimConfig::default(), open_map()).unwrap();
        sim.tick();
        sim.tick();
        assert_eq!(sim.get_tick(), 2);
        assert_eq!(sim.now(), SimTime::from_micros(31_250));
    }

    #[test]
    fn test_unknown_tank() {
        let mut sim = Simulation::new(SimConfig::default(), open_map()).unwrap();
        assert!(matches!(sim.get_tank(3), Err(GameError::TankNotFound(3))));
        assert!(sim.handle_input(3, InputEvent::Click).is_err());
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut sim = Simulation::new(quiet_config(), open_map()).unwrap();
        let id = sim
            .spawn_tank(gunner(Vec2::new(100.0, 100.0), Team::Allies))
            .unwrap();

        assert_eq!(sim.fire(id).unwrap(), 1);
        assert_eq!(sim.fire(id).unwrap(), 0);

        // 60 per minute -> 1000 ms
        sim.run_for_millis(980);
        assert_eq!(sim.fire(id).unwrap(), 0);
        sim.run_for_millis(20);
        assert_eq!(sim.fire(id).unwrap(), 1);
    }

    #[test]
    fn test_disperse_key_spawns_three() {
        let mut sim = Simulation::new(quiet_config(), open_map()).unwrap();
        let id = sim
            .spawn_tank(gunner(Vec2::new(100.0, 100.0), Team::Allies))
            .unwrap();

        sim.handle_input(id, InputEvent::KeyDown(Key::Disperse)).unwrap();
        assert_eq!(sim.get_tank(id).unwrap().pattern(), ShotPattern::Disperse);
        sim.handle_input(id, InputEvent::PointerMove(Vec2::new(500.0, 100.0)))
            .unwrap();
        sim.handle_input(id, InputEvent::Click).unwrap();
        assert_eq!(sim.projectiles().len(), 3);
    }

    #[test]
    fn test_hit_damages_both_sides() {
        let mut sim = Simulation::new(quiet_config(), open_map()).unwrap();
        let shooter = sim
            .spawn_tank(gunner(Vec2::new(100.0, 500.0), Team::Allies))
            .unwrap();
        let target = sim
            .spawn_tank(gunner(Vec2::new(300.0, 500.0), Team::Enemies))
            .unwrap();

        sim.handle_input(shooter, InputEvent::PointerMove(Vec2::new(300.0, 500.0)))
            .unwrap();
        sim.fire(shooter).unwrap();

        let mut events = TickEvents::default();
        for _ in 0..10 {
            events.merge(sim.tick());
        }

        assert_eq!(events.hits.len(), 1);
        assert_eq!(sim.get_tank(target).unwrap().hp(), 900);
        assert_eq!(sim.get_tank(shooter).unwrap().hp(), 985);
        assert!(sim.projectiles().is_empty());
        assert_eq!(sim.effects().impacts().len(), 1);
        assert_eq!(sim.get_tank(target).unwrap().damage_numbers().len(), 1);
    }

    #[test]
    fn test_allies_are_not_targets() {
        let mut sim = Simulation::new(quiet_config(), open_map()).unwrap();
        let shooter = sim
            .spawn_tank(gunner(Vec2::new(100.0, 500.0), Team::Allies))
            .unwrap();
        let friend = sim
            .spawn_tank(gunner(Vec2::new(300.0, 500.0), Team::Allies))
            .unwrap();

        sim.handle_input(shooter, InputEvent::PointerMove(Vec2::new(300.0, 500.0)))
            .unwrap();
        sim.fire(shooter).unwrap();
        let events = sim.run_for_millis(500);

        assert!(events.hits.is_empty());
        assert_eq!(sim.get_tank(friend).unwrap().hp(), 1_000);
    }

    #[test]
    fn test_wall_stops_projectile() {
        let mut map = open_map();
        map.walls.push(crate::map::Obstacle::new(250.0, 400.0, 40.0, 200.0));
        let mut sim = Simulation::new(quiet_config(), map).unwrap();
        let shooter = sim
            .spawn_tank(gunner(Vec2::new(100.0, 500.0), Team::Allies))
            .unwrap();

        sim.handle_input(shooter, InputEvent::PointerMove(Vec2::new(900.0, 500.0)))
            .unwrap();
        sim.fire(shooter).unwrap();
        let events = sim.run_for_millis(500);

        assert_eq!(events.wall_impacts, 1);
        assert!(sim.projectiles().is_empty());
    }

    #[test]
    fn test_death_and_revive() {
        let mut sim = Simulation::new(SimConfig::default(), open_map()).unwrap();
        let id = sim
            .spawn_tank(gunner(Vec2::new(100.0, 100.0), Team::Enemies))
            .unwrap();

        sim.set_health(id, 0).unwrap();
        assert!(sim.get_tank(id).unwrap().is_dead());

        let events = sim.run_for_millis(2_990);
        assert!(events.revivals.is_empty());
        assert_eq!(events.deaths, vec![id]);

        let events = sim.run_for_millis(20);
        assert_eq!(events.revivals, vec![id]);
        let tank = sim.get_tank(id).unwrap();
        assert!(tank.is_alive());
        assert_eq!(tank.hp(), 1_000);
    }

    #[test]
    fn test_dead_tank_cannot_fire() {
        let mut sim = Simulation::new(quiet_config(), open_map()).unwrap();
        let id = sim
            .spawn_tank(gunner(Vec2::new(100.0, 100.0), Team::Allies))
            .unwrap();
        sim.set_health(id, -5).unwrap();

        assert!(matches!(sim.fire(id), Err(GameError::InvalidState(_))));
        sim.handle_input(id, InputEvent::Click).unwrap();
        assert!(sim.projectiles().is_empty());
    }

    #[test]
    fn test_auto_fire_toggle() {
        let mut sim = Simulation::new(quiet_config(), open_map()).unwrap();
        let id = sim
            .spawn_tank(gunner(Vec2::new(1_000.0, 1_000.0), Team::Allies))
            .unwrap();
        sim.handle_input(id, InputEvent::PointerMove(Vec2::new(1_000.0, 0.0)))
            .unwrap();
        sim.handle_input(id, InputEvent::PointerDown(PointerButton::Right))
            .unwrap();

        let events = sim.run_for_millis(2_100);
        // t = 0, 1000, 2000
        assert_eq!(events.volleys.len(), 3);

        sim.handle_input(id, InputEvent::PointerDown(PointerButton::Right))
            .unwrap();
        let events = sim.run_for_millis(2_000);
        assert!(events.volleys.is_empty());
    }

    #[test]
    fn test_same_seed_same_hash() {
        let run = || {
            let mut sim = Simulation::new(SimConfig::default(), open_map()).unwrap();
            let a = sim
                .spawn_tank(gunner(Vec2::new(100.0, 500.0), Team::Allies))
                .unwrap();
            sim.spawn_tank(gunner(Vec2::new(400.0, 500.0), Team::Enemies))
                .unwrap();
            sim.handle_input(a, InputEvent::PointerMove(Vec2::new(400.0, 500.0)))
                .unwrap();
            sim.handle_input(a, InputEvent::PointerDown(PointerButton::Right))
                .unwrap();
            sim.run_for_millis(5_000);
            sim.state_hash()
        };
        assert_eq!(run(), run());
    }
}
