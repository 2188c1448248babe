//! Match metrics collection.
//!
//! The collector folds each tick's [`TickEvents`] into per-tank counters
//! and a timeline of notable events. The finished [`MatchMetrics`] is
//! plain serde data, written out as JSON by the CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tank_core::combat::{HitEvent, PowerUp};
use tank_core::simulation::{Simulation, TickEvents};
use tank_core::tank::{Tank, TankId, Team};

/// Complete metrics for a single match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Heal-roll seed used.
    pub seed: u64,
    /// Ticks simulated.
    pub duration_ticks: u64,
    /// Simulation time reached, in milliseconds.
    pub duration_ms: f64,
    /// Per-tank metrics, indexed by tank id.
    pub tanks: Vec<TankMetrics>,
    /// Projectiles stopped by walls.
    pub wall_impacts: u64,
    /// Projectiles that ran out of range.
    pub expired: u64,
    /// Projectiles that left the arena.
    pub out_of_bounds: u64,
    /// Timed events log.
    pub events: Vec<TimedEvent>,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl MatchMetrics {
    /// Create an empty metrics record.
    #[must_use]
    pub fn new(scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Metrics for one tank.
    #[must_use]
    pub fn tank(&self, id: TankId) -> Option<&TankMetrics> {
        self.tanks.get(id as usize)
    }

    /// Total damage dealt by a team's tanks.
    #[must_use]
    pub fn team_damage(&self, team: Team) -> i64 {
        self.tanks
            .iter()
            .filter(|t| t.team == team)
            .map(|t| t.damage_dealt)
            .sum()
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON to `path`.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

/// Metrics for a single tank in a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TankMetrics {
    /// Tank id.
    pub id: TankId,
    /// Display name.
    pub name: String,
    /// Side.
    pub team: Team,
    /// Volleys fired.
    pub volleys: u32,
    /// Projectiles fired across all volleys.
    pub projectiles_fired: u32,
    /// Projectiles that hit an enemy.
    pub hits_landed: u32,
    /// Projectiles taken.
    pub hits_taken: u32,
    /// Damage dealt to enemies.
    pub damage_dealt: i64,
    /// Damage taken from enemy projectiles.
    pub damage_taken: i64,
    /// Damage taken as recoil from own hits.
    pub recoil_taken: i64,
    /// Immediate heal rolls won, as attacker or target.
    pub heal_rolls: u32,
    /// Kills credited (the hit that moved a target from alive to dead).
    pub kills: u32,
    /// Deaths.
    pub deaths: u32,
    /// Revivals.
    pub revivals: u32,
    /// Power-up windows that ran out.
    pub power_ups_used: u32,
    /// Health when the match ended.
    pub final_hp: i32,
    /// Maximum health.
    pub max_hp: i32,
    /// Alive when the match ended.
    pub alive: bool,
}

impl TankMetrics {
    /// Create metrics for a tank at spawn.
    #[must_use]
    pub fn new(tank: &Tank) -> Self {
        Self {
            id: tank.id(),
            name: tank.name().to_string(),
            team: tank.team(),
            final_hp: tank.hp(),
            max_hp: tank.max_hp(),
            alive: tank.is_alive(),
            ..Default::default()
        }
    }

    /// Fraction of fired projectiles that hit.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.projectiles_fired == 0 {
            0.0
        } else {
            f64::from(self.hits_landed) / f64::from(self.projectiles_fired)
        }
    }
}

/// A timestamped event during the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Tick when the event occurred.
    pub tick: u64,
    /// Event type.
    pub event_type: EventType,
    /// Tank involved.
    pub tank: TankId,
    /// Additional details.
    pub details: String,
}

/// Types of timed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// A tank fired for the first time.
    FirstShot,
    /// A tank died.
    Death,
    /// A tank came back.
    Revival,
    /// A power-up window closed.
    PowerUpEnded,
}

/// Metrics collector that tracks events during a match.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    /// Current match metrics.
    metrics: MatchMetrics,
    /// Current tick.
    current_tick: u64,
}

impl MetricsCollector {
    /// Create a collector with one entry per tank already in `sim`.
    #[must_use]
    pub fn new(scenario: &str, sim: &Simulation) -> Self {
        let mut metrics = MatchMetrics::new(scenario, sim.config().seed);
        metrics.tanks = sim.tanks().iter().map(TankMetrics::new).collect();
        Self {
            metrics,
            current_tick: sim.get_tick(),
        }
    }

    /// Update the current tick.
    pub fn set_tick(&mut self, tick: u64) {
        self.current_tick = tick;
    }

    /// Fold one tick's events in.
    pub fn record(&mut self, events: &TickEvents) {
        for volley in &events.volleys {
            self.on_volley(volley.tank, volley.projectiles);
        }
        for hit in &events.hits {
            self.on_hit(hit);
        }
        for &tank in &events.deaths {
            self.log(EventType::Death, tank, "destroyed");
            if let Some(m) = self.tank_mut(tank) {
                m.deaths += 1;
            }
        }
        for &tank in &events.revivals {
            self.log(EventType::Revival, tank, "revived");
            if let Some(m) = self.tank_mut(tank) {
                m.revivals += 1;
            }
        }
        for &(tank, power_up) in &events.power_ups_ended {
            self.on_power_up_ended(tank, power_up);
        }
        self.metrics.wall_impacts += events.wall_impacts as u64;
        self.metrics.expired += events.expired as u64;
        self.metrics.out_of_bounds += events.out_of_bounds as u64;
    }

    fn on_volley(&mut self, tank: TankId, projectiles: usize) {
        let first = match self.tank_mut(tank) {
            Some(m) => {
                m.volleys += 1;
                m.projectiles_fired += projectiles as u32;
                m.volleys == 1
            }
            None => false,
        };
        if first {
            self.log(EventType::FirstShot, tank, &format!("{projectiles} projectiles"));
        }
    }

    fn on_hit(&mut self, hit: &HitEvent) {
        if let Some(m) = self.tank_mut(hit.attacker) {
            m.hits_landed += 1;
            m.damage_dealt += i64::from(hit.damage);
            m.recoil_taken += i64::from(hit.recoil);
            m.heal_rolls += u32::from(hit.attacker_healed);
        }
        if let Some(m) = self.tank_mut(hit.target) {
            m.hits_taken += 1;
            m.damage_taken += i64::from(hit.damage);
            m.heal_rolls += u32::from(hit.target_healed);
        }
    }

    fn on_power_up_ended(&mut self, tank: TankId, power_up: PowerUp) {
        self.log(EventType::PowerUpEnded, tank, &format!("{power_up:?}"));
        if let Some(m) = self.tank_mut(tank) {
            m.power_ups_used += 1;
        }
    }

    /// Credit a kill to the attacker whose hit killed `target` this tick.
    ///
    /// Call after [`MetricsCollector::record`] with the same events.
    pub fn credit_kills(&mut self, events: &TickEvents) {
        for &dead in &events.deaths {
            let killer = events
                .hits
                .iter()
                .rev()
                .find(|hit| hit.target == dead)
                .map(|hit| hit.attacker);
            if let Some(m) = killer.and_then(|k| self.tank_mut(k)) {
                m.kills += 1;
            }
        }
    }

    fn tank_mut(&mut self, id: TankId) -> Option<&mut TankMetrics> {
        self.metrics.tanks.get_mut(id as usize)
    }

    fn log(&mut self, event_type: EventType, tank: TankId, details: &str) {
        self.metrics.events.push(TimedEvent {
            tick: self.current_tick,
            event_type,
            tank,
            details: details.to_string(),
        });
    }

    /// Finalize against the end state of `sim` and return the metrics.
    #[must_use]
    pub fn finalize(mut self, sim: &Simulation) -> MatchMetrics {
        self.metrics.duration_ticks = sim.get_tick();
        self.metrics.duration_ms = sim.now().as_millis_f64();
        self.metrics.final_state_hash = sim.state_hash();
        for tank in sim.tanks() {
            if let Some(m) = self.tank_mut(tank.id()) {
                m.final_hp = tank.hp();
                m.alive = tank.is_alive();
            }
        }
        self.metrics
    }

    /// Get current metrics (immutable).
    #[must_use]
    pub fn current(&self) -> &MatchMetrics {
        &self.metrics
    }
}
