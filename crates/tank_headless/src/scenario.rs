//! Scenario loading and configuration.
//!
//! A scenario fixes everything a headless match needs: the arena, the
//! simulation constants, the tanks and a script of timed inputs. Two
//! scenarios ship embedded in the binary; any other name is treated as a
//! path to a RON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tank_core::config::SimConfig;
use tank_core::error::GameError;
use tank_core::input::InputEvent;
use tank_core::map::ArenaMap;
use tank_core::simulation::Simulation;
use tank_core::tank::{TankConfig, TankId};
use thiserror::Error;

const STOCK_RON: &str = include_str!("../scenarios/stock.ron");
const DUEL_RON: &str = include_str!("../scenarios/duel.ron");

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario is well-formed but inconsistent.
    #[error("Invalid scenario '{name}': {reason}")]
    Invalid {
        /// Scenario name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The simulation rejected the scenario's map, config or tanks.
    #[error(transparent)]
    Simulation(#[from] GameError),
}

/// Where the arena comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapSource {
    /// A built-in map, see [`ArenaMap::BUILT_IN`].
    Named(String),
    /// A map written out in the scenario itself.
    Inline(ArenaMap),
}

impl Default for MapSource {
    fn default() -> Self {
        MapSource::Named("01".to_string())
    }
}

impl MapSource {
    /// Resolve to a concrete map.
    pub fn resolve(&self) -> Result<ArenaMap, ScenarioError> {
        match self {
            MapSource::Named(name) => {
                ArenaMap::by_name(name).ok_or_else(|| ScenarioError::Invalid {
                    name: name.clone(),
                    reason: format!(
                        "unknown map (built-in maps: {})",
                        ArenaMap::BUILT_IN.join(", ")
                    ),
                })
            }
            MapSource::Inline(map) => {
                map.validate()?;
                Ok(map.clone())
            }
        }
    }
}

/// One scripted input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedInput {
    /// Simulation time the input is delivered at, in milliseconds.
    pub at_ms: u64,
    /// Receiving tank, by spawn index.
    pub tank: TankId,
    /// The event.
    pub event: InputEvent,
}

fn default_duration_ms() -> u64 {
    30_000
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Arena.
    #[serde(default)]
    pub map: MapSource,
    /// Simulation constants; omitted fields keep their defaults.
    #[serde(default)]
    pub config: SimConfig,
    /// Match length in simulation milliseconds.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// Tanks, spawned in order. A tank's id is its index here.
    pub tanks: Vec<TankConfig>,
    /// Input script.
    #[serde(default)]
    pub inputs: Vec<TimedInput>,
}

impl Scenario {
    /// Names accepted by [`Scenario::builtin`].
    pub const BUILT_IN: [&'static str; 2] = ["stock", "duel"];

    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// One of the embedded scenarios, or `None` for an unknown name.
    pub fn builtin(name: &str) -> Option<Result<Self, ScenarioError>> {
        let ron = match name {
            "stock" => STOCK_RON,
            "duel" => DUEL_RON,
            _ => return None,
        };
        Some(Self::from_ron_str(ron))
    }

    /// The stock match: one player tank against two static enemies.
    pub fn stock() -> Result<Self, ScenarioError> {
        Self::from_ron_str(STOCK_RON)
    }

    /// Resolve a CLI argument: a built-in name, otherwise a file path.
    pub fn resolve(name_or_path: &str) -> Result<Self, ScenarioError> {
        Self::builtin(name_or_path).unwrap_or_else(|| Self::load(name_or_path))
    }

    /// Check the parts serde cannot: tank configs, the config constants,
    /// the map and input addressing.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.tanks.is_empty() {
            return Err(self.invalid("no tanks".to_string()));
        }
        self.config.validate()?;
        self.map.resolve()?;
        for tank in &self.tanks {
            tank.validate()?;
        }
        for (index, input) in self.inputs.iter().enumerate() {
            if input.tank as usize >= self.tanks.len() {
                return Err(self.invalid(format!(
                    "input {index} targets tank {} but only {} tanks exist",
                    input.tank,
                    self.tanks.len()
                )));
            }
        }
        Ok(())
    }

    /// Build the simulation with every tank spawned.
    pub fn build(&self) -> Result<Simulation, ScenarioError> {
        let mut sim = Simulation::new(self.config.clone(), self.map.resolve()?)?;
        for tank in &self.tanks {
            sim.spawn_tank(tank.clone())?;
        }
        Ok(sim)
    }

    /// Inputs in delivery order. Entries sharing a time keep their file
    /// order.
    #[must_use]
    pub fn sorted_inputs(&self) -> Vec<TimedInput> {
        let mut inputs = self.inputs.clone();
        inputs.sort_by_key(|input| input.at_ms);
        inputs
    }

    fn invalid(&self, reason: String) -> ScenarioError {
        ScenarioError::Invalid {
            name: self.name.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_core::input::Key;
    use tank_core::tank::Team;

    #[test]
    fn test_builtin_scenarios_parse() {
        for name in Scenario::BUILT_IN {
            let scenario = Scenario::builtin(name)
                .expect("known name")
                .expect("embedded scenario parses");
            assert_eq!(scenario.name, name);
            assert!(scenario.build().is_ok());
        }
        assert!(Scenario::builtin("missing").is_none());
    }

    #[test]
    fn test_stock_roster() {
        let scenario = Scenario::stock().unwrap();
        assert_eq!(scenario.map, MapSource::Named("01".to_string()));
        assert_eq!(scenario.tanks.len(), 4);
        assert!(scenario.tanks[0].is_player);
        assert_eq!(scenario.tanks[1].team, Team::Enemies);
        assert_eq!(scenario.tanks[1].stats.max_hp, 9_533);
        // Omitted fields keep their defaults
        assert_eq!(scenario.tanks[1].radius, 75.0);
        assert_eq!(scenario.config.regen_interval_ms, 1_000);
        assert_eq!(scenario.config.seed, 1);
    }

    #[test]
    fn test_duel_has_inline_map() {
        let scenario = Scenario::builtin("duel").unwrap().unwrap();
        let map = scenario.map.resolve().unwrap();
        assert_eq!(map.walls.len(), 2);
        assert_eq!(map.walls[0].color, "gray");
        assert_eq!(scenario.config.revive_delay_ms, 2_000);
    }

    #[test]
    fn test_minimal_scenario_defaults() {
        let scenario = Scenario::from_ron_str(
            r#"(
                name: "tiny",
                tanks: [(name: "solo", team: Allies)],
                inputs: [(at_ms: 50, tank: 0, event: KeyDown(Up))],
            )"#,
        )
        .unwrap();
        assert_eq!(scenario.duration_ms, 30_000);
        assert_eq!(scenario.map, MapSource::default());
        assert_eq!(scenario.inputs[0].event, InputEvent::KeyDown(Key::Up));
    }

    #[test]
    fn test_input_for_unknown_tank_rejected() {
        let err = Scenario::from_ron_str(
            r#"(
                name: "stray",
                tanks: [(name: "solo", team: Allies)],
                inputs: [(at_ms: 0, tank: 3, event: Click)],
            )"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScenarioError::Invalid { .. }));
    }

    #[test]
    fn test_unknown_map_rejected() {
        let err = Scenario::from_ron_str(
            r#"(name: "lost", map: Named("nowhere"), tanks: [(name: "solo", team: Allies)])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown map"));
    }

    #[test]
    fn test_bad_tank_rejected() {
        let err = Scenario::from_ron_str(
            r#"(name: "ghost", tanks: [(name: "zero", team: Enemies, stats: (max_hp: 0))])"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Simulation(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_sorted_inputs_are_stable() {
        let mut scenario = Scenario::stock().unwrap();
        scenario.inputs.reverse();
        let sorted = scenario.sorted_inputs();
        assert!(sorted.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
        assert_eq!(sorted.len(), scenario.inputs.len());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Scenario::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.ron");
        std::fs::write(&path, r#"(name: "file", tanks: [(name: "solo", team: Allies)])"#)
            .unwrap();
        let scenario = Scenario::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(scenario.name, "file");
    }
}
