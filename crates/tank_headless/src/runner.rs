//! Headless match runner.
//!
//! Drives a [`Simulation`] built from a [`Scenario`]: delivers the input
//! script as the clock reaches each entry, ticks, and folds the events into
//! a [`MetricsCollector`].

use tank_core::schedule::SimTime;
use tank_core::simulation::{Simulation, TickEvents};

use crate::metrics::{MatchMetrics, MetricsCollector};
use crate::scenario::{Scenario, ScenarioError, TimedInput};

/// Runs one scenario to completion.
pub struct MatchRunner {
    name: String,
    sim: Simulation,
    inputs: Vec<TimedInput>,
    next_input: usize,
    end: SimTime,
    collector: MetricsCollector,
}

impl MatchRunner {
    /// Build the scenario's simulation.
    pub fn new(scenario: &Scenario) -> Result<Self, ScenarioError> {
        let sim = scenario.build()?;
        let collector = MetricsCollector::new(&scenario.name, &sim);
        tracing::info!(
            scenario = %scenario.name,
            map = %sim.map().name,
            tanks = sim.tanks().len(),
            seed = sim.config().seed,
            duration_ms = scenario.duration_ms,
            "Match loaded"
        );
        Ok(Self {
            name: scenario.name.clone(),
            sim,
            inputs: scenario.sorted_inputs(),
            next_input: 0,
            end: SimTime::from_millis(scenario.duration_ms),
            collector,
        })
    }

    /// Build with the scenario's seed replaced.
    pub fn with_seed(scenario: &Scenario, seed: u64) -> Result<Self, ScenarioError> {
        let mut scenario = scenario.clone();
        scenario.config.seed = seed;
        Self::new(&scenario)
    }

    /// The running simulation.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Metrics gathered so far.
    #[must_use]
    pub fn metrics(&self) -> &MatchMetrics {
        self.collector.current()
    }

    /// The scenario's duration has elapsed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.sim.now() >= self.end
    }

    /// Deliver due inputs and advance one tick.
    pub fn step(&mut self) -> TickEvents {
        self.deliver_inputs();
        let events = self.sim.tick();
        self.collector.set_tick(self.sim.get_tick());
        self.collector.record(&events);
        self.collector.credit_kills(&events);

        for hit in &events.hits {
            tracing::trace!(
                attacker = hit.attacker,
                target = hit.target,
                damage = hit.damage,
                "Hit"
            );
        }
        for &tank in &events.deaths {
            tracing::info!(tick = self.sim.get_tick(), tank, "Tank destroyed");
        }
        events
    }

    /// Step until `millis` more simulation time has passed or the match
    /// ends, whichever comes first.
    pub fn run_for_millis(&mut self, millis: u64) -> TickEvents {
        let until = self.sim.now().plus_millis(millis).min(self.end);
        let mut events = TickEvents::default();
        while self.sim.now() < until {
            events.merge(self.step());
        }
        events
    }

    /// Run to the end and return the final metrics.
    #[must_use]
    pub fn run(mut self) -> MatchMetrics {
        while !self.is_finished() {
            self.step();
        }
        self.finish()
    }

    /// Stop now and return the final metrics.
    #[must_use]
    pub fn finish(self) -> MatchMetrics {
        let metrics = self.collector.finalize(&self.sim);
        tracing::info!(
            scenario = %self.name,
            ticks = metrics.duration_ticks,
            state_hash = format!("{:016x}", metrics.final_state_hash),
            "Match finished"
        );
        metrics
    }

    fn deliver_inputs(&mut self) {
        let now = self.sim.now();
        while let Some(input) = self.inputs.get(self.next_input) {
            if SimTime::from_millis(input.at_ms) > now {
                break;
            }
            if let Err(error) = self.sim.handle_input(input.tank, input.event) {
                tracing::warn!(%error, tank = input.tank, "Scripted input rejected");
            }
            self.next_input += 1;
        }
    }
}

/// Run `scenario` once per seed and report whether every run ended on the
/// same state hash as the first.
pub fn verify_determinism(
    scenario: &Scenario,
    runs: usize,
) -> Result<(bool, Vec<u64>), ScenarioError> {
    let mut hashes = Vec::with_capacity(runs);
    for _ in 0..runs {
        hashes.push(MatchRunner::new(scenario)?.run().final_state_hash);
    }
    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    Ok((deterministic, hashes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_core::input::InputEvent;
    use tank_core::tank::{TankConfig, Team};

    fn short(mut scenario: Scenario, duration_ms: u64) -> Scenario {
        scenario.duration_ms = duration_ms;
        scenario
    }

    #[test]
    fn test_runner_stops_at_duration() {
        let scenario = short(Scenario::stock().unwrap(), 500);
        let metrics = MatchRunner::new(&scenario).unwrap().run();
        // 500 ms at 15.625 ms per tick
        assert_eq!(metrics.duration_ticks, 32);
        assert!(metrics.duration_ms >= 500.0);
    }

    #[test]
    fn test_scripted_auto_fire_produces_volleys() {
        let scenario = short(Scenario::stock().unwrap(), 1_100);
        let metrics = MatchRunner::new(&scenario).unwrap().run();
        // 120 volleys per minute: shots at 0 ms and 500 ms and 1000 ms
        let player = metrics.tank(0).unwrap();
        assert_eq!(player.volleys, 3);
        assert_eq!(player.projectiles_fired, 3);
    }

    #[test]
    fn test_duel_trades_damage() {
        let scenario = short(Scenario::builtin("duel").unwrap().unwrap(), 3_000);
        let metrics = MatchRunner::new(&scenario).unwrap().run();
        assert!(metrics.tank(0).unwrap().hits_landed > 0);
        assert!(metrics.tank(1).unwrap().hits_landed > 0);
        assert!(metrics.tank(1).unwrap().damage_taken > 0);
    }

    #[test]
    fn test_inputs_delivered_once_in_order() {
        let scenario = Scenario {
            name: "script".to_string(),
            description: String::new(),
            map: crate::scenario::MapSource::Named("demo".to_string()),
            config: tank_core::config::SimConfig::default(),
            duration_ms: 200,
            tanks: vec![TankConfig::new("solo", Team::Allies)],
            inputs: vec![
                TimedInput {
                    at_ms: 100,
                    tank: 0,
                    event: InputEvent::KeyUp(tank_core::input::Key::Up),
                },
                TimedInput {
                    at_ms: 0,
                    tank: 0,
                    event: InputEvent::KeyDown(tank_core::input::Key::Up),
                },
            ],
        };
        let mut runner = MatchRunner::new(&scenario).unwrap();
        runner.step();
        assert!(runner.simulation().get_tank(0).unwrap().intent().up);
        runner.run_for_millis(150);
        assert!(!runner.simulation().get_tank(0).unwrap().intent().up);
        assert_eq!(runner.next_input, 2);
    }

    #[test]
    fn test_run_for_millis_clamps_to_end() {
        let scenario = short(Scenario::stock().unwrap(), 100);
        let mut runner = MatchRunner::new(&scenario).unwrap();
        runner.run_for_millis(10_000);
        assert!(runner.is_finished());
        assert!(runner.simulation().now() < SimTime::from_millis(120));
    }

    #[test]
    fn test_with_seed_overrides() {
        let scenario = short(Scenario::stock().unwrap(), 100);
        let runner = MatchRunner::with_seed(&scenario, 99).unwrap();
        assert_eq!(runner.simulation().config().seed, 99);
        assert_eq!(runner.metrics().seed, 99);
    }

    #[test]
    fn test_verify_determinism_on_stock() {
        let scenario = short(Scenario::stock().unwrap(), 3_000);
        let (deterministic, hashes) = verify_determinism(&scenario, 3).unwrap();
        assert!(deterministic, "hashes: {hashes:?}");
        assert_eq!(hashes.len(), 3);
    }
}
