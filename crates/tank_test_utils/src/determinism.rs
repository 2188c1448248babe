//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces identical
//! results given identical config, seed and inputs.
//!
//! # Testing Strategy
//!
//! A match must replay exactly from its seed and input script. Sources of
//! non-determinism include:
//!
//! - **Wall-clock timers**: every deadline lives on the integer
//!   [`SimTime`] clock and fires from the event queue.
//!
//! - **Unseeded randomness**: the heal-on-hit rolls come from a `Pcg32`
//!   seeded by `SimConfig::seed`.
//!
//! - **Iteration order**: tanks are stored by id and projectiles in spawn
//!   order; nothing iterates a hash map.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual modules (geometry, combat, effects)
//! 2. **Property tests**: random input scripts still replay identically
//! 3. **Integration tests**: full scenarios hash the same on every run
//! 4. **Parallel tests**: N simulations on N threads all match

use std::thread;

use tank_core::input::InputEvent;
use tank_core::schedule::SimTime;
use tank_core::simulation::Simulation;
use tank_core::tank::TankId;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic,
            "Simulation is non-deterministic!\n\
             Runs: {}\n\
             Ticks: {}\n\
             Unique hashes: {} (expected 1)\n\
             All hashes: {:?}",
            self.hashes.len(),
            self.ticks,
            self.unique_hashes().len(),
            self.hashes
        );
    }
}

/// One scripted input, applied at the start of the first tick at or after
/// `at`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedInput {
    /// When to apply it.
    pub at: SimTime,
    /// Receiving tank.
    pub tank: TankId,
    /// The event.
    pub event: InputEvent,
}

/// Run `ticks` ticks, feeding `script` in as the clock reaches each entry.
///
/// Entries must be sorted by time. Inputs addressed to unknown tanks are
/// skipped.
pub fn run_script(sim: &mut Simulation, script: &[ScriptedInput], ticks: u64) {
    let mut pending = script.iter().peekable();
    for _ in 0..ticks {
        while let Some(input) = pending.next_if(|input| input.at <= sim.now()) {
            if let Err(error) = sim.handle_input(input.tank, input.event) {
                tracing::debug!(%error, "Scripted input skipped");
            }
        }
        sim.tick();
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut state = setup();
            for _ in 0..ticks {
                step(&mut state);
            }
            hash(&state)
        })
        .collect();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks,
    }
}

/// Run a simulation twice from `setup_fn` and compare the final hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick();
        },
        Simulation::state_hash,
    )
    .is_deterministic
}

/// Replay the same script against fresh simulations `runs` times.
pub fn verify_script_determinism<F>(
    setup_fn: F,
    script: &[ScriptedInput],
    num_ticks: u64,
    runs: usize,
) -> DeterminismResult
where
    F: Fn() -> Simulation,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut sim = setup_fn();
            run_script(&mut sim, script, num_ticks);
            sim.state_hash()
        })
        .collect();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Run `num_sims` simulations on scoped threads and collect their final
/// hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the runs match throughout, `Some(tick)` for the first tick
/// whose hashes differ.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    (1..=num_ticks).find(|_| {
        sim1.tick();
        sim2.tick();
        sim1.state_hash() != sim2.state_hash()
    })
}

/// Proptest strategies for arena inputs.
pub mod strategies {
    use glam::Vec2;
    use proptest::prelude::*;
    use tank_core::input::{InputEvent, Key, PointerButton};
    use tank_core::schedule::SimTime;
    use tank_core::tank::TankId;

    use super::ScriptedInput;

    /// Angles in degrees well beyond one turn either way.
    pub fn arb_degrees() -> impl Strategy<Value = f32> {
        -3_600.0f32..3_600.0f32
    }

    /// A point inside a 2000×2000 arena.
    pub fn arb_arena_point() -> impl Strategy<Value = Vec2> {
        (0.0f32..2_000.0, 0.0f32..2_000.0).prop_map(|(x, y)| Vec2::new(x, y))
    }

    /// Any key.
    pub fn arb_key() -> impl Strategy<Value = Key> {
        prop_oneof![
            Just(Key::Up),
            Just(Key::Down),
            Just(Key::Left),
            Just(Key::Right),
            Just(Key::Disperse),
            Just(Key::Boost),
        ]
    }

    /// Any input event.
    pub fn arb_input_event() -> impl Strategy<Value = InputEvent> {
        prop_oneof![
            arb_key().prop_map(InputEvent::KeyDown),
            arb_key().prop_map(InputEvent::KeyUp),
            arb_arena_point().prop_map(InputEvent::PointerMove),
            Just(InputEvent::PointerDown(PointerButton::Right)),
            Just(InputEvent::Click),
        ]
    }

    /// A time-sorted input script for tanks `0..tanks` over `max_ms`.
    pub fn arb_script(
        tanks: TankId,
        max_ms: u64,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<ScriptedInput>> {
        proptest::collection::vec(
            (0..max_ms, 0..tanks.max(1), arb_input_event()),
            0..max_len,
        )
        .prop_map(|mut entries| {
            entries.sort_by_key(|(at, _, _)| *at);
            entries
                .into_iter()
                .map(|(at, tank, event)| ScriptedInput {
                    at: SimTime::from_millis(at),
                    tank,
                    event,
                })
                .collect()
        })
    }

    /// Health values for regeneration properties.
    pub fn arb_health() -> impl Strategy<Value = (i32, i32)> {
        (1i32..20_000).prop_flat_map(|max| (1..=max, Just(max)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{duel, stock_skirmish};
    use proptest::prelude::*;
    use tank_core::config::SimConfig;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_skirmish_is_deterministic() {
        assert!(verify_simulation_determinism(|| stock_skirmish(7), 640));
    }

    #[test]
    fn test_find_divergence_on_deterministic_sim() {
        assert!(find_first_divergence(|| stock_skirmish(1), 320).is_none());
    }

    #[test]
    fn test_parallel_runs_match() {
        run_parallel_simulations(|| stock_skirmish(3), 4, 320).assert_deterministic();
    }

    #[test]
    fn test_run_script_applies_inputs_in_time() {
        let script = [ScriptedInput {
            at: SimTime::from_millis(100),
            tank: 0,
            event: InputEvent::Click,
        }];

        // Ticks start at 0, 15.625, ... 93.75 ms: too early
        let (mut early, _, _) = duel(SimConfig::default());
        run_script(&mut early, &script, 7);
        assert!(early.projectiles().is_empty());

        // The eighth tick starts at 109.375 ms
        let (mut late, _, _) = duel(SimConfig::default());
        run_script(&mut late, &script, 8);
        assert_eq!(late.projectiles().len(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_scripts_replay_identically(script in strategies::arb_script(2, 3_000, 40)) {
            let result = verify_script_determinism(
                || duel(SimConfig::default()).0,
                &script,
                200,
                2,
            );
            prop_assert!(result.is_deterministic, "hashes: {:?}", result.hashes);
        }
    }
}
