//! Simulation clock and the scheduled-event queue.
//!
//! Every timed behavior in the arena (passive regeneration, the effect
//! sweep, power-up expiry and death-to-revive) is a [`ScheduledEvent`] in
//! one [`EventQueue`] keyed by [`SimTime`]. The simulation polls the queue
//! once at the start of each tick, so expiry is deterministic and testable
//! without wall-clock waits.
//!
//! Events due at the same instant fire in the order they were scheduled.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::combat::PowerUp;
use crate::tank::TankId;

/// Simulation time in microseconds since the match started.
///
/// Integer microseconds keep the 64 Hz tick (15 625 µs) exact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime(u64);

impl SimTime {
    /// The start of the match.
    pub const ZERO: Self = Self(0);

    /// Create a time from microseconds.
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Create a time from whole milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000)
    }

    /// Raw microseconds.
    #[must_use]
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Milliseconds as a float, for progress and cooldown math.
    #[must_use]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Milliseconds elapsed since `earlier`, saturating at zero.
    #[must_use]
    pub fn millis_since(self, earlier: Self) -> f64 {
        self.0.saturating_sub(earlier.0) as f64 / 1_000.0
    }

    /// This time shifted forward by whole milliseconds.
    #[must_use]
    pub const fn plus_millis(self, millis: u64) -> Self {
        Self(self.0 + millis * 1_000)
    }

    /// This time shifted forward by microseconds.
    #[must_use]
    pub const fn plus_micros(self, micros: u64) -> Self {
        Self(self.0 + micros)
    }
}

/// A deferred action, fired once its deadline is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledEvent {
    /// Passive regeneration for every live tank. Reschedules itself.
    Regen,
    /// Sweep expired impact and damage-number effects. Reschedules itself.
    EffectSweep,
    /// Bring a dead tank back, if it is still in the death that scheduled this.
    Revive {
        /// Tank to revive.
        tank: TankId,
        /// Death generation captured when the tank died.
        generation: u32,
    },
    /// End a timed power-up window.
    PowerUpExpired {
        /// Tank the power-up belongs to.
        tank: TankId,
        /// Which power-up ends.
        power_up: PowerUp,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    at: SimTime,
    seq: u64,
    event: ScheduledEvent,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

/// Min-queue of scheduled events ordered by deadline, then insertion order.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire at `at`.
    pub fn schedule(&mut self, at: SimTime, event: ScheduledEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { at, seq, event }));
    }

    /// Remove and return the earliest event due at or before `now`.
    pub fn pop_due(&mut self, now: SimTime) -> Option<(SimTime, ScheduledEvent)> {
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.at <= now => self
                .heap
                .pop()
                .map(|Reverse(entry)| (entry.at, entry.event)),
            _ => None,
        }
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if no events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
