//! Headless match runner for scenario testing and CI verification.
//!
//! This crate runs tank arena matches without graphics. A match is
//! described by a RON [`Scenario`]: arena, constants, tanks and a script of
//! timed inputs. This enables:
//!
//! - **Scenario testing**: scripted matches with JSON metrics
//! - **CI verification**: the same scenario always ends on the same state hash
//! - **Quick inspection**: an ASCII view of the arena at any tick
//!
//! # Output
//!
//! - **stdout**: ASCII frames and JSON metrics
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Run the stock match and print metrics
//! cargo run -p tank_headless -- run --scenario stock
//!
//! # Run a scenario file, drawing the arena every second
//! cargo run -p tank_headless -- run --scenario my_match.ron --ascii-every 1000
//!
//! # Verify determinism
//! cargo run -p tank_headless -- verify --scenario duel --runs 5
//! ```

pub mod ascii_visualizer;
pub mod metrics;
pub mod runner;
pub mod scenario;

pub use ascii_visualizer::{render_ascii, AsciiCanvas, AsciiConfig};
pub use metrics::{MatchMetrics, MetricsCollector, TankMetrics};
pub use runner::MatchRunner;
pub use scenario::{MapSource, Scenario, ScenarioError, TimedInput};
