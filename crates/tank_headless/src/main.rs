//! Headless tank arena runner.
//!
//! This binary runs scripted matches without graphics. Designed for CI
//! testing, determinism checks and quick inspection of scenarios.
//!
//! # Usage
//!
//! ```bash
//! # Run the stock match, metrics as JSON on stdout
//! cargo run -p tank_headless -- run --scenario stock
//!
//! # Run a scenario file and save metrics
//! cargo run -p tank_headless -- run --scenario duel.ron --output results/duel.json
//!
//! # Draw the arena every 500 ms of simulation time
//! cargo run -p tank_headless -- run --scenario duel --ascii-every 500
//!
//! # Verify determinism
//! cargo run -p tank_headless -- verify --scenario stock --runs 5
//!
//! # Check data files
//! cargo run -p tank_headless -- validate --map arena.ron --config sim.ron
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the level chosen by `--verbose`.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tank_core::config::SimConfig;
use tank_core::map::ArenaMap;
use tank_headless::{
    ascii_visualizer::{render_ascii, AsciiConfig},
    runner::{verify_determinism, MatchRunner},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "tank_headless")]
#[command(about = "Headless tank arena runner for scenario testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single match
    Run {
        /// Built-in scenario name or path to a RON scenario
        #[arg(short, long, default_value = "stock")]
        scenario: String,

        /// Override the scenario's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the scenario's duration in milliseconds
        #[arg(short, long)]
        duration_ms: Option<u64>,

        /// Draw the arena every N milliseconds of simulation time
        #[arg(long)]
        ascii_every: Option<u64>,

        /// Draw the final arena
        #[arg(long)]
        ascii: bool,

        /// ASCII viewport width
        #[arg(long, default_value = "80")]
        width: usize,

        /// ASCII viewport height
        #[arg(long, default_value = "24")]
        height: usize,

        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,

        /// Write metrics JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by running a scenario multiple times
    Verify {
        /// Scenario to test
        #[arg(short, long, default_value = "stock")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: usize,
    },

    /// Check scenario, map and config files without running them
    Validate {
        /// Scenario files or built-in names
        #[arg(short, long)]
        scenario: Vec<String>,

        /// Map files
        #[arg(short, long)]
        map: Vec<PathBuf>,

        /// Simulation config files
        #[arg(short, long)]
        config: Vec<PathBuf>,
    },

    /// List built-in scenarios and maps
    List,

    /// Run performance benchmark
    Benchmark {
        /// Number of ticks to run
        #[arg(short, long, default_value = "10000")]
        ticks: u64,

        /// Scenario to benchmark
        #[arg(short, long, default_value = "stock")]
        scenario: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr (stdout carries frames and metrics)
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            duration_ms,
            ascii_every,
            ascii,
            width,
            height,
            no_color,
            output,
        }) => {
            let ascii_config = AsciiConfig {
                width,
                height,
                use_color: !no_color,
                ..AsciiConfig::default()
            };
            cmd_run(
                &scenario,
                seed,
                duration_ms,
                ascii_every,
                ascii,
                &ascii_config,
                output,
            );
        }
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => {
            cmd_verify(&scenario, seed, runs);
        }
        Some(Commands::Validate {
            scenario,
            map,
            config,
        }) => {
            cmd_validate(&scenario, &map, &config);
        }
        Some(Commands::List) => {
            cmd_list();
        }
        Some(Commands::Benchmark { ticks, scenario }) => {
            cmd_benchmark(ticks, &scenario);
        }
        None => {
            // Default: the stock match with metrics on stdout
            cmd_run(
                "stock",
                None,
                None,
                None,
                false,
                &AsciiConfig::default(),
                None,
            );
        }
    }
}

fn load_scenario(name: &str) -> Scenario {
    match Scenario::resolve(name) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario '{name}': {e}");
            std::process::exit(1);
        }
    }
}

/// Run a single match
fn cmd_run(
    scenario: &str,
    seed: Option<u64>,
    duration_ms: Option<u64>,
    ascii_every: Option<u64>,
    ascii: bool,
    ascii_config: &AsciiConfig,
    output: Option<PathBuf>,
) {
    let mut scenario = load_scenario(scenario);
    if let Some(seed) = seed {
        scenario.config.seed = seed;
    }
    if let Some(duration_ms) = duration_ms {
        scenario.duration_ms = duration_ms;
    }

    let mut runner = match MatchRunner::new(&scenario) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Failed to start match: {e}");
            std::process::exit(1);
        }
    };

    match ascii_every {
        Some(interval) if interval > 0 => {
            print!("{}", render_ascii(runner.simulation(), ascii_config));
            while !runner.is_finished() {
                runner.run_for_millis(interval);
                print!("{}", render_ascii(runner.simulation(), ascii_config));
            }
        }
        _ => {
            while !runner.is_finished() {
                runner.step();
            }
            if ascii {
                print!("{}", render_ascii(runner.simulation(), ascii_config));
            }
        }
    }

    let metrics = runner.finish();
    for tank in &metrics.tanks {
        tracing::info!(
            tank = tank.id,
            name = %tank.name,
            damage_dealt = tank.damage_dealt,
            damage_taken = tank.damage_taken,
            deaths = tank.deaths,
            accuracy = format!("{:.0}%", tank.accuracy() * 100.0),
            "Tank summary"
        );
    }

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Failed to create output directory: {e}");
                    std::process::exit(1);
                }
            }
            if let Err(e) = metrics.save(&path) {
                eprintln!("Failed to write metrics: {e}");
                std::process::exit(1);
            }
            tracing::info!("Metrics saved to {}", path.display());
        }
        None => match metrics.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize metrics: {e}");
                std::process::exit(1);
            }
        },
    }
}

/// Verify determinism
fn cmd_verify(scenario: &str, seed: u64, runs: usize) {
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario,
        seed,
        runs
    );

    let mut scenario = load_scenario(scenario);
    scenario.config.seed = seed;

    match verify_determinism(&scenario, runs) {
        Ok((true, hashes)) => {
            eprintln!("PASS: All {runs} runs produced identical results");
            if let Some(hash) = hashes.first() {
                eprintln!("  State hash: {hash:016x}");
            }
        }
        Ok((false, hashes)) => {
            eprintln!("FAIL: Non-determinism detected!");
            for (run, hash) in hashes.iter().enumerate() {
                eprintln!("  Run {run}: {hash:016x}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to run scenario: {e}");
            std::process::exit(1);
        }
    }
}

/// Check data files
fn cmd_validate(scenarios: &[String], maps: &[PathBuf], configs: &[PathBuf]) {
    let mut failures = 0usize;

    for name in scenarios {
        match Scenario::resolve(name) {
            Ok(s) => eprintln!("OK   scenario {name} ({} tanks, {} inputs)", s.tanks.len(), s.inputs.len()),
            Err(e) => {
                eprintln!("FAIL scenario {name}: {e}");
                failures += 1;
            }
        }
    }
    for path in maps {
        match ArenaMap::load(path) {
            Ok(m) => eprintln!("OK   map {} ({} walls)", path.display(), m.walls.len()),
            Err(e) => {
                eprintln!("FAIL map {}: {e}", path.display());
                failures += 1;
            }
        }
    }
    for path in configs {
        match SimConfig::load(path) {
            Ok(_) => eprintln!("OK   config {}", path.display()),
            Err(e) => {
                eprintln!("FAIL config {}: {e}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("{failures} file(s) failed validation");
        std::process::exit(1);
    }
}

/// List built-in data
fn cmd_list() {
    println!("Scenarios:");
    for name in Scenario::BUILT_IN {
        match Scenario::resolve(name) {
            Ok(s) => println!("  {name:<8} {}", s.description),
            Err(e) => println!("  {name:<8} (broken: {e})"),
        }
    }
    println!("Maps:");
    for name in ArenaMap::BUILT_IN {
        if let Some(map) = ArenaMap::by_name(name) {
            println!(
                "  {name:<8} {}x{}, {} walls",
                map.size.x,
                map.size.y,
                map.walls.len()
            );
        }
    }
}

/// Run performance benchmark
fn cmd_benchmark(ticks: u64, scenario: &str) {
    tracing::info!("Running benchmark: {} ticks on {}", ticks, scenario);

    let mut scenario = load_scenario(scenario);
    scenario.duration_ms = u64::MAX / 1_000_000;
    let mut runner = match MatchRunner::new(&scenario) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Failed to start match: {e}");
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    for _ in 0..ticks {
        runner.step();
    }
    let elapsed = start.elapsed();

    let ticks_per_sec = ticks as f64 / elapsed.as_secs_f64();
    let realtime = ticks_per_sec / f64::from(runner.simulation().config().tick_rate_hz);
    eprintln!("Benchmark complete:");
    eprintln!("  Ticks: {ticks}");
    eprintln!("  Time: {:.2}s", elapsed.as_secs_f64());
    eprintln!("  Ticks/sec: {ticks_per_sec:.0}");
    eprintln!("  Realtime factor: {realtime:.1}x");
    eprintln!("  Projectiles in flight: {}", runner.simulation().projectiles().len());
}
