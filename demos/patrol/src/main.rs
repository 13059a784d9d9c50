//! patrol — the rust_av behavior loop on a synthetic stadium track.
//!
//! The vehicle patrols between two endpoints (looper mode), stopping at a
//! cycling traffic light and passing a parked car on the two-lane straight.
//! Ticks are written to `<log_path>/ticks.csv` and the run's trace to
//! `<log_path>/trace.csv`.
//!
//! ```text
//! cargo run -p patrol                                  # embedded settings
//! cargo run -p patrol -- my_settings.toml              # custom settings
//! cargo run -p patrol -- --resume output/patrol/trace.csv
//! RUST_LOG=av_behavior=debug cargo run -p patrol
//! ```

mod feeds;
mod network;

use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use av_behavior::BehaviorTag;
use av_control::PurePursuitFollower;
use av_core::{ObjectId, Settings, Tick};
use av_map::{DijkstraPlanner, GlobalPath, load_network};
use av_output::{CsvWriter, OutputWriter, SimOutputObserver, load_trace, save_trace};
use av_perception::{FakeObjectGenerator, FakeObjectParams};
use av_sim::{SimBuilder, SimObserver, TickReport};

use network::build_track;

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_SETTINGS: &str      = include_str!("../settings.toml");
const RUN_SECS:         f64       = 180.0; // simulated
const STEP_PERIOD:      Duration  = Duration::from_millis(20);

/// Patrol a synthetic stadium track with the rust_av behavior loop.
#[derive(Parser, Debug)]
#[command(name = "patrol")]
struct Args {
    /// Settings file; the embedded settings are used when omitted.
    settings: Option<PathBuf>,

    /// Restart from the start, goal and map of a saved trace.
    #[arg(long)]
    resume: Option<PathBuf>,
}

// ── Observer wrapper to count state changes ──────────────────────────────────

struct PatrolObserver<W: OutputWriter> {
    inner:       SimOutputObserver<W>,
    ticks:       u64,
    transitions: u64,
    goals:       u64,
    replans:     u64,
    last_tag:    Option<BehaviorTag>,
}

impl<W: OutputWriter> PatrolObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, ticks: 0, transitions: 0, goals: 0, replans: 0, last_tag: None }
    }
}

impl<W: OutputWriter> SimObserver for PatrolObserver<W> {
    fn on_paths_planned(&mut self, tick: Tick, paths: &[GlobalPath]) {
        self.replans += 1;
        self.inner.on_paths_planned(tick, paths);
    }

    fn on_tick_end(&mut self, report: &TickReport) {
        self.ticks += 1;
        if self.last_tag.is_some_and(|t| t != report.tag) {
            self.transitions += 1;
            if report.tag == BehaviorTag::GoalReached {
                self.goals += 1;
            }
        }
        self.last_tag = Some(report.tag);
        self.inner.on_tick_end(report);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // 1. Settings.
    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => Settings::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => Settings::from_toml_str(DEFAULT_SETTINGS).context("embedded settings")?,
    };
    if settings.sim.enable_logs {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
            .init();
    }

    println!("=== patrol — rust_av behavior loop ===");
    println!(
        "Rate: {} Hz  |  Step mode: {}  |  Looper: {}  |  Run: {RUN_SECS} s",
        settings.sim.tick_hz, settings.sim.step_by_step, settings.sim.looper
    );

    // 2. Road network: the stadium track unless the settings name a map.
    let track = build_track();
    let network = load_network(&settings.sim.map_source, Some(track.network))?;
    println!(
        "Road network: {} waypoints, {} edges ({})",
        network.waypoint_count(),
        network.edge_count(),
        settings.sim.map_source
    );

    // 3. Sim.
    let planner = DijkstraPlanner::new(&settings.planning);
    let tracker = PurePursuitFollower::new(settings.car.clone(), settings.controller.clone());
    let log_path = settings.sim.log_path.clone();
    let step_by_step = settings.sim.step_by_step;
    let mut sim = SimBuilder::new(settings, network, planner, tracker).build()?;
    if let Some(path) = &args.resume {
        let trace = load_trace(path).with_context(|| format!("loading trace {}", path.display()))?;
        sim.resume(&trace)?;
        println!("Resumed from {}", path.display());
    }
    let handle = sim.handle();

    // 4. Producers.
    let mut parked = FakeObjectGenerator::new(
        ObjectId(1),
        FakeObjectParams { label: "parked_car".to_string(), ..FakeObjectParams::default() },
    )?;
    parked.set_initial_pose(track.parked_car, 0.0);
    let mut threads = vec![
        feeds::spawn_object_feed(handle.clone(), parked),
        feeds::spawn_light_cycle(handle.clone(), track.light),
        feeds::spawn_stop_timer(handle.clone(), RUN_SECS),
    ];
    if step_by_step {
        threads.push(feeds::spawn_stepper(handle.clone(), STEP_PERIOD));
    }

    // 5. Output.
    let writer = CsvWriter::new(&log_path)?;
    let mut obs = PatrolObserver::new(SimOutputObserver::new(writer));

    // 6. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();
    join_producers(threads);
    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }
    let trace_path = log_path.join("trace.csv");
    save_trace(&trace_path, &sim.trace())?;
    info!(path = %trace_path.display(), "trace written");

    // 7. Summary.
    let v = sim.vehicle();
    println!("Simulation complete in {:.3} s wall", elapsed.as_secs_f64());
    println!("  ticks       : {}", obs.ticks);
    println!("  replans     : {}", obs.replans);
    println!("  transitions : {}", obs.transitions);
    println!("  goals       : {}", obs.goals);
    println!("  final pose  : {}  v = {:.2} m/s", v.pose, v.v);
    if let Some(e) = sim.last_error() {
        println!("  last error  : {e}");
    }
    println!("Output in {}", log_path.display());

    Ok(())
}

/// Join every producer thread.  A panicked producer only lost its own input,
/// so it is logged rather than propagated.  Returns how many panicked.
fn join_producers(threads: Vec<JoinHandle<()>>) -> usize {
    let mut panicked = 0;
    for t in threads {
        if t.join().is_err() {
            warn!("input producer thread panicked");
            panicked += 1;
        }
    }
    panicked
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::thread::{self, JoinHandle};

    use clap::Parser;

    use super::{Args, join_producers};

    #[test]
    fn resume_takes_a_trace_path() {
        let args = Args::try_parse_from(["patrol", "--resume", "output/patrol/trace.csv"]).unwrap();
        assert_eq!(args.resume, Some(PathBuf::from("output/patrol/trace.csv")));
        assert!(args.settings.is_none());
    }

    #[test]
    fn settings_file_is_positional() {
        let args = Args::try_parse_from(["patrol", "my_settings.toml"]).unwrap();
        assert_eq!(args.settings, Some(PathBuf::from("my_settings.toml")));
        assert!(args.resume.is_none());
    }

    #[test]
    fn panicked_producers_are_counted_not_propagated() {
        let failing: JoinHandle<()> = thread::spawn(|| panic!("feed lost"));
        let threads = vec![thread::spawn(|| {}), failing, thread::spawn(|| {})];
        assert_eq!(join_producers(threads), 1);
    }
}
