//! Per-tick output of the loop.

use std::fmt;

use av_behavior::{BehaviorState, BehaviorTag, LocalPath};
use av_control::{ControlCommand, ControlError};
use av_core::{Polygon, Pose, Tick, VehicleState};
use av_map::{GlobalPath, PlanningError};
use av_perception::StaleInput;

/// A non-fatal condition raised during a tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    Planning(PlanningError),
    Control(ControlError),
    /// A perception input is older than the staleness bound.
    StaleSnapshot(StaleInput),
}

impl Diagnostic {
    /// Short category name for tabular output.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::Planning(_)      => "planning",
            Diagnostic::Control(_)       => "control",
            Diagnostic::StaleSnapshot(_) => "stale_snapshot",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Planning(e) => write!(f, "planning: {e}"),
            Diagnostic::Control(e) => write!(f, "control: {e}"),
            Diagnostic::StaleSnapshot(s) => {
                write!(f, "stale {} input ({:.2} s old)", s.input.as_str(), s.age_secs)
            }
        }
    }
}

/// Pose of the vehicle frame in the global frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub parent: String,
    pub child: String,
    pub pose: Pose,
}

/// Everything the loop publishes for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub tick: Tick,
    pub sim_time_secs: f64,
    /// The committed state at the end of the tick.
    pub vehicle: VehicleState,
    pub transform: Transform,
    pub tag: BehaviorTag,
    pub state: BehaviorState,
    pub safety_border: Polygon,
    pub local_path: LocalPath,
    pub target_speed: f64,
    pub command: ControlCommand,
    pub path_index: usize,
    /// Conditions raised this tick.
    pub diagnostics: Vec<Diagnostic>,
    /// Most recent error condition, kept until a plan succeeds.
    pub last_error: Option<Diagnostic>,
}

/// Callbacks invoked by [`Sim`](crate::Sim) at key points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimObserver {
    /// Called at the very start of each tick, before the inputs are read.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after every successful global planning call.
    fn on_paths_planned(&mut self, _tick: Tick, _paths: &[GlobalPath]) {}

    /// Called once the tick's state has been committed.
    fn on_tick_end(&mut self, _report: &TickReport) {}

    /// Called once when `Sim::run` returns.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
