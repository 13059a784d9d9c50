//! Start-up configuration.
//!
//! Four parameter groups mirror the four consumers: vehicle physics
//! ([`CarInfo`]), the trajectory follower ([`ControllerParams`]), global and
//! local planning ([`PlanningParams`]), and the loop itself ([`SimParams`]).
//! They are loaded once, validated, and never mutated afterwards — changing a
//! parameter means building a fresh simulator.
//!
//! # File format
//!
//! ```toml
//! [car]
//! max_speed = 10.0
//!
//! [planning]
//! snap_radius_m = 4.0
//!
//! [sim]
//! tick_hz = 10.0
//! looper  = true
//! map_source = { kind = "file", path = "maps/loop.csv" }
//! start_pose = { x = 0.0, y = 0.0, yaw = 0.0 }
//! ```
//!
//! Every field has a default, so a partial (or empty) file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{AvError, AvResult, Pose};

// ── CarInfo ───────────────────────────────────────────────────────────────────

/// Physical limits of the simulated vehicle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarInfo {
    pub wheelbase_m: f64,
    pub length_m: f64,
    pub width_m: f64,
    /// m/s
    pub max_speed: f64,
    /// m/s²
    pub max_accel: f64,
    /// m/s², positive magnitude
    pub max_decel: f64,
    /// rad
    pub max_steer_angle: f64,
}

impl Default for CarInfo {
    fn default() -> Self {
        Self {
            wheelbase_m:     2.7,
            length_m:        4.5,
            width_m:         1.85,
            max_speed:       10.0,
            max_accel:       1.5,
            max_decel:       4.0,
            max_steer_angle: 0.6,
        }
    }
}

// ── ControllerParams ──────────────────────────────────────────────────────────

/// Pure-pursuit and speed-loop gains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerParams {
    /// Seconds of travel added to the lookahead distance per m/s of speed.
    pub lookahead_gain: f64,
    pub min_lookahead_m: f64,
    pub max_lookahead_m: f64,
    /// Proportional gain of the speed loop, 1/s.
    pub speed_kp: f64,
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            lookahead_gain:  0.5,
            min_lookahead_m: 3.0,
            max_lookahead_m: 15.0,
            speed_kp:        3.0,
        }
    }
}

// ── PlanningParams ────────────────────────────────────────────────────────────

/// Global search limits, local-path window, safety-border dimensions and
/// decision thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningParams {
    /// Dijkstra stops expanding beyond this cumulative distance.
    pub max_search_distance_m: f64,
    /// Start/goal poses farther than this from any waypoint are off-road.
    pub snap_radius_m: f64,
    /// Extra cost charged for each lane-change edge.
    pub lane_change_cost_m: f64,
    /// Length of the local path window ahead of the vehicle.
    pub horizon_m: f64,
    /// Lateral margin added to half the car width for the safety border.
    pub safety_lateral_margin_m: f64,
    /// Lateral margin added to half the car width for the caution envelope.
    pub caution_lateral_margin_m: f64,
    /// Gap kept to an obstacle on top of the braking distance.
    pub min_stop_gap_m: f64,
    /// Comfortable deceleration used for stop lines, goals and obstacle gaps.
    pub stop_decel: f64,
    /// Added to the braking distance when deciding whether a light is relevant.
    pub light_detection_margin_m: f64,
    /// The vehicle counts as "at the line" within this distance of it.
    pub stop_line_tolerance_m: f64,
    /// Below this speed the vehicle counts as stopped.
    pub stopped_speed: f64,
    /// Remaining distance at which the goal is reached.
    pub goal_tolerance_m: f64,
    /// Caps speed on curves: v ≤ sqrt(max_lateral_accel / |κ|).
    pub max_lateral_accel: f64,
    /// An alternate path must beat the current clearance by this much.
    pub min_clearance_gain_m: f64,
    /// Speed cap while following past a caution object no alternate clears.
    pub caution_speed: f64,
    /// Consecutive ticks of contrary evidence required to leave
    /// `AvoidingObstacle` / `EmergencyBrake` or to enter `AvoidingObstacle`.
    pub hysteresis_ticks: u32,
    /// Perception older than this is treated as "no information".
    pub staleness_secs: f64,
}

impl Default for PlanningParams {
    fn default() -> Self {
        Self {
            max_search_distance_m:    5_000.0,
            snap_radius_m:            5.0,
            lane_change_cost_m:       10.0,
            horizon_m:                40.0,
            safety_lateral_margin_m:  0.3,
            caution_lateral_margin_m: 1.5,
            min_stop_gap_m:           2.0,
            stop_decel:               1.5,
            light_detection_margin_m: 5.0,
            stop_line_tolerance_m:    1.0,
            stopped_speed:            0.1,
            goal_tolerance_m:         1.0,
            max_lateral_accel:        2.0,
            min_clearance_gain_m:     0.5,
            caution_speed:            3.0,
            hysteresis_ticks:         3,
            staleness_secs:           1.0,
        }
    }
}

// ── MapSource ─────────────────────────────────────────────────────────────────

/// Where the road network comes from.  Chosen once at start-up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum MapSource {
    /// A network handed to the builder in memory.
    #[default]
    Preloaded,
    /// Every `*.csv` lane file in a directory.
    Folder(PathBuf),
    /// A single lane CSV file.
    File(PathBuf),
}

impl MapSource {
    /// Stable identifier stored in simulation traces.
    pub fn identifier(&self) -> String {
        match self {
            MapSource::Preloaded => "preloaded".to_string(),
            MapSource::Folder(p) => format!("folder:{}", p.display()),
            MapSource::File(p)   => format!("file:{}", p.display()),
        }
    }

    /// Inverse of [`identifier`](Self::identifier).
    pub fn from_identifier(s: &str) -> AvResult<Self> {
        match s.split_once(':') {
            None if s == "preloaded" => Ok(MapSource::Preloaded),
            Some(("folder", p)) => Ok(MapSource::Folder(PathBuf::from(p))),
            Some(("file", p))   => Ok(MapSource::File(PathBuf::from(p))),
            _ => Err(AvError::Parse(format!(
                "invalid map source {s:?}: expected \"preloaded\", \"folder:<path>\" or \"file:<path>\""
            ))),
        }
    }
}

impl std::fmt::Display for MapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identifier())
    }
}

// ── SimParams ─────────────────────────────────────────────────────────────────

/// Loop-level switches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Vehicle id attached to the loop's log events.
    pub id: u32,
    /// Fixed control rate.
    pub tick_hz: f64,
    /// Wait for an external step signal before every tick.
    pub step_by_step: bool,
    /// On reaching the goal, plan back to the start and keep patrolling.
    pub looper: bool,
    /// Install a log subscriber in the binary.
    pub enable_logs: bool,
    pub map_source: MapSource,
    pub start_pose: Option<Pose>,
    pub goal_pose: Option<Pose>,
    /// Frame the published pose is expressed in.
    pub global_frame: String,
    /// Vehicle-fixed frame of the broadcast transform.
    pub vehicle_frame: String,
    /// Where simulation traces and tick output are written.
    pub log_path: PathBuf,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            id:            1,
            tick_hz:       10.0,
            step_by_step:  false,
            looper:        false,
            enable_logs:   false,
            map_source:    MapSource::Preloaded,
            start_pose:    None,
            goal_pose:     None,
            global_frame:  "map".to_string(),
            vehicle_frame: "base_link".to_string(),
            log_path:      PathBuf::from("output"),
        }
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// All start-up configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub car: CarInfo,
    pub controller: ControllerParams,
    pub planning: PlanningParams,
    pub sim: SimParams,
}

impl Settings {
    /// Parse and validate settings from a TOML string.
    pub fn from_toml_str(s: &str) -> AvResult<Self> {
        let settings: Settings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a TOML settings file.
    pub fn from_file(path: &Path) -> AvResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> AvResult<()> {
        let positive = [
            ("car.wheelbase_m", self.car.wheelbase_m),
            ("car.length_m", self.car.length_m),
            ("car.width_m", self.car.width_m),
            ("car.max_speed", self.car.max_speed),
            ("car.max_accel", self.car.max_accel),
            ("car.max_decel", self.car.max_decel),
            ("car.max_steer_angle", self.car.max_steer_angle),
            ("controller.min_lookahead_m", self.controller.min_lookahead_m),
            ("controller.speed_kp", self.controller.speed_kp),
            ("planning.max_search_distance_m", self.planning.max_search_distance_m),
            ("planning.snap_radius_m", self.planning.snap_radius_m),
            ("planning.horizon_m", self.planning.horizon_m),
            ("planning.stop_decel", self.planning.stop_decel),
            ("planning.goal_tolerance_m", self.planning.goal_tolerance_m),
            ("planning.stop_line_tolerance_m", self.planning.stop_line_tolerance_m),
            ("planning.max_lateral_accel", self.planning.max_lateral_accel),
            ("planning.staleness_secs", self.planning.staleness_secs),
            ("planning.caution_speed", self.planning.caution_speed),
            ("sim.tick_hz", self.sim.tick_hz),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AvError::ConfigurationInvalid(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }

        let non_negative = [
            ("controller.lookahead_gain", self.controller.lookahead_gain),
            ("planning.lane_change_cost_m", self.planning.lane_change_cost_m),
            ("planning.safety_lateral_margin_m", self.planning.safety_lateral_margin_m),
            ("planning.min_stop_gap_m", self.planning.min_stop_gap_m),
            ("planning.light_detection_margin_m", self.planning.light_detection_margin_m),
            ("planning.stopped_speed", self.planning.stopped_speed),
            ("planning.min_clearance_gain_m", self.planning.min_clearance_gain_m),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AvError::ConfigurationInvalid(format!(
                    "{name} must be a non-negative finite number, got {value}"
                )));
            }
        }

        if self.controller.max_lookahead_m < self.controller.min_lookahead_m {
            return Err(AvError::ConfigurationInvalid(format!(
                "controller.max_lookahead_m ({}) is below min_lookahead_m ({})",
                self.controller.max_lookahead_m, self.controller.min_lookahead_m
            )));
        }
        if self.planning.caution_lateral_margin_m < self.planning.safety_lateral_margin_m {
            return Err(AvError::ConfigurationInvalid(
                "planning.caution_lateral_margin_m must be at least safety_lateral_margin_m".into(),
            ));
        }
        if self.planning.stop_decel > self.car.max_decel {
            return Err(AvError::ConfigurationInvalid(format!(
                "planning.stop_decel ({}) exceeds car.max_decel ({})",
                self.planning.stop_decel, self.car.max_decel
            )));
        }
        if self.planning.hysteresis_ticks == 0 {
            return Err(AvError::ConfigurationInvalid(
                "planning.hysteresis_ticks must be at least 1".into(),
            ));
        }
        match &self.sim.map_source {
            MapSource::Folder(p) | MapSource::File(p) if p.as_os_str().is_empty() => {
                return Err(AvError::ConfigurationInvalid(
                    "sim.map_source path is empty".into(),
                ));
            }
            _ => {}
        }
        if self.sim.global_frame.is_empty() || self.sim.vehicle_frame.is_empty() {
            return Err(AvError::ConfigurationInvalid("frame ids must not be empty".into()));
        }
        Ok(())
    }
}
