//! Plain data row types written by output backends.

use av_sim::{Diagnostic, TickReport};

/// The committed vehicle state and decision of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickRow {
    pub tick:          u64,
    pub sim_time_secs: f64,
    pub x:             f64,
    pub y:             f64,
    pub yaw:           f64,
    pub v:             f64,
    pub steer:         f64,
    /// `BehaviorTag::as_str` of the active state.
    pub state:         &'static str,
    pub target_speed:  f64,
    pub path_index:    u32,
    /// Points in the local path window.
    pub local_points:  u32,
    /// `Display` of the sticky error condition; empty when there is none.
    pub last_error:    String,
}

impl From<&TickReport> for TickRow {
    fn from(r: &TickReport) -> Self {
        Self {
            tick:          r.tick.0,
            sim_time_secs: r.sim_time_secs,
            x:             r.vehicle.pose.x,
            y:             r.vehicle.pose.y,
            yaw:           r.vehicle.pose.yaw,
            v:             r.vehicle.v,
            steer:         r.vehicle.steer,
            state:         r.tag.as_str(),
            target_speed:  r.target_speed,
            path_index:    r.path_index as u32,
            local_points:  r.local_path.points.len() as u32,
            last_error:    r.last_error.as_ref().map(ToString::to_string).unwrap_or_default(),
        }
    }
}

/// One condition raised during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRow {
    pub tick:    u64,
    pub kind:    &'static str,
    pub message: String,
}

impl DiagnosticRow {
    pub fn new(tick: u64, d: &Diagnostic) -> Self {
        Self { tick, kind: d.kind(), message: d.to_string() }
    }
}
