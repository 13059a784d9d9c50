//! The path-tracking seam between behavior and vehicle motion.

use serde::{Deserialize, Serialize};

use av_core::{Point2, VehicleState};

use crate::ControlResult;

/// Actuation applied during one step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    /// Speed reached at the end of the step, m/s.
    pub speed: f64,
    /// Longitudinal acceleration applied, m/s².
    pub accel: f64,
    /// Front-wheel steering angle, rad.
    pub steer: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepOutput {
    pub command: ControlCommand,
    pub next: VehicleState,
    /// Signed distance of the vehicle centre from the path; positive = left.
    pub lateral_error: f64,
    /// Vehicle yaw minus path heading at the closest point, rad.
    pub heading_error: f64,
}

/// Pluggable path tracker.  `av-sim` drives the vehicle through this trait
/// only, so a Stanley or MPC tracker can replace pure pursuit.
pub trait PathTracker: Send {
    /// Advance `current` by `dt` seconds along `path` toward `target_speed`.
    fn step(
        &mut self,
        current: &VehicleState,
        path: &[Point2],
        target_speed: f64,
        dt: f64,
    ) -> ControlResult<StepOutput>;
}
