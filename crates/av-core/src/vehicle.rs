//! Kinematic state of the simulated ego vehicle.

use serde::{Deserialize, Serialize};

use crate::{Point2, Pose};

/// Pose and velocities of the vehicle at `stamp_secs`.
///
/// `pose` is the centre of the footprint.  The follower produces a new value
/// every tick; the simulation loop holds the authoritative copy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub pose: Pose,
    /// Longitudinal speed, m/s (never negative, no reversing).
    pub v: f64,
    /// Yaw rate, rad/s.
    pub omega: f64,
    /// Front-wheel steering angle applied during the last step, rad.
    pub steer: f64,
    /// Simulated time of this state.
    pub stamp_secs: f64,
}

impl VehicleState {
    /// A vehicle at rest at `pose`.
    pub fn stationary(pose: Pose, stamp_secs: f64) -> Self {
        Self { pose, v: 0.0, omega: 0.0, steer: 0.0, stamp_secs }
    }

    #[inline]
    pub fn position(&self) -> Point2 {
        self.pose.position()
    }

    /// Rear-axle centre for a vehicle with `wheelbase` metres.
    #[inline]
    pub fn rear_axle(&self, wheelbase: f64) -> Point2 {
        self.pose.ahead(-wheelbase * 0.5)
    }
}
