//! Pure-pursuit steering with proportional speed control.
//!
//! Lateral: the target point lies `lookahead` metres along the path past
//! the rear axle's projection; the steering angle is the one whose arc
//! passes through it, `δ = atan2(2·wb·sin α, lookahead)`.
//!
//! Longitudinal: `a = kp·(target − v)`, clamped to the car's limits.
//!
//! Motion: explicit-Euler kinematic bicycle about the footprint centre,
//! `x += v·cos ψ·dt`, `y += v·sin ψ·dt`, `ψ += v/wb·tan δ·dt`, `v += a·dt`.

use tracing::trace;

use av_core::polyline;
use av_core::{CarInfo, ControllerParams, Point2, Pose, VehicleState, normalize_angle};

use crate::{ControlCommand, ControlError, ControlResult, PathTracker, StepOutput};

/// Below this speed error the speed is set to the target outright, so a
/// zero target settles at exactly zero.
const SPEED_SNAP: f64 = 1e-3;

#[derive(Clone, Debug)]
pub struct PurePursuitFollower {
    car: CarInfo,
    params: ControllerParams,
}

impl PurePursuitFollower {
    pub fn new(car: CarInfo, params: ControllerParams) -> Self {
        Self { car, params }
    }

    pub fn lookahead(&self, v: f64) -> f64 {
        let p = &self.params;
        (p.lookahead_gain * v + p.min_lookahead_m).clamp(p.min_lookahead_m, p.max_lookahead_m)
    }

    /// Steering angle for `current` toward the lookahead point, clamped.
    fn steer(&self, current: &VehicleState, path: &[Point2]) -> Option<f64> {
        let rear = current.rear_axle(self.car.wheelbase_m);
        let s_rear = polyline::project(path, rear)?.s;
        let lf = self.lookahead(current.v);
        let (target, _) = polyline::point_at(path, s_rear + lf)?;
        let alpha = normalize_angle(rear.heading_to(target) - current.pose.yaw);
        let delta = (2.0 * self.car.wheelbase_m * alpha.sin()).atan2(lf);
        Some(delta.clamp(-self.car.max_steer_angle, self.car.max_steer_angle))
    }

    fn next_speed(&self, v: f64, target: f64, dt: f64) -> (f64, f64) {
        let target = target.clamp(0.0, self.car.max_speed);
        let accel = (self.params.speed_kp * (target - v)).clamp(-self.car.max_decel, self.car.max_accel);
        let mut next = v + accel * dt;
        // Never step past the target.
        if (target - next).abs() < SPEED_SNAP || (target - v).signum() != (target - next).signum() {
            next = target;
        }
        let next = next.clamp(0.0, self.car.max_speed);
        (next, (next - v) / dt)
    }
}

impl PathTracker for PurePursuitFollower {
    fn step(
        &mut self,
        current: &VehicleState,
        path: &[Point2],
        target_speed: f64,
        dt: f64,
    ) -> ControlResult<StepOutput> {
        if path.is_empty() {
            return Err(ControlError::NoActivePath);
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ControlError::InvalidTimeStep(dt));
        }
        let closest = polyline::project(path, current.position()).ok_or(ControlError::NoActivePath)?;
        let steer = self.steer(current, path).unwrap_or(0.0);
        let (v_next, accel) = self.next_speed(current.v, target_speed, dt);

        let v = current.v;
        let yaw = current.pose.yaw;
        let omega = v / self.car.wheelbase_m * steer.tan();
        let pose = Pose::new(
            current.pose.x + v * yaw.cos() * dt,
            current.pose.y + v * yaw.sin() * dt,
            normalize_angle(yaw + omega * dt),
        );
        let next = VehicleState { pose, v: v_next, omega, steer, stamp_secs: current.stamp_secs + dt };
        trace!(v = v_next, steer, lateral = closest.lateral, "follower step");

        Ok(StepOutput {
            command: ControlCommand { speed: v_next, accel, steer },
            next,
            lateral_error: closest.lateral,
            heading_error: normalize_angle(yaw - closest.heading),
        })
    }
}

/// Keep the vehicle where it is with zero velocity, for ticks without a
/// usable path.
pub fn hold_position(current: &VehicleState, dt: f64) -> StepOutput {
    let next = VehicleState::stationary(current.pose, current.stamp_secs + dt);
    StepOutput { command: ControlCommand::default(), next, lateral_error: 0.0, heading_error: 0.0 }
}
