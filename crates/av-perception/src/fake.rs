//! Synthetic obstacle generator.
//!
//! A fake object is placed at an initial pose and then moves with constant
//! speed and yaw rate until its lifetime expires.  The pose is computed in
//! closed form from the time since placement, so it does not depend on
//! how often the generator is polled.  Real detections pass through
//! unchanged and the fake one is appended.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use av_core::{ObjectId, Pose, normalize_angle};

use crate::{DetectedObject, ObjectSource, PerceptionError, PerceptionResult};

/// Seed-mixing constant (64-bit fractional golden ratio).
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FakeObjectParams {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// m/s along the object's heading.
    pub velocity: f64,
    /// rad/s
    pub angular_velocity: f64,
    /// Seconds after placement the object disappears; negative = never.
    pub lifetime_secs: f64,
    pub label: String,
    /// Half-width of the uniform position jitter added to each sample, m.
    pub position_noise_m: f64,
    pub seed: u64,
}

impl Default for FakeObjectParams {
    fn default() -> Self {
        Self {
            length:           4.4,
            width:            1.8,
            height:           1.5,
            velocity:         0.0,
            angular_velocity: 0.0,
            lifetime_secs:    -1.0,
            label:            "fake".to_string(),
            position_noise_m: 0.0,
            seed:             0,
        }
    }
}

pub struct FakeObjectGenerator {
    id: ObjectId,
    params: FakeObjectParams,
    /// Initial pose and the time it was set.
    origin: Option<(Pose, f64)>,
    rng: SmallRng,
}

impl FakeObjectGenerator {
    pub fn new(id: ObjectId, params: FakeObjectParams) -> PerceptionResult<Self> {
        for (name, v) in [("length", params.length), ("width", params.width), ("height", params.height)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(PerceptionError::InvalidFakeObject(format!("{name} must be positive, got {v}")));
            }
        }
        if !(params.position_noise_m.is_finite() && params.position_noise_m >= 0.0) {
            return Err(PerceptionError::InvalidFakeObject(format!(
                "position_noise_m must be non-negative, got {}",
                params.position_noise_m
            )));
        }
        let rng = SmallRng::seed_from_u64(params.seed ^ (id.0 as u64).wrapping_mul(MIXING_CONSTANT));
        Ok(Self { id, params, origin: None, rng })
    }

    /// Place (or re-place) the object; restarts its lifetime.
    pub fn set_initial_pose(&mut self, pose: Pose, now_secs: f64) {
        debug!(id = %self.id, %pose, "fake object placed");
        self.origin = Some((pose, now_secs));
    }

    /// Remove the object until it is placed again.
    pub fn clear(&mut self) {
        self.origin = None;
    }

    /// `true` while a placed object has not outlived its lifetime.
    pub fn is_alive(&self, now_secs: f64) -> bool {
        match self.origin {
            None => false,
            Some((_, t0)) => self.params.lifetime_secs < 0.0 || now_secs - t0 <= self.params.lifetime_secs,
        }
    }

    /// The fake object at `now_secs`, or `None` when unplaced or expired.
    pub fn sample(&mut self, now_secs: f64) -> Option<DetectedObject> {
        if !self.is_alive(now_secs) {
            return None;
        }
        let (origin, t0) = self.origin?;
        let mut pose = advance(origin, self.params.velocity, self.params.angular_velocity, now_secs - t0);
        let n = self.params.position_noise_m;
        if n > 0.0 {
            pose.x += self.rng.gen_range(-n..=n);
            pose.y += self.rng.gen_range(-n..=n);
        }
        Some(DetectedObject {
            id: self.id,
            pose,
            velocity: self.params.velocity,
            length: self.params.length,
            width: self.params.width,
            height: self.params.height,
            label: self.params.label.clone(),
            source: ObjectSource::Fake,
            stamp_secs: now_secs,
        })
    }

    /// Real detections followed by the fake object, if alive.
    pub fn merge(&mut self, real: &[DetectedObject], now_secs: f64) -> Vec<DetectedObject> {
        let mut out = Vec::with_capacity(real.len() + 1);
        out.extend_from_slice(real);
        out.extend(self.sample(now_secs));
        out
    }
}

/// Unicycle motion from `pose` for `t` seconds.
fn advance(pose: Pose, v: f64, w: f64, t: f64) -> Pose {
    let t = t.max(0.0);
    if w.abs() < 1e-9 {
        return Pose::new(pose.x + v * t * pose.yaw.cos(), pose.y + v * t * pose.yaw.sin(), pose.yaw);
    }
    let yaw = pose.yaw + w * t;
    let r = v / w;
    Pose::new(
        pose.x + r * (yaw.sin() - pose.yaw.sin()),
        pose.y - r * (yaw.cos() - pose.yaw.cos()),
        normalize_angle(yaw),
    )
}
