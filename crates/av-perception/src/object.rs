//! Perceived obstacles and traffic signals.
//!
//! Both arrive as whole lists that replace the previous list; nothing is
//! merged across updates.

use std::fmt;

use serde::{Deserialize, Serialize};

use av_core::{LightId, ObjectId, Point2, Polygon, Pose, Segment};

// ── DetectedObject ────────────────────────────────────────────────────────────

/// Where a detection came from.  The decision maker treats both alike.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectSource {
    #[default]
    Real,
    Fake,
}

/// One obstacle with an oriented bounding box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub id: ObjectId,
    /// Box centre and heading in the global frame.
    pub pose: Pose,
    /// Speed along `pose.yaw`, m/s.
    pub velocity: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    pub source: ObjectSource,
    pub stamp_secs: f64,
}

impl DetectedObject {
    /// A stationary real object.
    pub fn new(id: ObjectId, pose: Pose, length: f64, width: f64) -> Self {
        Self {
            id,
            pose,
            velocity: 0.0,
            length,
            width,
            height: 1.5,
            label: "unknown".to_string(),
            source: ObjectSource::Real,
            stamp_secs: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Point2 {
        self.pose.position()
    }

    /// Ground-plane bounding box.
    pub fn footprint(&self) -> Polygon {
        Polygon::rectangle(self.pose, self.length, self.width)
    }
}

// ── TrafficLight ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightState {
    Stop,
    Caution,
    Go,
    #[default]
    Unknown,
}

impl LightState {
    pub fn as_str(self) -> &'static str {
        match self {
            LightState::Stop    => "stop",
            LightState::Caution => "caution",
            LightState::Go      => "go",
            LightState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal and the stop line it governs.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficLight {
    pub id: LightId,
    pub state: LightState,
    pub stop_line: Segment,
}

impl TrafficLight {
    pub fn new(id: LightId, state: LightState, stop_line: Segment) -> Self {
        Self { id, state, stop_line }
    }

    /// Same light and stop line with a different state.
    pub fn with_state(self, state: LightState) -> Self {
        Self { state, ..self }
    }
}
