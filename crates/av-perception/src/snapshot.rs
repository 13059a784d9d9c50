//! The per-tick view of perception.
//!
//! An input older than the staleness bound carries *no information*: it is
//! reported as `None` (not as an empty list) so the decision maker can hold
//! whatever state depended on it.  An input that was never published is
//! also `None`, but is not flagged as stale.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{DetectedObject, SnapshotCell, Stamped, TrafficLight};

/// Which perception input a staleness flag refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerceptionInput {
    Objects,
    Lights,
}

impl PerceptionInput {
    pub fn as_str(self) -> &'static str {
        match self {
            PerceptionInput::Objects => "objects",
            PerceptionInput::Lights  => "lights",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaleInput {
    pub input: PerceptionInput,
    pub age_secs: f64,
}

/// Objects and lights as read at one tick boundary.
#[derive(Clone, Debug, Default)]
pub struct PerceptionSnapshot {
    objects: Option<Arc<Stamped<Vec<DetectedObject>>>>,
    lights: Option<Arc<Stamped<Vec<TrafficLight>>>>,
    pub stale: Vec<StaleInput>,
}

impl PerceptionSnapshot {
    /// Read both cells once and classify each value against `now_secs`.
    pub fn capture(
        objects: &SnapshotCell<Vec<DetectedObject>>,
        lights: &SnapshotCell<Vec<TrafficLight>>,
        now_secs: f64,
        staleness_secs: f64,
    ) -> Self {
        let mut stale = Vec::new();
        let objects = fresh(objects.latest(), PerceptionInput::Objects, now_secs, staleness_secs, &mut stale);
        let lights = fresh(lights.latest(), PerceptionInput::Lights, now_secs, staleness_secs, &mut stale);
        Self { objects, lights, stale }
    }

    /// A snapshot that knows the world is empty (both inputs fresh).
    pub fn clear_road() -> Self {
        Self::from_values(Vec::new(), Vec::new())
    }

    /// Fresh snapshot from plain values, for callers that own their inputs.
    pub fn from_values(objects: Vec<DetectedObject>, lights: Vec<TrafficLight>) -> Self {
        Self {
            objects: Some(Arc::new(Stamped { value: objects, stamp_secs: 0.0, version: 0 })),
            lights: Some(Arc::new(Stamped { value: lights, stamp_secs: 0.0, version: 0 })),
            stale: Vec::new(),
        }
    }

    /// Current objects, or `None` when unknown.
    pub fn objects(&self) -> Option<&[DetectedObject]> {
        self.objects.as_deref().map(|s| s.value.as_slice())
    }

    /// Current lights, or `None` when unknown.
    pub fn lights(&self) -> Option<&[TrafficLight]> {
        self.lights.as_deref().map(|s| s.value.as_slice())
    }

    pub fn is_stale(&self, input: PerceptionInput) -> bool {
        self.stale.iter().any(|s| s.input == input)
    }
}

fn fresh<T>(
    value: Option<Arc<Stamped<T>>>,
    input: PerceptionInput,
    now_secs: f64,
    staleness_secs: f64,
    stale: &mut Vec<StaleInput>,
) -> Option<Arc<Stamped<T>>> {
    let value = value?;
    let age_secs = now_secs - value.stamp_secs;
    if age_secs > staleness_secs {
        stale.push(StaleInput { input, age_secs });
        None
    } else {
        Some(value)
    }
}
