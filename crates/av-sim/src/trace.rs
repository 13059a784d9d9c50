//! Persistable record of what a simulation was asked to do.

use serde::{Deserialize, Serialize};

use av_core::Pose;

/// Start, goal and map of a run: enough to restart it from scratch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationTrace {
    pub start_pose: Option<Pose>,
    pub goal_pose: Option<Pose>,
    /// `MapSource::identifier()` of the map the run used.
    pub map_source: String,
}
