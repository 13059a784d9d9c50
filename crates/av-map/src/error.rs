//! Map and planning error types.

use thiserror::Error;

use av_core::{AvError, WaypointId};

/// Errors produced while loading a road network.  All of them are start-up
/// failures.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map source is `preloaded` but no network was supplied")]
    MissingPreloaded,

    #[error("map source produced an empty road network")]
    EmptyNetwork,

    #[error("lane {lane} references unknown lane {target}")]
    UnknownLane { lane: u32, target: u32 },

    #[error("CSV parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MapResult<T> = Result<T, MapError>;

impl From<MapError> for AvError {
    fn from(e: MapError) -> Self {
        match e {
            MapError::Io(io) => AvError::Io(io),
            other => AvError::ConfigurationInvalid(other.to_string()),
        }
    }
}

/// Global-planning failures.  Non-fatal: the loop holds position and waits
/// for a new start or goal.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PlanningError {
    #[error("no path from {from} to {to} within the search bound")]
    NoPathFound { from: WaypointId, to: WaypointId },

    #[error("pose is {distance_m:.2} m from the nearest waypoint (snap radius {radius_m:.2} m)")]
    PoseOffRoad { distance_m: f64, radius_m: f64 },
}
