//! `av-core` — foundational types for the `rust_av` vehicle simulator.
//!
//! This crate is a dependency of every other `av-*` crate.  It has no `av-*`
//! dependencies and only `thiserror`, `serde` and `toml` externally.
//!
//! # What lives here
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`ids`]       | `WaypointId`, `EdgeId`, `LaneId`, `ObjectId`, `LightId`    |
//! | [`geo`]       | `Point2`, `Pose`, `Segment`, angle helpers                 |
//! | [`polyline`]  | closest-point projection, arc length, slicing, curvature   |
//! | [`polygon`]   | `Polygon` with containment and overlap tests               |
//! | [`time`]      | `Tick`, `SimClock`                                         |
//! | [`vehicle`]   | `VehicleState` (pose + velocities)                         |
//! | [`config`]    | `Settings`, `CarInfo`, `ControllerParams`, `PlanningParams`, `SimParams`, `MapSource` |
//! | [`error`]     | `AvError`, `AvResult`                                      |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod polygon;
pub mod polyline;
pub mod time;
pub mod vehicle;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CarInfo, ControllerParams, MapSource, PlanningParams, Settings, SimParams};
pub use error::{AvError, AvResult};
pub use geo::{Point2, Pose, Segment, normalize_angle};
pub use ids::{EdgeId, LaneId, LightId, ObjectId, WaypointId};
pub use polygon::Polygon;
pub use polyline::Projection;
pub use time::{SimClock, Tick};
pub use vehicle::VehicleState;
