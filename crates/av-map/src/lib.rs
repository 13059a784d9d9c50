//! `av-map` — road network, map loading, and global planning.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `Waypoint`, `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder` |
//! | [`loader`]  | `load_network` for every `MapSource`, CSV lane reader        |
//! | [`planner`] | `GlobalPlanner` trait, `GlobalPath`, `DijkstraPlanner`       |
//! | [`error`]   | `MapError`, `MapResult<T>`, `PlanningError`                  |

pub mod error;
pub mod loader;
pub mod network;
pub mod planner;

#[cfg(test)]
mod tests;

pub use error::{MapError, MapResult, PlanningError};
pub use loader::{load_lanes_csv, load_lanes_reader, load_network};
pub use network::{EdgeKind, LanePoint, RoadNetwork, RoadNetworkBuilder, Waypoint};
pub use planner::{DijkstraPlanner, GlobalPath, GlobalPlanner};
