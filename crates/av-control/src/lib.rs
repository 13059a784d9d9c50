//! `av-control` — turning a local path and a target speed into motion.
//!
//! # Crate layout
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`tracker`]      | `PathTracker` trait, `ControlCommand`, `StepOutput`    |
//! | [`pure_pursuit`] | `PurePursuitFollower`, `hold_position`                 |
//! | [`error`]        | `ControlError`, `ControlResult<T>`                     |
//!
//! The follower owns no world state: each call takes the current vehicle
//! state and returns the next one, so the simulation loop stays the only
//! writer of the authoritative `VehicleState`.

pub mod error;
pub mod pure_pursuit;
pub mod tracker;


pub use error::{ControlError, ControlResult};
pub use pure_pursuit::{PurePursuitFollower, hold_position};
pub use tracker::{ControlCommand, PathTracker, StepOutput};
