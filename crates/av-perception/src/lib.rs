//! `av-perception` — what the vehicle knows about the world each tick.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`object`]   | `DetectedObject`, `ObjectSource`, `TrafficLight`, `LightState` |
//! | [`cell`]     | `SnapshotCell<T>`, `Stamped<T>` (single writer, single reader) |
//! | [`snapshot`] | `PerceptionSnapshot` with staleness, `StaleInput`          |
//! | [`fake`]     | `FakeObjectGenerator`, `FakeObjectParams`                  |
//! | [`error`]    | `PerceptionError`, `PerceptionResult<T>`                   |

pub mod cell;
pub mod error;
pub mod fake;
pub mod object;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use cell::{SnapshotCell, Stamped};
pub use error::{PerceptionError, PerceptionResult};
pub use fake::{FakeObjectGenerator, FakeObjectParams};
pub use object::{DetectedObject, LightState, ObjectSource, TrafficLight};
pub use snapshot::{PerceptionInput, PerceptionSnapshot, StaleInput};
