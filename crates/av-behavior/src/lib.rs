//! `av-behavior` — per-tick decision making.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`state`]      | `BehaviorState` tagged union, `BehaviorTag`, `BehaviorMemory` |
//! | [`geometry`]   | `PathFrame`, swept borders, stopping distances, `LocalPath`   |
//! | [`evidence`]   | `DecisionContext`, `Evidence`, `evaluate`                     |
//! | [`transition`] | pure `propose` / `transition` with hysteresis                 |
//! | [`decision`]   | `DecisionMaker`, `Decision`                                   |
//!
//! # Design notes
//!
//! One tick of decision making is split into three steps:
//!
//! 1. **Evaluate** (pure): measure the world against the current path:
//!    which objects touch the safety border or caution envelope, how far
//!    the nearest stop line is, how much route is left.  Produces
//!    [`Evidence`].
//! 2. **Transition** (pure): apply the fixed priority order to the previous
//!    state and the evidence, then damp the result with hysteresis.
//! 3. **Shape** (`DecisionMaker`): cut the local path window from the newly
//!    selected path and compute its speed profile.
//!
//! Steps 1 and 2 need no scheduler and no mutable state, so every rule can
//! be tested with hand-built evidence.

pub mod decision;
pub mod evidence;
pub mod geometry;
pub mod state;
pub mod transition;


pub use decision::{Decision, DecisionMaker};
pub use evidence::{DecisionContext, Evidence, LightSighting, evaluate};
pub use geometry::{LocalPath, PathFrame};
pub use state::{BehaviorMemory, BehaviorState, BehaviorTag};
pub use transition::{propose, transition};
