//! `av-sim` — fixed-rate tick loop for the rust_av simulator.
//!
//! # Tick loop
//!
//! ```text
//! loop:
//!   ⓪ Gate      — step-by-step mode only: wait for one step signal.
//!   ① Inputs    — consume new pose / goal requests; snapshot objects and
//!                 lights (most recent value, staleness-checked).
//!   ② Plan      — when start or goal changed: GlobalPlanner, once.
//!   ③ Decide    — DecisionMaker: state, local path, target speed, border.
//!   ④ Follow    — PathTracker integrates one period (hold on failure).
//!   ⑤ Commit    — new VehicleState; TickReport to the observer.
//! ```
//!
//! Inputs arrive on other threads through [`SimHandle`]; the loop owns the
//! vehicle and behavior state and is the only thread that writes them.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use av_control::PurePursuitFollower;
//! use av_map::DijkstraPlanner;
//! use av_sim::{NoopObserver, SimBuilder};
//!
//! let planner = DijkstraPlanner::new(&settings.planning);
//! let tracker = PurePursuitFollower::new(settings.car.clone(), settings.controller.clone());
//! let mut sim = SimBuilder::new(settings, network, planner, tracker).build()?;
//! let handle = sim.handle();
//! handle.publish_goal(goal);
//! sim.run_ticks(100, &mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod handle;
pub mod observer;
pub mod sim;
pub mod trace;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use handle::{SimHandle, SimInputs, StepGate};
pub use observer::{Diagnostic, NoopObserver, SimObserver, TickReport, Transform};
pub use sim::Sim;
pub use trace::SimulationTrace;
