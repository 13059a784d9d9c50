//! Fluent builder for constructing a [`Sim`].

use av_control::PathTracker;
use av_core::{Pose, Settings};
use av_map::{GlobalPlanner, RoadNetwork};

use crate::{Sim, SimError, SimHandle, SimResult};

/// Fluent builder for [`Sim<P, T>`].
///
/// # Required inputs
///
/// - [`Settings`] — validated on `build`
/// - [`RoadNetwork`] — from [`av_map::load_network`] or a builder
/// - `P: GlobalPlanner` — e.g. [`av_map::DijkstraPlanner`]
/// - `T: PathTracker` — e.g. [`av_control::PurePursuitFollower`]
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                  |
/// |-------------------|--------------------------|
/// | `.handle(h)`      | a fresh `SimHandle`      |
/// | `.start_pose(p)`  | `settings.sim.start_pose` |
/// | `.goal_pose(p)`   | `settings.sim.goal_pose`  |
///
/// # Example
///
/// ```rust,ignore
/// let planner = DijkstraPlanner::new(&settings.planning);
/// let tracker = PurePursuitFollower::new(settings.car.clone(), settings.controller.clone());
/// let mut sim = SimBuilder::new(settings, network, planner, tracker)
///     .start_pose(Pose::new(0.0, 0.0, 0.0))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<P: GlobalPlanner, T: PathTracker> {
    settings: Settings,
    network:  RoadNetwork,
    planner:  P,
    tracker:  T,
    handle:   Option<SimHandle>,
}

impl<P: GlobalPlanner, T: PathTracker> SimBuilder<P, T> {
    pub fn new(settings: Settings, network: RoadNetwork, planner: P, tracker: T) -> Self {
        Self { settings, network, planner, tracker, handle: None }
    }

    /// Use an existing handle, so producers can be wired before the sim
    /// exists.
    pub fn handle(mut self, handle: SimHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn start_pose(mut self, pose: Pose) -> Self {
        self.settings.sim.start_pose = Some(pose);
        self
    }

    pub fn goal_pose(mut self, pose: Pose) -> Self {
        self.settings.sim.goal_pose = Some(pose);
        self
    }

    /// Validate the settings and the network and return a ready-to-run
    /// [`Sim`].
    pub fn build(self) -> SimResult<Sim<P, T>> {
        self.settings.validate()?;
        if self.network.is_empty() {
            return Err(SimError::EmptyNetwork);
        }
        Ok(Sim::new(
            self.settings,
            self.network,
            self.planner,
            self.tracker,
            self.handle.unwrap_or_default(),
        ))
    }
}
