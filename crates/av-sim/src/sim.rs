//! The `Sim` struct and its tick loop.

use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use av_behavior::{BehaviorTag, Decision, DecisionMaker};
use av_control::{PathTracker, StepOutput, hold_position};
use av_core::{Pose, Settings, SimClock, Tick, VehicleState};
use av_map::{GlobalPath, GlobalPlanner, RoadNetwork};
use av_perception::PerceptionSnapshot;

use crate::{
    Diagnostic, SimError, SimHandle, SimObserver, SimResult, SimulationTrace, TickReport, Transform,
};

/// The main simulation runner.
///
/// One tick:
///
/// 1. **Inputs**: consume a new initial-pose or goal request, then capture
///    the perception snapshot (most recent value of each cell).
/// 2. **Plan**: if the start or goal changed, run the global planner once.
/// 3. **Decide**: the decision maker picks the state and local path.
/// 4. **Follow**: the tracker integrates the vehicle by one period.
/// 5. **Commit** the new `VehicleState` and report it.
///
/// In step-by-step mode `run` waits on the step gate before step 1.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<P: GlobalPlanner, T: PathTracker> {
    pub settings: Settings,
    pub clock: SimClock,
    network: RoadNetwork,
    planner: P,
    tracker: T,
    decision: DecisionMaker,
    handle: SimHandle,

    /// The authoritative vehicle state; written only by `tick`.
    vehicle: VehicleState,
    /// `None` until an initial pose is known.
    start: Option<Pose>,
    goal: Option<Pose>,
    paths: Vec<GlobalPath>,
    replan: bool,
    /// Versions of the pose cells already consumed.
    seen_initial_pose: u64,
    seen_goal: u64,
    last_error: Option<Diagnostic>,
}

impl<P: GlobalPlanner, T: PathTracker> Sim<P, T> {
    pub(crate) fn new(
        settings: Settings,
        network: RoadNetwork,
        planner: P,
        tracker: T,
        handle: SimHandle,
    ) -> Self {
        let clock = SimClock::new(settings.sim.tick_hz);
        let decision = DecisionMaker::new(settings.car.clone(), settings.planning.clone());
        let start = settings.sim.start_pose;
        let goal = settings.sim.goal_pose;
        Self {
            clock,
            network,
            planner,
            tracker,
            decision,
            handle,
            vehicle: VehicleState::stationary(start.unwrap_or_default(), 0.0),
            start,
            goal,
            paths: Vec::new(),
            replan: start.is_some() && goal.is_some(),
            seen_initial_pose: 0,
            seen_goal: 0,
            last_error: None,
            settings,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// A handle for feeding inputs from other threads.
    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn paths(&self) -> &[GlobalPath] {
        &self.paths
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn goal(&self) -> Option<Pose> {
        self.goal
    }

    pub fn last_error(&self) -> Option<&Diagnostic> {
        self.last_error.as_ref()
    }

    /// Tick until [`SimHandle::shutdown`].
    ///
    /// Real-time mode sleeps to hold `sim.tick_hz`; step-by-step mode waits
    /// for one step signal per tick.  Shutdown cancels either wait.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let period = self.clock.period();
        let mut deadline = Instant::now();
        let sim = &self.settings.sim;
        info!(vehicle = sim.id, hz = sim.tick_hz, step_by_step = sim.step_by_step, "simulation started");
        while !self.handle.is_shutdown() {
            if self.settings.sim.step_by_step {
                if !self.handle.inputs().gate.wait() {
                    break;
                }
            } else {
                deadline += period;
                let now = Instant::now();
                if deadline > now {
                    thread::sleep(deadline - now);
                } else {
                    deadline = now;
                }
                if self.handle.is_shutdown() {
                    break;
                }
            }
            self.tick(observer);
        }
        info!(vehicle = self.settings.sim.id, tick = %self.clock.current_tick, "simulation stopped");
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks without pacing or gating.
    ///
    /// Useful for tests and batch runs.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.tick(observer);
        }
    }

    /// Run one tick and return its report.
    pub fn tick<O: SimObserver>(&mut self, observer: &mut O) -> TickReport {
        let now = self.clock.current_tick;
        let now_secs = self.clock.elapsed_secs();
        self.handle.set_sim_time(now_secs);
        observer.on_tick_start(now);

        let mut diagnostics = Vec::new();
        self.consume_pose_requests(now_secs);
        let inputs = self.handle.inputs();
        let perception = PerceptionSnapshot::capture(
            &inputs.objects,
            &inputs.lights,
            now_secs,
            self.settings.planning.staleness_secs,
        );
        diagnostics.extend(perception.stale.iter().copied().map(Diagnostic::StaleSnapshot));

        if self.replan {
            self.replan = false;
            if let Some(d) = self.plan(now, observer) {
                diagnostics.push(d);
            }
        }

        let decision = self.decision.update(&self.vehicle, &perception);
        let step = self.follow(&decision, &mut diagnostics);
        self.vehicle = step.next;

        if decision.tag == BehaviorTag::GoalReached && self.settings.sim.looper {
            self.turn_around();
        }
        if let Some(d) = diagnostics.iter().rev().find(|d| !matches!(d, Diagnostic::StaleSnapshot(_))) {
            self.last_error = Some(d.clone());
        }

        let report = TickReport {
            tick: now,
            sim_time_secs: now_secs,
            vehicle: self.vehicle,
            transform: Transform {
                parent: self.settings.sim.global_frame.clone(),
                child: self.settings.sim.vehicle_frame.clone(),
                pose: self.vehicle.pose,
            },
            tag: decision.tag,
            state: decision.state,
            safety_border: decision.safety_border,
            local_path: decision.local_path,
            target_speed: decision.target_speed,
            command: step.command,
            path_index: decision.path_index,
            diagnostics,
            last_error: self.last_error.clone(),
        };
        observer.on_tick_end(&report);
        self.clock.advance();
        report
    }

    /// Put the vehicle at rest at `pose`, discard decision state and replan
    /// if a goal is known.
    pub fn reinitialize(&mut self, pose: Pose) {
        info!(%pose, "vehicle re-initialised");
        self.vehicle = VehicleState::stationary(pose, self.clock.elapsed_secs());
        self.start = Some(pose);
        self.decision.reset();
        self.paths.clear();
        self.replan = self.goal.is_some();
    }

    /// Plan to `pose` on the next tick.
    pub fn set_goal(&mut self, pose: Pose) {
        info!(%pose, "goal set");
        self.goal = Some(pose);
        self.replan = self.start.is_some();
    }

    /// Start, goal and map of this run.
    pub fn trace(&self) -> SimulationTrace {
        SimulationTrace {
            start_pose: self.start,
            goal_pose: self.goal,
            map_source: self.settings.sim.map_source.identifier(),
        }
    }

    /// Restart from a recorded trace.  The trace must come from the same map.
    pub fn resume(&mut self, trace: &SimulationTrace) -> SimResult<()> {
        let current = self.settings.sim.map_source.identifier();
        if trace.map_source != current {
            return Err(SimError::TraceMapMismatch { recorded: trace.map_source.clone(), current });
        }
        if let Some(goal) = trace.goal_pose {
            self.set_goal(goal);
        }
        if let Some(start) = trace.start_pose {
            self.reinitialize(start);
        }
        Ok(())
    }

    // ── Tick phases ───────────────────────────────────────────────────────

    fn consume_pose_requests(&mut self, now_secs: f64) {
        let inputs = self.handle.inputs();
        if inputs.initial_pose.version() == self.seen_initial_pose && inputs.goal.version() == self.seen_goal {
            return;
        }
        let pose_request = inputs
            .initial_pose
            .latest()
            .filter(|s| s.version > self.seen_initial_pose);
        let goal_request = inputs.goal.latest().filter(|s| s.version > self.seen_goal);
        if let Some(req) = pose_request {
            debug!(version = req.version, now_secs, "initial pose request");
            self.seen_initial_pose = req.version;
            self.reinitialize(req.value);
        }
        if let Some(req) = goal_request {
            debug!(version = req.version, now_secs, "goal request");
            self.seen_goal = req.version;
            self.set_goal(req.value);
        }
    }

    /// Run the planner from the current pose.  A failure leaves the vehicle
    /// without paths, so it holds position until a new start or goal.
    fn plan<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> Option<Diagnostic> {
        let goal = self.goal?;
        match self.planner.compute_global_paths(self.vehicle.pose, goal, &self.network) {
            Ok(paths) => {
                info!(
                    tick = %now,
                    paths = paths.len(),
                    length_m = paths.first().map_or(0.0, |p| p.length_m),
                    "global paths planned"
                );
                self.decision.set_paths(&paths);
                observer.on_paths_planned(now, &paths);
                self.paths = paths;
                self.last_error = None;
                None
            }
            Err(e) => {
                warn!(vehicle = self.settings.sim.id, tick = %now, error = %e, "global planning failed");
                self.decision.reset();
                self.paths.clear();
                Some(Diagnostic::Planning(e))
            }
        }
    }

    fn follow(&mut self, decision: &Decision, diagnostics: &mut Vec<Diagnostic>) -> StepOutput {
        let dt = self.clock.dt();
        match self.tracker.step(&self.vehicle, &decision.local_path.points, decision.target_speed, dt) {
            Ok(out) => out,
            Err(e) => {
                // Without paths (no goal yet, or planning failed and already
                // reported) holding is the expected behaviour.
                if !self.paths.is_empty() {
                    warn!(error = %e, "follower failed, holding position");
                    diagnostics.push(Diagnostic::Control(e));
                }
                hold_position(&self.vehicle, dt)
            }
        }
    }

    /// Looper mode: swap the patrol endpoints and plan back.
    fn turn_around(&mut self) {
        let Some(back) = self.start else { return };
        info!(to = %back, "goal reached, patrolling back");
        self.start = self.goal;
        self.goal = Some(back);
        self.replan = true;
    }
}
