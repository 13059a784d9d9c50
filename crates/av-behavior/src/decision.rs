//! The stateful wrapper around [`evaluate`] and [`transition`].

use tracing::{debug, info};

use av_core::{CarInfo, LightId, PlanningParams, Polygon, VehicleState};
use av_map::GlobalPath;
use av_perception::{LightState, PerceptionInput, PerceptionSnapshot};

use crate::geometry::{LocalPath, PathFrame};
use crate::{BehaviorMemory, BehaviorState, BehaviorTag, DecisionContext, Evidence, evaluate, transition};

/// What the decision maker hands the follower each tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decision {
    pub tag: BehaviorTag,
    pub state: BehaviorState,
    pub local_path: LocalPath,
    /// Speed to track right now, m/s.
    pub target_speed: f64,
    pub safety_border: Polygon,
    /// Index into the planned paths of the path being followed.
    pub path_index: usize,
}

impl Decision {
    /// No path: stand still.
    pub fn idle(state: BehaviorState) -> Self {
        Self { tag: state.tag(), state, ..Self::default() }
    }
}

pub struct DecisionMaker {
    car: CarInfo,
    planning: PlanningParams,
    frames: Vec<PathFrame>,
    memory: BehaviorMemory,
    selected: usize,
    /// Light states seen on the previous fresh light input.
    last_lights: Vec<(LightId, LightState)>,
}

impl DecisionMaker {
    pub fn new(car: CarInfo, planning: PlanningParams) -> Self {
        Self {
            car,
            planning,
            frames: Vec::new(),
            memory: BehaviorMemory::default(),
            selected: 0,
            last_lights: Vec::new(),
        }
    }

    /// Install a freshly planned path set and restart in `Following`.
    pub fn set_paths(&mut self, paths: &[GlobalPath]) {
        self.frames = paths.iter().map(|p| PathFrame::new(p, &self.car, &self.planning)).collect();
        self.memory = BehaviorMemory::default();
        self.selected = 0;
    }

    /// Forget paths and state.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.memory = BehaviorMemory::default();
        self.selected = 0;
        self.last_lights.clear();
    }

    pub fn has_paths(&self) -> bool {
        self.frames.first().is_some_and(|f| !f.is_empty())
    }

    pub fn state(&self) -> &BehaviorState {
        &self.memory.state
    }

    pub fn memory(&self) -> &BehaviorMemory {
        &self.memory
    }

    /// One tick: evaluate, transition, then shape the local path.
    pub fn update(&mut self, vehicle: &VehicleState, perception: &PerceptionSnapshot) -> Decision {
        if !self.has_paths() {
            return Decision::idle(self.memory.state.clone());
        }
        self.observe_lights(perception);

        let ev = evaluate(&DecisionContext {
            vehicle,
            frames: &self.frames,
            selected: self.selected,
            prev: &self.memory.state,
            perception,
            car: &self.car,
            planning: &self.planning,
        });
        let next = transition(&self.memory, &ev, &self.planning);
        if next.state.tag() != self.memory.state.tag() {
            info!(from = %self.memory.state.tag(), to = %next.state.tag(), "behavior transition");
        }

        let previous = self.selected;
        self.selected = match next.state {
            BehaviorState::AvoidingObstacle { path_index, .. } => path_index,
            BehaviorState::EmergencyBrake { .. } | BehaviorState::StoppedAtLight { .. } => self.selected,
            _ => 0,
        }
        .min(self.frames.len() - 1);
        self.memory = next;

        // Obstacle data that has gone stale may hide anything: stop.
        let blind = perception.is_stale(PerceptionInput::Objects);
        let decision = self.shape(vehicle, &ev, previous == self.selected, blind);
        debug!(
            state = %decision.tag,
            path = decision.path_index,
            target_speed = decision.target_speed,
            points = decision.local_path.points.len(),
            "decision"
        );
        decision
    }

    /// Log light state changes against the previous fresh light input.
    fn observe_lights(&mut self, perception: &PerceptionSnapshot) {
        let Some(lights) = perception.lights() else { return };
        for light in lights {
            let before = self.last_lights.iter().find(|(id, _)| *id == light.id).map(|(_, s)| *s);
            if let Some(from) = before.filter(|s| *s != light.state) {
                info!(light = %light.id, %from, to = %light.state, "traffic light changed");
            }
        }
        self.last_lights = lights.iter().map(|l| (l.id, l.state)).collect();
    }

    /// Cut the local path from the selected path and compute its speeds.
    fn shape(&self, vehicle: &VehicleState, ev: &Evidence, same_path: bool, blind: bool) -> Decision {
        let (car, planning) = (&self.car, &self.planning);
        let frame = &self.frames[self.selected];
        let half_len = car.length_m / 2.0;
        let s_c = frame.station(vehicle.position());
        let s_front = s_c + half_len;

        let safety_border = frame.border(
            s_c - half_len,
            s_c + half_len + ev.stopping_distance_m.max(car.length_m),
            car.width_m / 2.0 + planning.safety_lateral_margin_m,
        );

        let state = &self.memory.state;
        let (points, stations) = frame.window(s_c - half_len, s_c + planning.horizon_m);
        let (speed_profile, target_speed) = if state.is_halted() || blind {
            (vec![0.0; points.len()], 0.0)
        } else {
            // Stop stations for the vehicle centre.
            let mut stops = vec![frame.length_m];
            if let (true, Some(gap)) = (same_path, ev.blocking_gap_m) {
                stops.push(s_front + gap - 2.0 * planning.min_stop_gap_m - half_len);
            }
            if let Some((_, line)) = state.stop_line() {
                if let Some(s_line) = frame.crossing(&line, s_front - planning.stop_line_tolerance_m) {
                    stops.push(s_line - half_len);
                }
            }
            let cap = match (state, ev.caution, ev.alternate) {
                (BehaviorState::Following, Some(_), None) => planning.caution_speed,
                _ => f64::INFINITY,
            };
            let speed = |s: f64| frame.speed_at(s, &stops, planning.stop_decel, planning.horizon_m).min(cap);
            (stations.iter().map(|&s| speed(s)).collect(), speed(s_c))
        };

        Decision {
            tag: state.tag(),
            state: state.clone(),
            local_path: LocalPath { points, speed_profile },
            target_speed,
            safety_border,
            path_index: self.selected,
        }
    }
}
