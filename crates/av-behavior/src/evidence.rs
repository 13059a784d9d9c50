//! Measuring one tick's world against the current path.
//!
//! [`evaluate`] is pure: it reads the vehicle, the prepared paths, the
//! previous state and the perception snapshot and reports facts.  The rules
//! that turn facts into a state live in [`crate::transition`].

use av_core::{CarInfo, LightId, ObjectId, PlanningParams, Segment, VehicleState};
use av_perception::{DetectedObject, LightState, PerceptionSnapshot, TrafficLight};

use crate::BehaviorState;
use crate::geometry::{PathFrame, light_braking_distance, stopping_distance};

/// Everything [`evaluate`] reads.
#[derive(Copy, Clone, Debug)]
pub struct DecisionContext<'a> {
    pub vehicle: &'a VehicleState,
    /// Index 0 is the route; further entries are alternates.
    pub frames: &'a [PathFrame],
    /// Path the vehicle was following on the previous tick.
    pub selected: usize,
    pub prev: &'a BehaviorState,
    pub perception: &'a PerceptionSnapshot,
    pub car: &'a CarInfo,
    pub planning: &'a PlanningParams,
}

/// A relevant light ahead on the selected path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightSighting {
    pub light: LightId,
    pub state: LightState,
    pub stop_line: Segment,
    /// From the vehicle front to the stop line; negative once the front has
    /// crossed it.
    pub distance_m: f64,
}

/// Facts about one tick.  Distances are along the selected path.
#[derive(Clone, Debug, PartialEq)]
pub struct Evidence {
    /// Nearest object touching the safety border within stopping distance.
    pub emergency: Option<ObjectId>,
    /// `false` when the object input is unknown or stale.
    pub objects_known: bool,
    /// Nearest object inside the route's caution envelope.
    pub caution: Option<ObjectId>,
    /// Alternate path that clears the caution object.
    pub alternate: Option<usize>,
    /// Gap from the vehicle front to the nearest object in the driving
    /// corridor.
    pub blocking_gap_m: Option<f64>,
    /// `false` when the light input is unknown or stale.
    pub lights_known: bool,
    pub nearest_light: Option<LightSighting>,
    /// Fresh record of the light the previous state was holding for.
    pub tracked_light: Option<TrafficLight>,
    /// Distance to the tracked stop line, computed from the freshest line
    /// available (a stale light input still leaves the carried line).
    pub tracked_line_m: Option<f64>,
    pub braking_distance_m: f64,
    pub stopping_distance_m: f64,
    /// Distance needed to stop at `car.max_decel`, without margin.
    pub can_stop_m: f64,
    pub stopped: bool,
    /// Selected path left ahead of the vehicle centre.
    pub remaining_m: f64,
    /// Straight-line distance from the vehicle centre to the route's last
    /// waypoint.
    pub goal_distance_m: f64,
}

impl Default for Evidence {
    fn default() -> Self {
        Self {
            emergency:           None,
            objects_known:       false,
            caution:             None,
            alternate:           None,
            blocking_gap_m:      None,
            lights_known:        false,
            nearest_light:       None,
            tracked_light:       None,
            tracked_line_m:      None,
            braking_distance_m:  0.0,
            stopping_distance_m: 0.0,
            can_stop_m:          0.0,
            stopped:             true,
            remaining_m:         f64::INFINITY,
            goal_distance_m:     f64::INFINITY,
        }
    }
}

pub fn evaluate(ctx: &DecisionContext<'_>) -> Evidence {
    let (car, planning) = (ctx.car, ctx.planning);
    let v = ctx.vehicle.v.max(0.0);
    let mut ev = Evidence {
        braking_distance_m: light_braking_distance(v, planning),
        stopping_distance_m: stopping_distance(v, car, planning),
        can_stop_m: v * v / (2.0 * car.max_decel),
        stopped: v < planning.stopped_speed,
        ..Evidence::default()
    };
    let Some(frame) = ctx.frames.get(ctx.selected).or_else(|| ctx.frames.first()) else {
        return ev;
    };
    if frame.is_empty() {
        return ev;
    }

    let half_len = car.length_m / 2.0;
    let s_c = frame.station(ctx.vehicle.position());
    let s_front = s_c + half_len;
    ev.remaining_m = (frame.length_m - s_c).max(0.0);
    if let Some(goal) = ctx.frames.first().and_then(|route| route.points.last()) {
        ev.goal_distance_m = ctx.vehicle.position().distance(*goal);
    }

    if let Some(objects) = ctx.perception.objects() {
        ev.objects_known = true;
        evaluate_objects(ctx, frame, s_c, objects, &mut ev);
    }

    let tol = planning.stop_line_tolerance_m;
    let carried = ctx.prev.stop_line();
    if let Some(lights) = ctx.perception.lights() {
        ev.lights_known = true;
        for light in lights {
            if carried.is_some_and(|(id, _)| id == light.id) {
                ev.tracked_light = Some(*light);
            }
            let Some(s_line) = frame.crossing(&light.stop_line, s_front - tol) else {
                continue;
            };
            let distance_m = s_line - s_front;
            // Past the horizon a light still counts once it is within
            // braking distance.
            if distance_m > planning.horizon_m.max(ev.braking_distance_m) {
                continue;
            }
            if ev.nearest_light.is_none_or(|n| distance_m < n.distance_m) {
                ev.nearest_light = Some(LightSighting {
                    light: light.id,
                    state: light.state,
                    stop_line: light.stop_line,
                    distance_m,
                });
            }
        }
    }
    let tracked_line = ev.tracked_light.map(|l| l.stop_line).or(carried.map(|(_, line)| line));
    ev.tracked_line_m = tracked_line
        .and_then(|line| frame.crossing(&line, s_front - tol))
        .map(|s| s - s_front);
    ev
}

fn evaluate_objects(
    ctx: &DecisionContext<'_>,
    frame: &PathFrame,
    s_c: f64,
    objects: &[DetectedObject],
    ev: &mut Evidence,
) {
    let (car, planning) = (ctx.car, ctx.planning);
    let half_len = car.length_m / 2.0;
    let half_width = car.width_m / 2.0;
    let s_front = s_c + half_len;
    let safety_half = half_width + planning.safety_lateral_margin_m;

    let safety = frame.border(
        s_c - half_len,
        s_c + half_len + ev.stopping_distance_m.max(car.length_m),
        safety_half,
    );
    let corridor = frame.border(s_front, s_c + planning.horizon_m, safety_half);

    // The caution envelope always follows the route, so an obstacle on the
    // route keeps counting while an alternate is driven around it.
    let route = &ctx.frames[0];
    let s_route = route.station(ctx.vehicle.position());
    let caution = route.border(
        s_route - half_len,
        s_route + planning.horizon_m,
        half_width + planning.caution_lateral_margin_m,
    );

    let mut emergency: Option<(ObjectId, f64)> = None;
    let mut cautious: Option<(&DetectedObject, f64)> = None;
    for object in objects {
        let footprint = object.footprint();
        let Some(place) = frame.place(&footprint) else { continue };
        let gap = place.s_min - s_front;
        if footprint.intersects(&safety)
            && gap <= ev.stopping_distance_m
            && emergency.is_none_or(|(_, g)| gap < g)
        {
            emergency = Some((object.id, gap));
        }
        if footprint.intersects(&corridor) {
            let gap = gap.max(0.0);
            ev.blocking_gap_m = Some(ev.blocking_gap_m.map_or(gap, |g| g.min(gap)));
        }
        if footprint.intersects(&caution) {
            let route_gap = route.place(&footprint).map_or(gap, |p| p.s_min - s_route);
            if cautious.is_none_or(|(_, g)| route_gap < g) {
                cautious = Some((object, route_gap));
            }
        }
    }
    ev.emergency = emergency.map(|(id, _)| id);
    ev.caution = cautious.map(|(o, _)| o.id);
    if let Some((object, _)) = cautious {
        ev.alternate = select_alternate(ctx, object, objects);
    }
}

/// Alternate path that gives the caution object more room than the route.
///
/// An alternate qualifies when its clearance from every nearby object is at
/// least the safety margin and beats the route's clearance from the caution
/// object by `min_clearance_gain_m`.  The alternate already in use is kept
/// while it qualifies; otherwise the widest clearance wins, lower index on
/// ties.
fn select_alternate(
    ctx: &DecisionContext<'_>,
    object: &DetectedObject,
    objects: &[DetectedObject],
) -> Option<usize> {
    let (car, planning) = (ctx.car, ctx.planning);
    let half_width = car.width_m / 2.0;
    let route_clearance = ctx.frames[0]
        .place(&object.footprint())
        .map_or(0.0, |p| p.edge_offset - half_width);
    let footprints: Vec<_> = objects.iter().map(DetectedObject::footprint).collect();

    let clearance = |frame: &PathFrame| -> f64 {
        let s_c = frame.station(ctx.vehicle.position());
        let (from, to) = (s_c - car.length_m / 2.0, s_c + planning.horizon_m);
        footprints
            .iter()
            .filter_map(|f| frame.place(f))
            .filter(|p| p.s_max >= from && p.s_min <= to)
            .map(|p| p.edge_offset - half_width)
            .fold(f64::INFINITY, f64::min)
    };
    let qualifies = |c: f64| {
        c >= planning.safety_lateral_margin_m && c >= route_clearance + planning.min_clearance_gain_m
    };

    if let BehaviorState::AvoidingObstacle { path_index, .. } = *ctx.prev {
        if path_index > 0 && ctx.frames.get(path_index).is_some_and(|f| qualifies(clearance(f))) {
            return Some(path_index);
        }
    }
    let mut best: Option<(usize, f64)> = None;
    for (i, frame) in ctx.frames.iter().enumerate().skip(1) {
        let c = clearance(frame);
        if qualifies(c) && best.is_none_or(|(_, b)| c > b) {
            best = Some((i, c));
        }
    }
    best.map(|(i, _)| i)
}
