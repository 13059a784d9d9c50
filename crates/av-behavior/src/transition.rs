//! The priority-ordered state rules and their hysteresis.
//!
//! Priority, highest first:
//!
//! 1. Emergency object → `EmergencyBrake`.
//! 2. Object input unknown while braking or avoiding → hold.
//! 3. `GoalReached` is terminal.
//! 4. Caution object with a clearing alternate → `AvoidingObstacle`.
//! 5. Traffic-light rules (approach, stop, release on go).
//! 6. Route exhausted with the vehicle at the goal → `GoalReached`.
//! 7. `Following`.

use av_core::PlanningParams;
use av_perception::LightState;

use crate::{BehaviorMemory, BehaviorState, BehaviorTag, Evidence};

/// The state the rules ask for this tick, before hysteresis.
pub fn propose(prev: &BehaviorState, ev: &Evidence, planning: &PlanningParams) -> BehaviorState {
    if let Some(object) = ev.emergency {
        return BehaviorState::EmergencyBrake { object };
    }
    if !ev.objects_known
        && matches!(prev, BehaviorState::EmergencyBrake { .. } | BehaviorState::AvoidingObstacle { .. })
    {
        return prev.clone();
    }
    if *prev == BehaviorState::GoalReached {
        return BehaviorState::GoalReached;
    }
    if let (Some(object), Some(path_index)) = (ev.caution, ev.alternate) {
        return BehaviorState::AvoidingObstacle { object, path_index };
    }
    if let Some(state) = light_rule(prev, ev, planning) {
        return state;
    }
    if ev.remaining_m < planning.goal_tolerance_m && ev.goal_distance_m < planning.goal_tolerance_m {
        return BehaviorState::GoalReached;
    }
    BehaviorState::Following
}

/// Light handling.  `None` means no light constrains the vehicle.
fn light_rule(prev: &BehaviorState, ev: &Evidence, planning: &PlanningParams) -> Option<BehaviorState> {
    let at_line = ev.tracked_line_m.is_some_and(|d| d.abs() <= planning.stop_line_tolerance_m);
    match *prev {
        BehaviorState::StoppedAtLight { light, .. } => {
            if !ev.lights_known {
                return Some(prev.clone());
            }
            if let Some(l) = ev.tracked_light.filter(|l| l.state != LightState::Go) {
                return Some(BehaviorState::StoppedAtLight { light, stop_line: l.stop_line });
            }
        }
        BehaviorState::ApproachingLight { light, .. } => {
            if !ev.lights_known {
                return Some(if at_line && ev.stopped {
                    stopped_at(prev)
                } else {
                    prev.clone()
                });
            }
            // Still red (or unreadable) and the line is still ahead.
            if let Some(l) = ev.tracked_light.filter(|l| l.state != LightState::Go) {
                if ev.tracked_line_m.is_some() {
                    let stop_line = l.stop_line;
                    return Some(if at_line && ev.stopped {
                        BehaviorState::StoppedAtLight { light, stop_line }
                    } else {
                        BehaviorState::ApproachingLight { light, stop_line }
                    });
                }
            }
        }
        _ => {}
    }

    let sighting = ev.nearest_light?;
    let must_stop = match sighting.state {
        LightState::Stop => true,
        // A caution light is run when it can no longer be stopped for.
        LightState::Caution => ev.can_stop_m <= sighting.distance_m,
        LightState::Go | LightState::Unknown => false,
    };
    (must_stop && sighting.distance_m <= ev.braking_distance_m).then_some(BehaviorState::ApproachingLight {
        light: sighting.light,
        stop_line: sighting.stop_line,
    })
}

fn stopped_at(state: &BehaviorState) -> BehaviorState {
    match state.stop_line() {
        Some((light, stop_line)) => BehaviorState::StoppedAtLight { light, stop_line },
        None => state.clone(),
    }
}

/// Transitions that need `hysteresis_ticks` consecutive ticks of agreement.
fn is_damped(from: BehaviorTag, to: BehaviorTag) -> bool {
    to != BehaviorTag::EmergencyBrake
        && (matches!(from, BehaviorTag::EmergencyBrake | BehaviorTag::AvoidingObstacle)
            || (from == BehaviorTag::Following && to == BehaviorTag::AvoidingObstacle))
}

/// Advance the state by one tick.
///
/// A proposal with the same tag replaces the state at once (payloads such
/// as the stop line may be refreshed).  A damped change is applied on the
/// `hysteresis_ticks`-th consecutive tick that asks for it; until then the
/// previous state is kept and the counter grows.
pub fn transition(memory: &BehaviorMemory, ev: &Evidence, planning: &PlanningParams) -> BehaviorMemory {
    let candidate = propose(&memory.state, ev, planning);
    let (from, to) = (memory.state.tag(), candidate.tag());
    if from == to || !is_damped(from, to) {
        return BehaviorMemory::new(candidate);
    }
    let contrary_ticks = memory.contrary_ticks + 1;
    if contrary_ticks >= planning.hysteresis_ticks {
        BehaviorMemory::new(candidate)
    } else {
        BehaviorMemory { state: memory.state.clone(), contrary_ticks }
    }
}
