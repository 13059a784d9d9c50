//! Behavior states.

use std::fmt;

use serde::{Deserialize, Serialize};

use av_core::{LightId, ObjectId, Segment};

/// The single active behavior.  Payloads carry what the state needs to keep
/// working when its input goes stale (a light's stop line, the alternate
/// path being used).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BehaviorState {
    #[default]
    Following,
    ApproachingLight { light: LightId, stop_line: Segment },
    StoppedAtLight { light: LightId, stop_line: Segment },
    AvoidingObstacle { object: ObjectId, path_index: usize },
    EmergencyBrake { object: ObjectId },
    GoalReached,
}

impl BehaviorState {
    pub fn tag(&self) -> BehaviorTag {
        match self {
            BehaviorState::Following               => BehaviorTag::Following,
            BehaviorState::ApproachingLight { .. } => BehaviorTag::ApproachingLight,
            BehaviorState::StoppedAtLight { .. }   => BehaviorTag::StoppedAtLight,
            BehaviorState::AvoidingObstacle { .. } => BehaviorTag::AvoidingObstacle,
            BehaviorState::EmergencyBrake { .. }   => BehaviorTag::EmergencyBrake,
            BehaviorState::GoalReached             => BehaviorTag::GoalReached,
        }
    }

    /// Stop line the state is holding for, if any.
    pub fn stop_line(&self) -> Option<(LightId, Segment)> {
        match *self {
            BehaviorState::ApproachingLight { light, stop_line }
            | BehaviorState::StoppedAtLight { light, stop_line } => Some((light, stop_line)),
            _ => None,
        }
    }

    /// States that command zero speed regardless of the path ahead.
    pub fn is_halted(&self) -> bool {
        matches!(
            self,
            BehaviorState::StoppedAtLight { .. }
                | BehaviorState::EmergencyBrake { .. }
                | BehaviorState::GoalReached
        )
    }
}

/// Field-less copy of the state discriminant, for diagnostics and output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorTag {
    #[default]
    Following,
    ApproachingLight,
    StoppedAtLight,
    AvoidingObstacle,
    EmergencyBrake,
    GoalReached,
}

impl BehaviorTag {
    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorTag::Following        => "following",
            BehaviorTag::ApproachingLight => "approaching_light",
            BehaviorTag::StoppedAtLight   => "stopped_at_light",
            BehaviorTag::AvoidingObstacle => "avoiding_obstacle",
            BehaviorTag::EmergencyBrake   => "emergency_brake",
            BehaviorTag::GoalReached      => "goal_reached",
        }
    }
}

impl fmt::Display for BehaviorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The state plus the hysteresis counter that guards it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorMemory {
    pub state: BehaviorState,
    /// Consecutive ticks the proposed state has disagreed with `state` on a
    /// damped transition.
    pub contrary_ticks: u32,
}

impl BehaviorMemory {
    pub fn new(state: BehaviorState) -> Self {
        Self { state, contrary_ticks: 0 }
    }
}
