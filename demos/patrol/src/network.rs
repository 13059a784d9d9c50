//! The stadium track used by the patrol demo.
//!
//! ```text
//!        ◄──── top straight (west-bound) ────
//!      (                                      )
//!        ═════ passing lane (y = 3.5) ══════
//!        ───── bottom straight (east-bound) ──►
//! ```
//!
//! One counter-clockwise loop lane with 30 m radius turns, plus a passing
//! lane left of the bottom straight linked to it at every waypoint.

use std::f64::consts::PI;

use av_core::{LaneId, LightId, Point2, Pose, Segment};
use av_map::{LanePoint, RoadNetwork, RoadNetworkBuilder};
use av_perception::{LightState, TrafficLight};

pub const STRAIGHT_M: f64 = 200.0;
pub const TURN_RADIUS_M: f64 = 30.0;
pub const LANE_WIDTH_M: f64 = 3.5;

const STRAIGHT_LIMIT: f64 = 8.0;
const TURN_LIMIT: f64 = 6.0;
const SPACING_M: f64 = 5.0;
const TURN_STEPS: usize = 30;

/// Fixed features placed along the track.
pub struct Track {
    pub network: RoadNetwork,
    /// Signal on the bottom straight, initially green.
    pub light: TrafficLight,
    /// A car parked in the east-bound lane past the light.
    pub parked_car: Pose,
}

fn straight(from: Point2, to: Point2, limit: f64) -> Vec<LanePoint> {
    let n = (from.distance(to) / SPACING_M).round() as usize;
    (0..n).map(|i| LanePoint::new(from.lerp(to, i as f64 / n as f64), limit)).collect()
}

fn turn(centre: Point2, from_angle: f64) -> Vec<LanePoint> {
    (0..TURN_STEPS)
        .map(|i| {
            let a = from_angle + PI * i as f64 / TURN_STEPS as f64;
            LanePoint::new(centre + Point2::from_heading(a) * TURN_RADIUS_M, TURN_LIMIT)
        })
        .collect()
}

pub fn build_track() -> Track {
    let mut b = RoadNetworkBuilder::new();
    let top = 2.0 * TURN_RADIUS_M;

    let mut main = straight(Point2::new(0.0, 0.0), Point2::new(STRAIGHT_M, 0.0), STRAIGHT_LIMIT);
    let bottom_len = main.len();
    main.extend(turn(Point2::new(STRAIGHT_M, TURN_RADIUS_M), -PI / 2.0));
    main.extend(straight(Point2::new(STRAIGHT_M, top), Point2::new(0.0, top), STRAIGHT_LIMIT));
    main.extend(turn(Point2::new(0.0, TURN_RADIUS_M), PI / 2.0));
    let loop_ids = b.add_lane(LaneId(0), &main);
    b.connect(loop_ids[loop_ids.len() - 1], loop_ids[0]);

    let passing = straight(
        Point2::new(0.0, LANE_WIDTH_M),
        Point2::new(STRAIGHT_M, LANE_WIDTH_M),
        STRAIGHT_LIMIT,
    );
    let passing_ids = b.add_lane(LaneId(1), &passing);
    for (&right, &left) in loop_ids[..bottom_len].iter().zip(&passing_ids) {
        b.link_adjacent(right, left);
    }

    let stop_line = Segment::new(Point2::new(60.0, -2.0), Point2::new(60.0, LANE_WIDTH_M + 2.0));
    Track {
        network: b.build(),
        light: TrafficLight::new(LightId(1), LightState::Go, stop_line),
        parked_car: Pose::new(120.0, 0.0, 0.0),
    }
}
