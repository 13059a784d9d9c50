//! Path-relative geometry: stations, swept borders, speed envelopes.
//!
//! All distances along a path are *stations*: arc length from the path's
//! first waypoint.  The vehicle's station is the projection of its footprint
//! centre; its front bumper sits `length / 2` further on.

use serde::{Deserialize, Serialize};

use av_core::polyline::{self, Projection};
use av_core::{CarInfo, PlanningParams, Point2, Polygon, Segment};
use av_map::GlobalPath;

/// Spacing of the boundary samples of a swept border.
const BORDER_STEP_M: f64 = 1.0;

/// v²/(2·max_decel) plus the minimum stop gap.
pub fn stopping_distance(v: f64, car: &CarInfo, planning: &PlanningParams) -> f64 {
    v * v / (2.0 * car.max_decel) + planning.min_stop_gap_m
}

/// Distance at which a restrictive light starts to matter.
pub fn light_braking_distance(v: f64, planning: &PlanningParams) -> f64 {
    v * v / (2.0 * planning.stop_decel) + planning.light_detection_margin_m
}

/// Where a footprint lies relative to a path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    /// Lowest station of any vertex.
    pub s_min: f64,
    /// Highest station of any vertex.
    pub s_max: f64,
    /// Distance from the centreline to the nearest footprint edge; 0 when
    /// the footprint straddles the centreline.
    pub edge_offset: f64,
}

// ── PathFrame ─────────────────────────────────────────────────────────────────

/// A global path prepared for per-tick queries.
#[derive(Clone, Debug, Default)]
pub struct PathFrame {
    pub points: Vec<Point2>,
    /// Station of every point.
    pub stations: Vec<f64>,
    /// Speed cap at every point: waypoint limit, vehicle limit and curvature.
    pub caps: Vec<f64>,
    pub length_m: f64,
}

impl PathFrame {
    pub fn new(path: &GlobalPath, car: &CarInfo, planning: &PlanningParams) -> Self {
        let points = path.points();
        let stations = polyline::arc_lengths(&points);
        let caps = path
            .waypoints
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let k = polyline::curvature(&points, i).abs();
                let curve = if k > 1e-9 { (planning.max_lateral_accel / k).sqrt() } else { f64::INFINITY };
                w.speed_limit.min(car.max_speed).min(curve)
            })
            .collect();
        let length_m = stations.last().copied().unwrap_or(0.0);
        Self { points, stations, caps, length_m }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn project(&self, p: Point2) -> Option<Projection> {
        polyline::project(&self.points, p)
    }

    /// Station of `p`'s projection (0 for an empty path).
    pub fn station(&self, p: Point2) -> f64 {
        self.project(p).map_or(0.0, |proj| proj.s)
    }

    /// Cap of the segment holding station `s`.
    fn cap_at(&self, s: f64) -> f64 {
        let i = self.stations.partition_point(|&st| st <= s).saturating_sub(1);
        self.caps.get(i).copied().unwrap_or(0.0)
    }

    /// Polygon swept by a band of `half_width` along the path between two
    /// stations.  Stations past the end extend straight along the last
    /// segment.
    pub fn border(&self, from: f64, to: f64, half_width: f64) -> Polygon {
        if self.points.is_empty() {
            return Polygon::default();
        }
        let span = (to - from).max(0.0);
        let n = ((span / BORDER_STEP_M).ceil() as usize).max(1);
        let mut left = Vec::with_capacity(n + 1);
        let mut right = Vec::with_capacity(n + 1);
        for k in 0..=n {
            let s = from + span * k as f64 / n as f64;
            if let Some((p, heading)) = polyline::point_at(&self.points, s) {
                let normal = Point2::from_heading(heading).perp();
                left.push(p + normal * half_width);
                right.push(p - normal * half_width);
            }
        }
        Polygon::from_boundaries(&left, &right)
    }

    /// Lowest station `≥ min_s` at which `line` crosses the path.
    pub fn crossing(&self, line: &Segment, min_s: f64) -> Option<f64> {
        self.points
            .windows(2)
            .zip(&self.stations)
            .filter_map(|(w, &s0)| {
                Segment::new(w[0], w[1])
                    .intersection(line)
                    .map(|p| s0 + w[0].distance(p))
            })
            .filter(|&s| s >= min_s)
            .min_by(f64::total_cmp)
    }

    /// Station span and lateral offset of a footprint.
    pub fn place(&self, footprint: &Polygon) -> Option<Placement> {
        let mut s_min = f64::INFINITY;
        let mut s_max = f64::NEG_INFINITY;
        let mut lat_min = f64::INFINITY;
        let (mut left, mut right) = (false, false);
        for &v in &footprint.points {
            let proj = self.project(v)?;
            s_min = s_min.min(proj.s);
            s_max = s_max.max(proj.s);
            lat_min = lat_min.min(proj.lateral.abs());
            left |= proj.lateral > 0.0;
            right |= proj.lateral < 0.0;
        }
        if !s_min.is_finite() {
            return None;
        }
        let edge_offset = if left && right { 0.0 } else { lat_min };
        Some(Placement { s_min, s_max, edge_offset })
    }

    /// Highest speed at station `s` from which every cap ahead and every
    /// stop station can still be honoured braking at `decel`.
    pub fn speed_at(&self, s: f64, stops: &[f64], decel: f64, horizon_m: f64) -> f64 {
        let mut v = self.cap_at(s);
        for (&st, &cap) in self.stations.iter().zip(&self.caps) {
            if st > s && st <= s + horizon_m {
                v = v.min((cap * cap + 2.0 * decel * (st - s)).sqrt());
            }
        }
        for &stop in stops {
            v = v.min((2.0 * decel * (stop - s).max(0.0)).sqrt());
        }
        v.max(0.0)
    }

    /// Points of the path between two stations, with their stations.
    pub fn window(&self, from: f64, to: f64) -> (Vec<Point2>, Vec<f64>) {
        let from = from.clamp(0.0, self.length_m);
        let points = polyline::slice(&self.points, from, to);
        let stations = polyline::arc_lengths(&points).into_iter().map(|d| from + d).collect();
        (points, stations)
    }
}

// ── LocalPath ─────────────────────────────────────────────────────────────────

/// The lookahead window of the selected path handed to the follower.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalPath {
    pub points: Vec<Point2>,
    /// Target speed at each point, m/s.
    pub speed_profile: Vec<f64>,
}

impl LocalPath {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn length(&self) -> f64 {
        polyline::length(&self.points)
    }
}
