//! Global planning trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! `av-sim` calls planning via the [`GlobalPlanner`] trait, so applications
//! can swap in A* or a lane-level cost model without touching the loop.
//!
//! # Cost units
//!
//! Costs are integers so heap ordering is exact and repeatable:
//! distance in **millimetres**, heading change in **milliradians**.  The heap
//! key is `(distance, heading_change, WaypointId)`, so equal-length routes
//! are broken by the smoother one and then by the lower waypoint id.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use av_core::{EdgeId, PlanningParams, Point2, Pose, WaypointId, normalize_angle};

use crate::PlanningError;
use crate::network::{EdgeKind, RoadNetwork, Waypoint};

// ── GlobalPath ────────────────────────────────────────────────────────────────

/// An ordered route of waypoint copies from start to goal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalPath {
    pub waypoints: Vec<Waypoint>,
    pub length_m: f64,
    /// Sum of |Δheading| between consecutive waypoints, rad.
    pub heading_change: f64,
}

impl GlobalPath {
    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Self {
        let length_m = waypoints.windows(2).map(|w| w[0].pos.distance(w[1].pos)).sum();
        let heading_change = waypoints
            .windows(2)
            .map(|w| normalize_angle(w[1].heading - w[0].heading).abs())
            .sum();
        Self { waypoints, length_m, heading_change }
    }

    /// Waypoint positions, the polyline the behaviour layer works on.
    pub fn points(&self) -> Vec<Point2> {
        self.waypoints.iter().map(|w| w.pos).collect()
    }

    pub fn first(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    pub fn last(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

// ── GlobalPlanner trait ───────────────────────────────────────────────────────

/// Pluggable global planner.
///
/// Implementations must be deterministic: identical inputs yield identical
/// path sets.  Index 0 of the result is the route; further entries are
/// alternates the behaviour layer may switch to.
pub trait GlobalPlanner: Send + Sync {
    fn compute_global_paths(
        &self,
        start: Pose,
        goal: Pose,
        network: &RoadNetwork,
    ) -> Result<Vec<GlobalPath>, PlanningError>;
}

// ── DijkstraPlanner ───────────────────────────────────────────────────────────

/// Dijkstra over successor and lane-change edges, bounded by
/// `max_search_distance_m`.
#[derive(Clone, Debug)]
pub struct DijkstraPlanner {
    snap_radius_m: f64,
    max_search_mm: u64,
    lane_change_cost_mm: u64,
}

impl DijkstraPlanner {
    pub fn new(params: &PlanningParams) -> Self {
        Self {
            snap_radius_m: params.snap_radius_m,
            max_search_mm: to_mm(params.max_search_distance_m),
            lane_change_cost_mm: to_mm(params.lane_change_cost_m),
        }
    }

    fn snap(&self, pose: Pose, network: &RoadNetwork) -> Result<WaypointId, PlanningError> {
        match network.snap(pose.position()) {
            Some((id, d)) if d <= self.snap_radius_m => Ok(id),
            Some((_, d)) => Err(PlanningError::PoseOffRoad { distance_m: d, radius_m: self.snap_radius_m }),
            None => Err(PlanningError::PoseOffRoad {
                distance_m: f64::INFINITY,
                radius_m: self.snap_radius_m,
            }),
        }
    }

    #[inline]
    fn edge_cost(&self, network: &RoadNetwork, edge: EdgeId) -> (u64, u64) {
        let e = edge.index();
        let mut dist = to_mm(network.edge_length_m[e]);
        if network.edge_kind[e] == EdgeKind::LaneChange {
            dist += self.lane_change_cost_mm;
        }
        let from = network.waypoint(network.edge_from[e]);
        let to = network.waypoint(network.edge_to[e]);
        let turn = (normalize_angle(to.heading - from.heading).abs() * 1000.0).round() as u64;
        (dist, turn)
    }

    fn route(
        &self,
        network: &RoadNetwork,
        from: WaypointId,
        to: WaypointId,
    ) -> Result<Vec<WaypointId>, PlanningError> {
        if from == to {
            return Ok(vec![from]);
        }

        let n = network.waypoint_count();
        let mut best = vec![(u64::MAX, u64::MAX); n];
        let mut prev_edge = vec![EdgeId::INVALID; n];
        best[from.index()] = (0, 0);

        let mut heap: BinaryHeap<Reverse<(u64, u64, WaypointId)>> = BinaryHeap::new();
        heap.push(Reverse((0, 0, from)));

        while let Some(Reverse((dist, turn, wp))) = heap.pop() {
            if wp == to {
                return Ok(reconstruct(network, &prev_edge, to));
            }
            if (dist, turn) > best[wp.index()] {
                continue;
            }
            for edge in network.out_edges(wp) {
                let next = network.edge_to[edge.index()];
                let (d, t) = self.edge_cost(network, edge);
                let cand = (dist.saturating_add(d), turn.saturating_add(t));
                if cand.0 > self.max_search_mm {
                    continue;
                }
                if cand < best[next.index()] {
                    best[next.index()] = cand;
                    prev_edge[next.index()] = edge;
                    heap.push(Reverse((cand.0, cand.1, next)));
                }
            }
        }

        Err(PlanningError::NoPathFound { from, to })
    }
}

impl GlobalPlanner for DijkstraPlanner {
    fn compute_global_paths(
        &self,
        start: Pose,
        goal: Pose,
        network: &RoadNetwork,
    ) -> Result<Vec<GlobalPath>, PlanningError> {
        let from = self.snap(start, network)?;
        let to = self.snap(goal, network)?;
        let ids = self.route(network, from, to)?;

        let route: Vec<Waypoint> = ids.iter().map(|&id| network.waypoint(id).clone()).collect();
        let mut paths = vec![GlobalPath::from_waypoints(route)];

        for side in [Side::Left, Side::Right] {
            let shifted: Vec<Waypoint> = ids
                .iter()
                .map(|&id| {
                    let wp = network.waypoint(id);
                    let neighbour = match side {
                        Side::Left => wp.left,
                        Side::Right => wp.right,
                    };
                    network.waypoint(neighbour.unwrap_or(id)).clone()
                })
                .collect();
            if shifted.iter().zip(&ids).any(|(w, &id)| w.id != id) {
                paths.push(GlobalPath::from_waypoints(shifted));
            }
        }

        debug!(
            %from,
            %to,
            waypoints = ids.len(),
            length_m = paths[0].length_m,
            alternates = paths.len() - 1,
            "global paths computed"
        );
        Ok(paths)
    }
}

// ── Internals ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone)]
enum Side {
    Left,
    Right,
}

#[inline]
fn to_mm(m: f64) -> u64 {
    (m.max(0.0) * 1000.0).round() as u64
}

fn reconstruct(network: &RoadNetwork, prev_edge: &[EdgeId], to: WaypointId) -> Vec<WaypointId> {
    let mut ids = vec![to];
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        cur = network.edge_from[e.index()];
        ids.push(cur);
    }
    ids.reverse();
    ids
}
