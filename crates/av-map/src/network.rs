//! Lane/waypoint road network and builder.
//!
//! # Data layout
//!
//! Waypoints are stored in a `Vec` indexed by `WaypointId`.  Directed edges
//! use **Compressed Sparse Row (CSR)** format in both directions:
//!
//! ```text
//! successors of w:   edge ids  out_start[w] .. out_start[w+1]
//! predecessors of w: in_edges[ in_start[w] .. in_start[w+1] ]
//! ```
//!
//! Edge arrays (`edge_from`, `edge_to`, `edge_kind`, `edge_length_m`) are
//! sorted by `(from, to)` and indexed by `EdgeId`, so the planner's inner
//! loop is a contiguous scan and iteration order never depends on insertion
//! order.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps map-frame `(x, y)` to the nearest waypoint.
//! Used by the planner to snap start and goal poses onto the road.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use serde::{Deserialize, Serialize};

use av_core::{EdgeId, LaneId, Point2, WaypointId, normalize_angle};

// ── Waypoint ──────────────────────────────────────────────────────────────────

/// A point on a lane.  Immutable inside the network; paths hold copies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub lane: LaneId,
    pub pos: Point2,
    /// Elevation, carried for output only.
    pub z: f64,
    /// Direction of travel, rad.
    pub heading: f64,
    /// m/s
    pub speed_limit: f64,
    /// Nearest waypoint on the lane to the left, if any.
    pub left: Option<WaypointId>,
    /// Nearest waypoint on the lane to the right, if any.
    pub right: Option<WaypointId>,
}

/// How an edge moves the vehicle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Along a lane, or from a lane's end onto its successor lane.
    Follow,
    /// Sideways onto a neighbouring lane.
    LaneChange,
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct WaypointEntry {
    point: [f64; 2],
    id: WaypointId,
}

impl RTreeObject for WaypointEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for WaypointEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed lane graph plus a spatial index for waypoint snapping.
///
/// Read-only after [`RoadNetworkBuilder::build`]; owned by the simulator.
pub struct RoadNetwork {
    pub waypoints: Vec<Waypoint>,

    /// CSR row pointer for outgoing edges.  Length = `waypoint_count + 1`.
    pub out_start: Vec<u32>,

    pub edge_from: Vec<WaypointId>,
    pub edge_to: Vec<WaypointId>,
    pub edge_kind: Vec<EdgeKind>,
    pub edge_length_m: Vec<f64>,

    /// CSR row pointer into `in_edges`.  Length = `waypoint_count + 1`.
    pub in_start: Vec<u32>,
    /// Edge ids grouped by destination waypoint.
    pub in_edges: Vec<EdgeId>,

    spatial_idx: RTree<WaypointEntry>,
}

impl std::fmt::Debug for RoadNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadNetwork")
            .field("waypoints", &self.waypoint_count())
            .field("edges", &self.edge_count())
            .finish_non_exhaustive()
    }
}

impl RoadNetwork {
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[inline]
    pub fn waypoint(&self, id: WaypointId) -> &Waypoint {
        &self.waypoints[id.index()]
    }

    /// Outgoing edges of `wp`, a contiguous id range.
    #[inline]
    pub fn out_edges(&self, wp: WaypointId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.out_start[wp.index()] as usize;
        let end   = self.out_start[wp.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Incoming edges of `wp`.
    #[inline]
    pub fn in_edges(&self, wp: WaypointId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.in_start[wp.index()] as usize;
        let end   = self.in_start[wp.index() + 1] as usize;
        self.in_edges[start..end].iter().copied()
    }

    /// Waypoints reachable from `wp` by following its lane.
    pub fn successors(&self, wp: WaypointId) -> impl Iterator<Item = WaypointId> + '_ {
        self.out_edges(wp)
            .filter(|e| self.edge_kind[e.index()] == EdgeKind::Follow)
            .map(|e| self.edge_to[e.index()])
    }

    /// Waypoints whose lane leads into `wp`.
    pub fn predecessors(&self, wp: WaypointId) -> impl Iterator<Item = WaypointId> + '_ {
        self.in_edges(wp)
            .filter(|e| self.edge_kind[e.index()] == EdgeKind::Follow)
            .map(|e| self.edge_from[e.index()])
    }

    /// Nearest waypoint to `pos` and its distance.  `None` only for an empty
    /// network.
    pub fn snap(&self, pos: Point2) -> Option<(WaypointId, f64)> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| (e.id, e.distance_2(&[pos.x, pos.y]).sqrt()))
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// One point of a lane handed to [`RoadNetworkBuilder::add_lane`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LanePoint {
    pub pos: Point2,
    pub z: f64,
    /// `None` derives the heading from the neighbouring points.
    pub heading: Option<f64>,
    pub speed_limit: f64,
}

impl LanePoint {
    pub fn new(pos: Point2, speed_limit: f64) -> Self {
        Self { pos, z: 0.0, heading: None, speed_limit }
    }
}

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// ```
/// use av_core::{LaneId, Point2};
/// use av_map::{LanePoint, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let pts: Vec<_> = (0..5).map(|i| LanePoint::new(Point2::new(i as f64 * 5.0, 0.0), 10.0)).collect();
/// let lane = b.add_lane(LaneId(0), &pts);
/// let net = b.build();
/// assert_eq!(net.waypoint_count(), 5);
/// assert_eq!(net.edge_count(), 4);
/// assert_eq!(net.successors(lane[0]).collect::<Vec<_>>(), vec![lane[1]]);
/// ```
pub struct RoadNetworkBuilder {
    waypoints: Vec<Waypoint>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from: WaypointId,
    to:   WaypointId,
    kind: EdgeKind,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { waypoints: Vec::new(), raw_edges: Vec::new() }
    }

    /// Add one waypoint and return its id (sequential from 0).
    pub fn add_waypoint(
        &mut self,
        lane: LaneId,
        pos: Point2,
        z: f64,
        heading: f64,
        speed_limit: f64,
    ) -> WaypointId {
        let id = WaypointId(self.waypoints.len() as u32);
        self.waypoints.push(Waypoint {
            id,
            lane,
            pos,
            z,
            heading: normalize_angle(heading),
            speed_limit,
            left: None,
            right: None,
        });
        id
    }

    /// Add a lane as a chain of waypoints connected in order.
    pub fn add_lane(&mut self, lane: LaneId, points: &[LanePoint]) -> Vec<WaypointId> {
        let n = points.len();
        let mut ids = Vec::with_capacity(n);
        for (i, p) in points.iter().enumerate() {
            let heading = p.heading.unwrap_or_else(|| {
                if i + 1 < n {
                    p.pos.heading_to(points[i + 1].pos)
                } else if i > 0 {
                    points[i - 1].pos.heading_to(p.pos)
                } else {
                    0.0
                }
            });
            ids.push(self.add_waypoint(lane, p.pos, p.z, heading, p.speed_limit));
        }
        for w in ids.windows(2) {
            self.connect(w[0], w[1]);
        }
        ids
    }

    /// Directed along-lane edge.
    pub fn connect(&mut self, from: WaypointId, to: WaypointId) {
        self.raw_edges.push(RawEdge { from, to, kind: EdgeKind::Follow });
    }

    /// Record `to` as the left neighbour of `from` and add the lane-change edge.
    pub fn set_left(&mut self, from: WaypointId, to: WaypointId) {
        self.waypoints[from.index()].left = Some(to);
        self.raw_edges.push(RawEdge { from, to, kind: EdgeKind::LaneChange });
    }

    /// Record `to` as the right neighbour of `from` and add the lane-change edge.
    pub fn set_right(&mut self, from: WaypointId, to: WaypointId) {
        self.waypoints[from.index()].right = Some(to);
        self.raw_edges.push(RawEdge { from, to, kind: EdgeKind::LaneChange });
    }

    /// Link two side-by-side waypoints in both directions.
    pub fn link_adjacent(&mut self, right: WaypointId, left: WaypointId) {
        self.set_left(right, left);
        self.set_right(left, right);
    }

    pub fn waypoint(&self, id: WaypointId) -> &Waypoint {
        &self.waypoints[id.index()]
    }

    pub fn waypoint_count(&self) -> usize { self.waypoints.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    pub fn build(self) -> RoadNetwork {
        let n = self.waypoints.len();

        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| (e.from, e.to));
        raw.dedup_by_key(|e| (e.from, e.to));
        let edge_count = raw.len();

        let edge_from: Vec<WaypointId> = raw.iter().map(|e| e.from).collect();
        let edge_to:   Vec<WaypointId> = raw.iter().map(|e| e.to).collect();
        let edge_kind: Vec<EdgeKind>   = raw.iter().map(|e| e.kind).collect();
        let edge_length_m: Vec<f64> = raw
            .iter()
            .map(|e| self.waypoints[e.from.index()].pos.distance(self.waypoints[e.to.index()].pos))
            .collect();

        let mut out_start = vec![0u32; n + 1];
        for e in &raw {
            out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=n {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[n] as usize, edge_count);

        // Reverse adjacency: stable sort of edge ids by destination.
        let mut in_edges: Vec<EdgeId> = (0..edge_count).map(|i| EdgeId(i as u32)).collect();
        in_edges.sort_by_key(|e| edge_to[e.index()]);
        let mut in_start = vec![0u32; n + 1];
        for to in &edge_to {
            in_start[to.index() + 1] += 1;
        }
        for i in 1..=n {
            in_start[i] += in_start[i - 1];
        }

        let entries: Vec<WaypointEntry> = self
            .waypoints
            .iter()
            .map(|w| WaypointEntry { point: [w.pos.x, w.pos.y], id: w.id })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        RoadNetwork {
            waypoints: self.waypoints,
            out_start,
            edge_from,
            edge_to,
            edge_kind,
            edge_length_m,
            in_start,
            in_edges,
            spatial_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
