//! Map-source strategies.
//!
//! The source is picked once from configuration and resolved into a single
//! [`RoadNetwork`] before the loop starts; planning never branches on it.
//!
//! # CSV lane format
//!
//! One row per waypoint.  Rows of a lane are consecutive and in driving
//! order; each consecutive pair becomes a `Follow` edge.
//!
//! ```csv
//! lane_id,x,y,z,heading,speed_limit,next_lane,left_lane,right_lane
//! 0,0.0,0.0,0.0,,10.0,,1,
//! 0,5.0,0.0,0.0,,10.0,,1,
//! 1,0.0,3.5,0.0,,10.0,,,0
//! 1,5.0,3.5,0.0,,10.0,,,0
//! ```
//!
//! | Column        | Meaning                                                  |
//! |---------------|----------------------------------------------------------|
//! | `z`           | optional, defaults to 0                                  |
//! | `heading`     | optional, derived from the neighbouring rows when empty  |
//! | `next_lane`   | on a lane's last row: join it to that lane's first row   |
//! | `left_lane`   | link this row to the nearest waypoint of that lane       |
//! | `right_lane`  | likewise, to the right                                   |

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use av_core::{LaneId, MapSource, Point2, WaypointId};

use crate::network::{LanePoint, RoadNetwork, RoadNetworkBuilder};
use crate::{MapError, MapResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LaneRecord {
    lane_id:     u32,
    x:           f64,
    y:           f64,
    z:           Option<f64>,
    heading:     Option<f64>,
    speed_limit: f64,
    next_lane:   Option<u32>,
    left_lane:   Option<u32>,
    right_lane:  Option<u32>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve `source` into a road network.
///
/// `preloaded` is consumed only by `MapSource::Preloaded`.
pub fn load_network(source: &MapSource, preloaded: Option<RoadNetwork>) -> MapResult<RoadNetwork> {
    let network = match source {
        MapSource::Preloaded => preloaded.ok_or(MapError::MissingPreloaded)?,
        MapSource::File(path) => load_lanes_csv(path)?,
        MapSource::Folder(dir) => load_lanes_folder(dir)?,
    };
    if network.is_empty() {
        return Err(MapError::EmptyNetwork);
    }
    info!(
        source = %source,
        waypoints = network.waypoint_count(),
        edges = network.edge_count(),
        "road network loaded"
    );
    Ok(network)
}

/// Load a network from one lane CSV file.
pub fn load_lanes_csv(path: &Path) -> MapResult<RoadNetwork> {
    let file = std::fs::File::open(path)?;
    load_lanes_reader(file)
}

/// Like [`load_lanes_csv`] but accepts any `Read` source.
pub fn load_lanes_reader<R: Read>(reader: R) -> MapResult<RoadNetwork> {
    build_from_records(read_records(reader)?)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Every `*.csv` file in `dir`, in lexical order, merged into one network.
fn load_lanes_folder(dir: &Path) -> MapResult<RoadNetwork> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();

    let mut records = Vec::new();
    for path in &files {
        debug!(file = %path.display(), "reading lane file");
        records.extend(read_records(std::fs::File::open(path)?)?);
    }
    build_from_records(records)
}

fn read_records<R: Read>(reader: R) -> MapResult<Vec<LaneRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    csv_reader
        .deserialize::<LaneRecord>()
        .map(|row| row.map_err(|e| MapError::Parse(e.to_string())))
        .collect()
}

fn build_from_records(records: Vec<LaneRecord>) -> MapResult<RoadNetwork> {
    // Group rows by lane, keeping lanes in order of first appearance.
    let mut order: Vec<u32> = Vec::new();
    let mut by_lane: HashMap<u32, Vec<LaneRecord>> = HashMap::new();
    for r in records {
        let lane = r.lane_id;
        by_lane
            .entry(lane)
            .or_insert_with(|| {
                order.push(lane);
                Vec::new()
            })
            .push(r);
    }

    let mut b = RoadNetworkBuilder::new();
    let mut lane_ids: HashMap<u32, Vec<WaypointId>> = HashMap::with_capacity(order.len());
    for lane in &order {
        let points: Vec<LanePoint> = by_lane[lane]
            .iter()
            .map(|r| LanePoint {
                pos: Point2::new(r.x, r.y),
                z: r.z.unwrap_or(0.0),
                heading: r.heading,
                speed_limit: r.speed_limit,
            })
            .collect();
        lane_ids.insert(*lane, b.add_lane(LaneId(*lane), &points));
    }

    for lane in &order {
        let rows = &by_lane[lane];
        let ids = &lane_ids[lane];

        if let (Some(next), Some(&last)) = (rows.last().and_then(|r| r.next_lane), ids.last()) {
            let first = lane_ids
                .get(&next)
                .and_then(|n| n.first().copied())
                .ok_or(MapError::UnknownLane { lane: *lane, target: next })?;
            b.connect(last, first);
        }

        for (row, &wp) in rows.iter().zip(ids) {
            if let Some(target) = row.left_lane {
                let n = nearest_in_lane(&b, &lane_ids, *lane, target, wp)?;
                b.set_left(wp, n);
            }
            if let Some(target) = row.right_lane {
                let n = nearest_in_lane(&b, &lane_ids, *lane, target, wp)?;
                b.set_right(wp, n);
            }
        }
    }

    Ok(b.build())
}

fn nearest_in_lane(
    b: &RoadNetworkBuilder,
    lane_ids: &HashMap<u32, Vec<WaypointId>>,
    lane: u32,
    target: u32,
    wp: WaypointId,
) -> MapResult<WaypointId> {
    let pos = b.waypoint(wp).pos;
    lane_ids
        .get(&target)
        .and_then(|ids| {
            ids.iter().copied().min_by(|a, c| {
                let da = b.waypoint(*a).pos.distance(pos);
                let dc = b.waypoint(*c).pos.distance(pos);
                da.total_cmp(&dc)
            })
        })
        .ok_or(MapError::UnknownLane { lane, target })
}
