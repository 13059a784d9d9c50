//! Simulation trace files.
//!
//! A trace is a one-record CSV:
//!
//! ```text
//! start_x,start_y,start_yaw,goal_x,goal_y,goal_yaw,map_source
//! 0.0,0.0,0.0,100.0,0.0,0.0,preloaded
//! ```
//!
//! An absent pose leaves all three of its columns empty.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use av_core::Pose;
use av_sim::SimulationTrace;

use crate::{OutputError, OutputResult};

#[derive(Debug, Serialize, Deserialize)]
struct TraceRecord {
    start_x:    Option<f64>,
    start_y:    Option<f64>,
    start_yaw:  Option<f64>,
    goal_x:     Option<f64>,
    goal_y:     Option<f64>,
    goal_yaw:   Option<f64>,
    map_source: String,
}

fn split(p: Option<Pose>) -> (Option<f64>, Option<f64>, Option<f64>) {
    match p {
        Some(p) => (Some(p.x), Some(p.y), Some(p.yaw)),
        None => (None, None, None),
    }
}

fn join(name: &str, x: Option<f64>, y: Option<f64>, yaw: Option<f64>) -> OutputResult<Option<Pose>> {
    match (x, y, yaw) {
        (Some(x), Some(y), Some(yaw)) => Ok(Some(Pose::new(x, y, yaw))),
        (None, None, None) => Ok(None),
        _ => Err(OutputError::InvalidTrace(format!("{name} pose is only partially set"))),
    }
}

/// Write `trace` to `path`, creating the parent directory if needed.
pub fn save_trace(path: &Path, trace: &SimulationTrace) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let (start_x, start_y, start_yaw) = split(trace.start_pose);
    let (goal_x, goal_y, goal_yaw) = split(trace.goal_pose);
    let mut w = csv::Writer::from_path(path)?;
    w.serialize(TraceRecord {
        start_x,
        start_y,
        start_yaw,
        goal_x,
        goal_y,
        goal_yaw,
        map_source: trace.map_source.clone(),
    })?;
    w.flush()?;
    info!(path = %path.display(), "simulation trace saved");
    Ok(())
}

/// Read a trace written by [`save_trace`].
pub fn load_trace(path: &Path) -> OutputResult<SimulationTrace> {
    let mut r = csv::Reader::from_path(path)?;
    let record = match r.deserialize::<TraceRecord>().next() {
        Some(rec) => rec?,
        None => return Err(OutputError::EmptyTrace(path.to_path_buf())),
    };
    if record.map_source.is_empty() {
        return Err(OutputError::InvalidTrace("map_source is empty".to_string()));
    }
    Ok(SimulationTrace {
        start_pose: join("start", record.start_x, record.start_y, record.start_yaw)?,
        goal_pose:  join("goal", record.goal_x, record.goal_y, record.goal_yaw)?,
        map_source: record.map_source,
    })
}
