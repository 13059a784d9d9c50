//! CSV output backend.
//!
//! Creates two files in the output directory:
//! - `ticks.csv`
//! - `diagnostics.csv`

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;
use tracing::debug;

use crate::writer::OutputWriter;
use crate::{DiagnosticRow, OutputResult, TickRow};

pub const TICK_HEADERS: [&str; 12] = [
    "tick", "sim_time_secs", "x", "y", "yaw", "v", "steer", "state",
    "target_speed", "path_index", "local_points", "last_error",
];

pub const DIAGNOSTIC_HEADERS: [&str; 3] = ["tick", "kind", "message"];

/// Writes tick output to two CSV files.
pub struct CsvWriter {
    ticks:       Writer<File>,
    diagnostics: Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the two CSV files and write the header
    /// rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;
        let mut ticks = Writer::from_path(dir.join("ticks.csv"))?;
        ticks.write_record(TICK_HEADERS)?;

        let mut diagnostics = Writer::from_path(dir.join("diagnostics.csv"))?;
        diagnostics.write_record(DIAGNOSTIC_HEADERS)?;

        debug!(dir = %dir.display(), "csv output opened");
        Ok(Self { ticks, diagnostics, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()> {
        self.ticks.write_record(&[
            row.tick.to_string(),
            format!("{:.3}", row.sim_time_secs),
            format!("{:.4}", row.x),
            format!("{:.4}", row.y),
            format!("{:.5}", row.yaw),
            format!("{:.4}", row.v),
            format!("{:.5}", row.steer),
            row.state.to_string(),
            format!("{:.4}", row.target_speed),
            row.path_index.to_string(),
            row.local_points.to_string(),
            row.last_error.clone(),
        ])?;
        Ok(())
    }

    fn write_diagnostics(&mut self, rows: &[DiagnosticRow]) -> OutputResult<()> {
        for row in rows {
            self.diagnostics.write_record(&[row.tick.to_string(), row.kind.to_string(), row.message.clone()])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.ticks.flush()?;
        self.diagnostics.flush()?;
        Ok(())
    }
}
