//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the output directory with two
//! tables: `ticks` and `diagnostics`.

use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{DiagnosticRow, OutputResult, TickRow};

/// Writes tick output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS ticks (
                 tick          INTEGER PRIMARY KEY,
                 sim_time_secs REAL    NOT NULL,
                 x             REAL    NOT NULL,
                 y             REAL    NOT NULL,
                 yaw           REAL    NOT NULL,
                 v             REAL    NOT NULL,
                 steer         REAL    NOT NULL,
                 state         TEXT    NOT NULL,
                 target_speed  REAL    NOT NULL,
                 path_index    INTEGER NOT NULL,
                 local_points  INTEGER NOT NULL,
                 last_error    TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS diagnostics (
                 tick    INTEGER NOT NULL,
                 kind    TEXT    NOT NULL,
                 message TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO ticks \
             (tick, sim_time_secs, x, y, yaw, v, steer, state, target_speed, path_index, local_points, last_error) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        stmt.execute(rusqlite::params![
            row.tick as i64,
            row.sim_time_secs,
            row.x,
            row.y,
            row.yaw,
            row.v,
            row.steer,
            row.state,
            row.target_speed,
            row.path_index,
            row.local_points,
            row.last_error,
        ])?;
        Ok(())
    }

    fn write_diagnostics(&mut self, rows: &[DiagnosticRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached("INSERT INTO diagnostics (tick, kind, message) VALUES (?1, ?2, ?3)")?;
            for row in rows {
                stmt.execute(rusqlite::params![row.tick as i64, row.kind, row.message])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
