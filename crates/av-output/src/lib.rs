//! `av-output` — trace persistence and per-tick output for the rust_av
//! simulator.
//!
//! Two tick-output backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                     |
//! |-----------|---------|-----------------------------------|
//! | *(none)*  | CSV     | `ticks.csv`, `diagnostics.csv`    |
//! | `sqlite`  | SQLite  | `output.db`                       |
//!
//! Both implement [`OutputWriter`] and are driven by [`SimOutputObserver`],
//! which implements `av_sim::SimObserver`.  [`save_trace`] / [`load_trace`]
//! persist a [`SimulationTrace`](av_sim::SimulationTrace) so a run can be
//! restarted with `Sim::resume`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use av_output::{CsvWriter, SimOutputObserver, save_trace};
//!
//! let writer = CsvWriter::new(&settings.sim.log_path)?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! save_trace(&settings.sim.log_path.join("trace.csv"), &sim.trace())?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod trace;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{DiagnosticRow, TickRow};
pub use trace::{load_trace, save_trace};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
