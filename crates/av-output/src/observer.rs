//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use av_core::Tick;
use av_sim::{SimObserver, TickReport};
use tracing::warn;

use crate::row::{DiagnosticRow, TickRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes tick rows and diagnostics to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    /// Write a tick row every `interval` ticks; diagnostics are always written.
    interval:   u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer that records every tick.
    pub fn new(writer: W) -> Self {
        Self { writer, interval: 1, last_error: None }
    }

    /// Record only every `n`-th tick (`n = 0` is treated as 1).
    pub fn every(mut self, n: u64) -> Self {
        self.interval = n.max(1);
        self
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer.  `Sim::run` does this through `on_sim_end`; call it
    /// directly after `Sim::run_ticks`.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, report: &TickReport) {
        if report.tick.0 % self.interval == 0 {
            let result = self.writer.write_tick(&TickRow::from(report));
            self.store_err(result);
        }
        if !report.diagnostics.is_empty() {
            let rows: Vec<DiagnosticRow> =
                report.diagnostics.iter().map(|d| DiagnosticRow::new(report.tick.0, d)).collect();
            let result = self.writer.write_diagnostics(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
