//! The `OutputWriter` trait implemented by all backend writers.

use crate::{DiagnosticRow, OutputResult, TickRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors are stored by [`SimOutputObserver`](crate::SimOutputObserver) and
/// retrieved with its `take_error`.
pub trait OutputWriter {
    fn write_tick(&mut self, row: &TickRow) -> OutputResult<()>;

    /// Write a batch of diagnostic rows.
    fn write_diagnostics(&mut self, rows: &[DiagnosticRow]) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
