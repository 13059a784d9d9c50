//! Error types for av-output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when writing output or reading a trace back.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("trace file {0} has no record")]
    EmptyTrace(PathBuf),

    #[error("invalid trace: {0}")]
    InvalidTrace(String),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
