//! Framework error type.
//!
//! Sub-crates define their own error enums; the ones that can fail at
//! start-up convert into `AvError` via `From` impls.

use thiserror::Error;

/// The top-level error type for `av-core` and initialisation failures.
#[derive(Debug, Error)]
pub enum AvError {
    /// Malformed or missing required parameters.  Always fatal: the loop is
    /// never started with an invalid configuration.
    #[error("configuration invalid: {0}")]
    ConfigurationInvalid(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `av-*` crates.
pub type AvResult<T> = Result<T, AvError>;
