//! Control error type.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ControlError {
    #[error("no active path to follow")]
    NoActivePath,

    #[error("time step must be positive, got {0}")]
    InvalidTimeStep(f64),
}

pub type ControlResult<T> = Result<T, ControlError>;
