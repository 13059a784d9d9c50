//! Perception error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PerceptionError {
    #[error("invalid fake object: {0}")]
    InvalidFakeObject(String),
}

pub type PerceptionResult<T> = Result<T, PerceptionError>;
