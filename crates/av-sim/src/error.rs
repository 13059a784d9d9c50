use thiserror::Error;

use av_core::AvError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] AvError),

    #[error("road network has no waypoints")]
    EmptyNetwork,

    #[error("trace was recorded on map {recorded:?}, simulator uses {current:?}")]
    TraceMapMismatch {
        recorded: String,
        current:  String,
    },
}

pub type SimResult<T> = Result<T, SimError>;
