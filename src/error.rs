use crate::imports::*;
use thiserror::Error;

/*
    Types:
    * ShapeError - A raw payload that does not satisfy the SignalResult invariants
    * FetchError - Signal resolution failed for one shot; recorded per-field, never fatal to a run
    * StageError - A map or where closure returned an error; marks the shot failed
    * RecordError - The per-field error stored on a Record (fetch or stage)
    * BackendError - Infrastructure-level failure; the only error that escapes compute()
*/

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("data has {data_len} samples but times has {times_len}")]
    LengthMismatch { data_len: usize, times_len: usize },

    #[error("units given for a times axis that is not present")]
    UnitsWithoutAxis,
}

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The store has no such expression/tree/path for this shot.
    #[error("signal '{signal}' not found for shot {shot}")]
    NotFound { shot: ShotId, signal: String },

    /// The store could not be reached or rejected the request.
    #[error("signal '{signal}' unavailable for shot {shot}: {detail}")]
    Unavailable {
        shot: ShotId,
        signal: String,
        detail: String,
    },

    /// The per-fetch timeout elapsed before the store answered.
    #[error("fetch of '{signal}' for shot {shot} timed out after {timeout:?}")]
    Timeout {
        shot: ShotId,
        signal: String,
        timeout: Duration,
    },

    /// The store answered with a payload violating the SignalResult invariants.
    #[error("malformed shape for '{signal}' on shot {shot}: {source}")]
    MalformedShape {
        shot: ShotId,
        signal: String,
        source: ShapeError,
    },
}

impl FetchError {
    pub fn shot(&self) -> ShotId {
        match self {
            Self::NotFound { shot, .. }
            | Self::Unavailable { shot, .. }
            | Self::Timeout { shot, .. }
            | Self::MalformedShape { shot, .. } => *shot,
        }
    }

    pub fn signal(&self) -> &str {
        match self {
            Self::NotFound { signal, .. }
            | Self::Unavailable { signal, .. }
            | Self::Timeout { signal, .. }
            | Self::MalformedShape { signal, .. } => signal,
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("stage '{stage}' failed for shot {shot}: {message}")]
pub struct StageError {
    pub shot: ShotId,
    /// Positional identity of the stage, e.g. "map[2]" or "where[0]".
    pub stage: String,
    /// Rendered cause chain from the user closure.
    pub message: String,
}

impl StageError {
    pub fn new(shot: ShotId, stage: impl Into<String>, cause: &anyhow::Error) -> Self {
        Self {
            shot,
            stage: stage.into(),
            message: format!("{cause:#}"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RecordError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Stage(#[from] StageError),
}

impl RecordError {
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }

    pub fn is_stage(&self) -> bool {
        matches!(self, Self::Stage(_))
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    /// A worker task panicked or was aborted by the runtime.
    #[error("worker crashed: {0}")]
    WorkerCrashed(String),

    /// A shard exhausted its retry budget.
    #[error("shard of {shots} shots failed after {attempts} attempts: {detail}")]
    ShardFailed {
        shots: usize,
        attempts: u32,
        detail: String,
    },

    /// The run was cancelled before all shots completed.
    #[error("run cancelled before completion")]
    Cancelled,
}
