use std::fmt;

use sq_core::{CoreError, SourceId, SynapseId};
use thiserror::Error;

/// Where an invalid delay value was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayOrigin {
    /// Looked up for a synapse while expanding active sources.
    Synapse(SynapseId),
    /// Position within a raw delay slice passed by the caller.
    Position(usize),
    /// Found while scanning the whole delay table during sizing.
    Table,
}

impl fmt::Display for DelayOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayOrigin::Synapse(s)   => write!(f, "{s}"),
            DelayOrigin::Position(i)  => write!(f, "batch position {i}"),
            DelayOrigin::Table        => write!(f, "delay table"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueueError {
    #[error("invalid delay {delay} at {origin}: delays must be non-negative")]
    InvalidDelay { origin: DelayOrigin, delay: i32 },

    #[error("delay {delay} does not fit a queue of {rows} buckets")]
    DelayOutOfRange { delay: u32, rows: usize },

    #[error("{what} length {got} does not match target count {expected}")]
    InvalidBatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("queue was sized for a fixed delay of {expected} but saw {got}; re-run compress")]
    StaleClassification { expected: u32, got: u32 },

    #[error("{0} is not a known source")]
    UnknownSource(SourceId),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type QueueResult<T> = Result<T, QueueError>;
