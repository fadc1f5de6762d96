use sq_core::{CoreError, Tick};
use sq_queue::QueueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("pathway {pathway}: {source}")]
    Queue {
        pathway: usize,
        #[source]
        source:  QueueError,
    },

    #[error("stepper halted after tick {tick} failed")]
    Halted { tick: Tick },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
