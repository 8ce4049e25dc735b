use agv_core::{EventId, PreconditionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("{0} is not pending")]
    NotPending(EventId),

    /// An action failed with an error from the world it was mutating.
    #[error("event action failed: {0}")]
    Action(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl EventError {
    /// Wrap any world-level error raised inside an action.
    pub fn action<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EventError::Action(Box::new(err))
    }
}

pub type EventResult<T> = Result<T, EventError>;
