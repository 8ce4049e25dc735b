use agv_core::PreconditionError;
use agv_event::EventError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Event(#[from] EventError),
}

pub type SimResult<T> = Result<T, SimError>;
