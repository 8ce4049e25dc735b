use agv_core::{EntityId, PreconditionError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("entity {0} is not in the scene")]
    UnknownEntity(EntityId),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

pub type SceneResult<T> = Result<T, SceneError>;
