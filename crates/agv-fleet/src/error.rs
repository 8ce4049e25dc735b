use agv_core::{AgvId, NodeId, PreconditionError, ShelfId};
use agv_event::EventError;
use agv_scene::SceneError;
use agv_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("fleet configuration error: {0}")]
    Config(String),

    #[error("invalid scenario: {0}")]
    Scenario(String),

    #[error("scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no AGV with id {0}")]
    UnknownAgv(AgvId),

    #[error("no shelf with id {0}")]
    UnknownShelf(ShelfId),

    #[error("{0} has no active task")]
    NoTask(AgvId),

    #[error("point {0} is not in the network")]
    UnknownPoint(NodeId),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Event(#[from] EventError),
}

pub type FleetResult<T> = Result<T, FleetError>;

impl From<FleetError> for EventError {
    /// Errors raised inside event actions abort the run.
    fn from(err: FleetError) -> Self {
        match err {
            FleetError::Event(e) => e,
            other => EventError::action(other),
        }
    }
}
