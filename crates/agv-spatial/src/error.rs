//! Spatial-subsystem error type.

use thiserror::Error;

use agv_core::NodeId;

/// Errors produced while building or querying the point graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("no point named `{0}`")]
    UnknownPoint(String),

    #[error("point name `{0}` is used twice")]
    DuplicatePoint(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
