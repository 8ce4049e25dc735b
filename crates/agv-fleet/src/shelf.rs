use agv_core::{AgvId, EntityId, NodeId};
use serde::{Deserialize, Serialize};

/// Where a shelf currently is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelfLocation {
    Point(NodeId),
    Carried(AgvId),
}

#[derive(Debug)]
pub struct Shelf {
    pub name:   String,
    pub entity: EntityId,
    pub home:   NodeId,
    /// Point this shelf is bound for; equals `home` when no delivery is
    /// outstanding.  The dispatcher never targets a destination that some
    /// shelf is already bound for.
    pub(crate) destination: NodeId,
    pub(crate) location:    ShelfLocation,
}

impl Shelf {
    pub(crate) fn new(name: String, entity: EntityId, home: NodeId) -> Self {
        Self { name, entity, home, destination: home, location: ShelfLocation::Point(home) }
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub fn location(&self) -> ShelfLocation {
        self.location
    }

    /// The point the shelf rests on, if it is not being carried.
    pub fn resting_point(&self) -> Option<NodeId> {
        match self.location {
            ShelfLocation::Point(n)   => Some(n),
            ShelfLocation::Carried(_) => None,
        }
    }
}
