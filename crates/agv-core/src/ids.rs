//! Strongly typed identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Dense IDs (`NodeId`, `AgvId`,
//! `ShelfId`) index straight into `Vec`s via `.index()`; sparse IDs
//! (`EntityId`, `EventId`) are handed out by a monotonic counter and are only
//! ever looked up through a map.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Identity of a scene-graph entity.  Allocated in creation order from a
    /// process-wide counter and never reused.
    pub struct EntityId(u64);
}

typed_id! {
    /// Index of a point in the spatial graph.
    pub struct NodeId(u32);
}

typed_id! {
    /// Identity of an event handed out by the queue on insertion.
    pub struct EventId(u64);
}

typed_id! {
    /// Index of an AGV in the fleet.
    pub struct AgvId(u32);
}

typed_id! {
    /// Index of a shelf in the warehouse.
    pub struct ShelfId(u32);
}

static NEXT_ENTITY: AtomicU64 = AtomicU64::new(0);

impl EntityId {
    /// Allocate the next entity id.  Ids are strictly increasing across the
    /// whole process, so a stale id can never alias a newer entity.
    pub fn allocate() -> EntityId {
        EntityId(NEXT_ENTITY.fetch_add(1, Ordering::Relaxed))
    }
}
