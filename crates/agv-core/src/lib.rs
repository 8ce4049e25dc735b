//! `agv-core` — foundational types for the AGV fleet simulation kernel.
//!
//! Every other `agv-*` crate depends on this one.  It has no `agv-*`
//! dependencies and only `rand` and `thiserror` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `EntityId`, `NodeId`, `EventId`, `AgvId`, `ShelfId`   |
//! | [`geo`]         | `Vec3`, `Transform3` (rigid, yaw-about-Y)             |
//! | [`time`]        | `SimTime`, `SimClock`, `SimConfig`                    |
//! | [`ordering`]    | `OrderingMode` tie-break policy                       |
//! | [`rng`]         | `SimRng`                                              |
//! | [`error`]       | `PreconditionError`, `PreconditionResult`             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geo;
pub mod ids;
pub mod ordering;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{PreconditionError, PreconditionResult};
pub use geo::{Transform3, Vec3, heading_diff, normalize_heading};
pub use ids::{AgvId, EntityId, EventId, NodeId, ShelfId};
pub use ordering::OrderingMode;
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, SimTime};
