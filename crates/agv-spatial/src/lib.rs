//! `agv-spatial` — the point graph, pathfinding, and node reservations.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | [`network`]       | `SpatialGraph` (CSR over named points), `SpatialGraphBuilder` |
//! | [`pathfind`]      | `Pathfinder` trait, `AStar` with reusable scratch         |
//! | [`reservation`]   | `ReservationTable`: at most one holder per node          |
//! | [`error`]         | `SpatialError`, `SpatialResult<T>`                       |
//!
//! "No path" is not an error: [`Pathfinder::find_path`] returns `None` and
//! the caller relaxes its constraints or retries later.  Likewise a failed
//! reservation is just `false`.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod network;
pub mod pathfind;
pub mod reservation;


pub use error::{SpatialError, SpatialResult};
pub use network::{NodeSet, SpatialGraph, SpatialGraphBuilder};
pub use pathfind::{AStar, Pathfinder};
pub use reservation::ReservationTable;
