//! `agv-fleet` — the warehouse world driven by the simulation kernel.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`warehouse`] | `Warehouse` world, `WarehouseBuilder`, transition log          |
//! | [`agv`]       | `Agv`, `AgvState`, `Task`, `Motion`                            |
//! | [`shelf`]     | `Shelf`, `ShelfLocation`                                       |
//! | [`task`]      | `TaskStep` transition table, `assign_task`                    |
//! | [`navigate`]  | reservation-based navigation with wait / timeout recovery      |
//! | [`dispatch`]  | `Dispatcher` recurring event                                   |
//! | [`scenario`]  | JSON scenario description and loading                          |
//! | [`export`]    | `Snapshot` / `PoseRecord` state export                         |
//! | [`params`]    | `FleetParams` and the fleet's tracked attributes               |
//! | [`error`]     | `FleetError`, `FleetResult<T>`                                 |
//!
//! # Driving a run
//!
//! ```rust,ignore
//! let scenario = Scenario::from_path("warehouse.json")?;
//! let mut sim = build_simulation(&scenario, FleetParams::default(), SimConfig::default())?;
//! sim.with_scheduler(|_, s| Dispatcher::from_params(&FleetParams::default()).start(s))?;
//! sim.run_until(SimTime(600.0))?;
//! ```
//!
//! Tasks can also be submitted directly:
//!
//! ```rust,ignore
//! sim.with_scheduler(|w, s| w.assign_task(s, agv, shelf, dest))?;
//! ```

pub mod agv;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod navigate;
pub mod params;
pub mod scenario;
pub mod shelf;
pub mod task;
pub mod warehouse;

#[cfg(test)]
mod tests;

pub use agv::{Agv, AgvState, Motion, Task};
pub use dispatch::Dispatcher;
pub use error::{FleetError, FleetResult};
pub use export::{PoseRecord, Snapshot};
pub use params::FleetParams;
pub use scenario::{NetworkSpec, Scenario};
pub use shelf::{Shelf, ShelfLocation};
pub use task::TaskStep;
pub use warehouse::{Completion, Transition, Warehouse, WarehouseBuilder};

use agv_core::SimConfig;
use agv_sim::Simulator;

/// Build the world for `scenario` and wrap it in a simulator.  The
/// dispatcher RNG and the queue's tie-break RNG both derive from
/// `config.seed`.
pub fn build_simulation(
    scenario: &Scenario,
    params:   FleetParams,
    config:   SimConfig,
) -> FleetResult<Simulator<Warehouse>> {
    let world = scenario.build(params, config.seed)?;
    Ok(Simulator::new(config, world))
}
