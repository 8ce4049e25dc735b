//! Per-step state export for rendering and telemetry.
//!
//! A [`Snapshot`] holds every AGV's and shelf's global pose at one instant.
//! AGV poses are interpolated along in-flight motions, and a carried shelf
//! takes its carrier's pose.  Producing one never mutates the world.

use agv_core::{ShelfId, SimTime, Vec3};
use serde::Serialize;

use crate::{AgvState, FleetResult, Warehouse};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PoseRecord {
    pub name:     String,
    pub position: Vec3,
    pub heading:  f64,
    /// Behaviour state for AGVs; `None` for shelves.
    pub state:    Option<AgvState>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub time:    SimTime,
    pub agvs:    Vec<PoseRecord>,
    pub shelves: Vec<PoseRecord>,
}

impl Snapshot {
    pub fn to_json(&self) -> FleetResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Warehouse {
    /// Capture every pose at `now`.
    pub fn snapshot(&self, now: SimTime) -> FleetResult<Snapshot> {
        let mut agvs = Vec::with_capacity(self.agvs.len());
        for id in self.agv_ids() {
            let t = self.agv_transform(id, now)?;
            let agv = &self.agvs[id.index()];
            agvs.push(PoseRecord {
                name:     agv.name.clone(),
                position: t.origin,
                heading:  t.heading(),
                state:    Some(agv.state()),
            });
        }

        let mut shelves = Vec::with_capacity(self.shelves.len());
        for (i, shelf) in self.shelves.iter().enumerate() {
            let t = self.shelf_transform(ShelfId(i as u32), now)?;
            shelves.push(PoseRecord {
                name:     shelf.name.clone(),
                position: t.origin,
                heading:  t.heading(),
                state:    None,
            });
        }

        Ok(Snapshot { time: now, agvs, shelves })
    }
}
