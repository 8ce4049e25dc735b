//! The recurring task source.
//!
//! Every tick the dispatcher tries to hand out one job: a random shelf from
//! the unassigned pool goes to the nearest free AGV, bound for a random
//! destination no other shelf is already bound for.  A shelf re-enters the
//! pool once its job completes.

use agv_core::{AgvId, EventId, NodeId, ShelfId};
use agv_event::{EventResult, Scheduler};
use tracing::debug;

use crate::{FleetParams, FleetResult, Task, Warehouse};

/// Periodic dispatch event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dispatcher {
    interval: f64,
}

impl Dispatcher {
    pub fn new(interval: f64) -> Self {
        Self { interval }
    }

    pub fn from_params(params: &FleetParams) -> Self {
        Self::new(params.dispatch_interval_secs)
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Schedule the first tick at the current time.  Each tick re-inserts
    /// the next one `interval` later.
    pub fn start(self, sched: &mut Scheduler<'_, Warehouse>) -> EventResult<EventId> {
        sched.schedule_in(0.0, "dispatch", move |w: &mut Warehouse, s: &mut Scheduler<'_, Warehouse>| {
            self.tick(w, s)
        })
    }

    fn tick(self, world: &mut Warehouse, sched: &mut Scheduler<'_, Warehouse>) -> EventResult<()> {
        world.dispatch_once(sched)?;
        sched.schedule_in(self.interval, "dispatch", move |w: &mut Warehouse, s: &mut Scheduler<'_, Warehouse>| {
            self.tick(w, s)
        })?;
        Ok(())
    }
}

impl Warehouse {
    /// Destination points no shelf is currently bound for.
    pub fn available_destinations(&self) -> Vec<NodeId> {
        self.dest_points
            .iter()
            .copied()
            .filter(|d| !self.shelves.iter().any(|s| s.destination == *d))
            .collect()
    }

    /// Try to hand out one job.  Returns the assignment made, if any.
    pub fn dispatch_once(
        &mut self,
        sched: &mut Scheduler<'_, Warehouse>,
    ) -> FleetResult<Option<(AgvId, ShelfId, NodeId)>> {
        let dests = self.available_destinations();
        if dests.is_empty() {
            return Ok(None);
        }
        let Some(&shelf) = self.rng.choose(&self.unassigned) else {
            return Ok(None);
        };

        let now = sched.now();
        let target = self.shelf_transform(shelf, now)?.origin;
        let mut by_distance = Vec::with_capacity(self.agvs.len());
        for id in self.agv_ids() {
            by_distance.push((self.agv_position(id, now)?.distance(target), id));
        }
        // Stable, so equidistant AGVs keep fleet order.
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

        let chosen = by_distance.into_iter().map(|(_, id)| id).find(|id| {
            let agv = &self.agvs[id.index()];
            agv.can_do_next_task() && agv.cargo.is_none()
        });
        let Some(agv) = chosen else {
            debug!(shelf = %self.shelves[shelf.index()].name, "no free AGV; skipping tick");
            return Ok(None);
        };

        let Some(&dest) = self.rng.choose(&dests) else {
            return Ok(None);
        };
        self.begin_task(sched, agv, Task { shelf, dest })?;
        Ok(Some((agv, shelf, dest)))
    }
}
