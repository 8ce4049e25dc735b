//! Conflict-aware navigation.
//!
//! `navigate` runs whenever an AGV has no motion in flight and may need to
//! make progress: after a task sets a new destination, after every move or
//! rotation completes, and when a wait condition or timeout fires.
//!
//! ```text
//! navigate(agv):
//!   at destination?     → drop plan, re-lock current node, run arrival step
//!   no plan?            → search avoiding other AGVs' nodes (+ shelves when loaded);
//!                         on failure search again ignoring reservations
//!   update_locks        → release all, hold current, reserve ahead up to the first conflict
//!   next node held and no conflict:
//!       facing it?      → move there, pop plan head
//!       otherwise       → rotate in place toward it
//!   otherwise           → wait for the contested node to free up (if planned)
//!                         + timeout that drops the plan and retries
//! ```
//!
//! Only nodes the AGV has reserved are ever moved onto, so two AGVs never
//! occupy or enter the same node.  The fallback search may produce a plan
//! through held nodes; such a plan simply blocks at the first one until it
//! frees up or the timeout re-plans.

use std::f64::consts::{PI, TAU};

use agv_core::{AgvId, NodeId, SimTime, heading_diff, normalize_heading};
use agv_event::Scheduler;
use agv_spatial::{NodeSet, Pathfinder};
use tracing::{debug, warn};

use crate::{AgvState, FleetError, FleetResult, Motion, TaskStep, Warehouse};

type Sched<'a> = Scheduler<'a, Warehouse>;

impl Warehouse {
    /// Point `id` at a new destination with `step` as its arrival
    /// continuation.  Navigation starts immediately unless a motion is in
    /// flight, in which case it picks up when that motion completes.
    pub(crate) fn set_destination(
        &mut self,
        sched: &mut Sched<'_>,
        id:    AgvId,
        dest:  NodeId,
        step:  TaskStep,
    ) -> FleetResult<()> {
        let agv = self.agv_mut(id)?;
        agv.destination = dest;
        agv.plan = None;
        agv.on_arrival = Some(step);
        if agv.motion.is_none() {
            self.clear_wait_events(sched, id)?;
            self.navigate(sched, id)?;
        }
        Ok(())
    }

    /// Retract both halves of a wait/timeout pair.
    fn clear_wait_events(&mut self, sched: &mut Sched<'_>, id: AgvId) -> FleetResult<()> {
        let agv = self.agv_mut(id)?;
        for event in [agv.wait_event.take(), agv.timeout_event.take()].into_iter().flatten() {
            sched.cancel(event);
        }
        Ok(())
    }

    pub(crate) fn navigate(&mut self, sched: &mut Sched<'_>, id: AgvId) -> FleetResult<()> {
        let (at_destination, planned) = {
            let agv = self.agv(id)?;
            (agv.node == agv.destination, agv.plan.is_some())
        };
        if at_destination {
            let agv = self.agv_mut(id)?;
            agv.plan = None;
            agv.motion = None;
            let step = agv.on_arrival.take();
            self.update_locks(id)?;
            if let Some(step) = step {
                self.run_step(sched, id, step)?;
            }
            return Ok(());
        }

        if !planned {
            let plan = self.plan_route(id)?;
            self.agv_mut(id)?.plan = plan;
        }

        let conflict = self.update_locks(id)?;
        let agv = self.agv(id)?;
        let next = match agv.plan.as_deref() {
            Some([_, next, ..]) => Some(*next),
            _ => None,
        };

        match next {
            Some(next) if conflict.is_none() && self.reservations.holder(next) == Some(id) => {
                self.start_motion(sched, id, next)
            }
            _ => self.block(sched, id, conflict),
        }
    }

    /// Search a route from the current node to the destination.
    fn plan_route(&mut self, id: AgvId) -> FleetResult<Option<Vec<NodeId>>> {
        let agv = self.agvs.get(id.index()).ok_or(FleetError::UnknownAgv(id))?;
        let (start, goal) = (agv.node, agv.destination);

        // A loaded AGV cannot pass under another shelf.
        let mut shelves = NodeSet::new();
        if agv.cargo.is_some() {
            shelves.extend(self.shelves.iter().filter_map(|s| s.resting_point()));
            shelves.remove(&goal);
        }

        let mut avoid = shelves.clone();
        avoid.extend(
            self.reservations
                .locked_nodes()
                .filter(|(_, holder)| *holder != id)
                .map(|(node, _)| node),
        );

        if let Some(path) = self.pathfinder.find_path(&self.graph, start, goal, &avoid) {
            debug!(agv = %agv.name, hops = path.len() - 1, "planned route");
            return Ok(Some(path));
        }
        let path = self.pathfinder.find_path(&self.graph, start, goal, &shelves);
        match &path {
            Some(p) => warn!(agv = %agv.name, hops = p.len() - 1, "no free route; planning through reserved nodes"),
            None    => debug!(agv = %agv.name, "no route to destination"),
        }
        Ok(path)
    }

    /// Release everything `id` holds, re-hold its current node, and reserve
    /// up to `lookahead` plan nodes ahead, stopping at the first one held by
    /// another AGV.  Returns that contested node, if any.
    fn update_locks(&mut self, id: AgvId) -> FleetResult<Option<NodeId>> {
        let lookahead = self.params.lookahead;
        let agv = self.agvs.get_mut(id.index()).ok_or(FleetError::UnknownAgv(id))?;

        for node in agv.held.drain(..) {
            self.reservations.release(node, id);
        }
        if let Some(other) = self.reservations.claim(agv.node, id) {
            warn!(agv = %agv.name, node = %agv.node, %other, "took over a node held by another AGV");
        }
        agv.held.push(agv.node);

        let mut conflict = None;
        if let Some(plan) = &agv.plan {
            for &node in plan.iter().skip(1).take(lookahead) {
                if self.reservations.try_reserve(node, id) {
                    agv.held.push(node);
                } else {
                    debug!(agv = %agv.name, %node, holder = ?self.reservations.holder(node), "node contested");
                    conflict = Some(node);
                    break;
                }
            }
        }
        Ok(conflict)
    }

    /// Schedule a move onto `next`, or a rotation toward it if not facing it.
    fn start_motion(&mut self, sched: &mut Sched<'_>, id: AgvId, next: NodeId) -> FleetResult<()> {
        let speed = self.travel_speed()?;
        let turn_rate = self.turn_rate()?;
        let eps = self.params.heading_epsilon;

        let agv = self.agv(id)?;
        let here = self.graph.position(agv.node);
        let target = here.heading_to(self.graph.position(next));

        let (to, to_heading, duration) = if heading_diff(target, agv.heading) < eps {
            (next, agv.heading, here.distance(self.graph.position(next)) / speed)
        } else {
            let rot = shortest_turn(agv.heading, target);
            (agv.node, rot, (agv.heading - rot).abs() / turn_rate)
        };

        let now = sched.now();
        let end = now + duration;
        let event = sched.schedule_at(end, "agv-motion", move |w: &mut Warehouse, s: &mut Sched<'_>| {
            Ok(w.finish_motion(s, id)?)
        })?;

        let agv = self.agv_mut(id)?;
        debug!(agv = %agv.name, from = %agv.node, %to, heading = to_heading, end = end.0, "motion");
        agv.motion = Some(Motion {
            event,
            from: agv.node,
            to,
            from_heading: agv.heading,
            to_heading,
            start: now,
            end,
        });
        if to != agv.node {
            if let Some(plan) = agv.plan.as_mut() {
                plan.remove(0);
            }
        }
        Ok(())
    }

    fn finish_motion(&mut self, sched: &mut Sched<'_>, id: AgvId) -> FleetResult<()> {
        let agv = self.agv_mut(id)?;
        if let Some(m) = agv.motion.take() {
            agv.node = m.to;
            agv.heading = normalize_heading(m.to_heading);
        }
        self.sync_agv_frame(id)?;
        self.navigate(sched, id)
    }

    /// No motion this step: wait for `contested` to free up and arm a
    /// timeout that discards the plan.
    fn block(&mut self, sched: &mut Sched<'_>, id: AgvId, contested: Option<NodeId>) -> FleetResult<()> {
        let has_plan = self.agv(id)?.plan.is_some();

        let wait_event = match contested {
            Some(node) if has_plan => Some(sched.when(
                "agv-unblocked",
                move |w: &Warehouse| w.reservations.is_free(node),
                move |w: &mut Warehouse, s: &mut Sched<'_>| Ok(w.resume(s, id)?),
            )?),
            _ => None,
        };

        let timeout = if has_plan {
            self.params.blocked_timeout_secs
        } else {
            self.params.no_plan_timeout_secs
        };
        let timeout_event = sched.schedule_in(timeout, "agv-timeout", move |w: &mut Warehouse, s: &mut Sched<'_>| {
            Ok(w.reroute(s, id)?)
        })?;

        let agv = self.agv_mut(id)?;
        debug!(agv = %agv.name, ?contested, has_plan, timeout, "blocked");
        agv.motion = None;
        agv.wait_event = wait_event;
        agv.timeout_event = Some(timeout_event);
        Ok(())
    }

    /// The contested node freed up: keep the plan and try again.
    fn resume(&mut self, sched: &mut Sched<'_>, id: AgvId) -> FleetResult<()> {
        self.clear_wait_events(sched, id)?;
        self.navigate(sched, id)
    }

    /// Waited too long: drop the plan and search again.
    fn reroute(&mut self, sched: &mut Sched<'_>, id: AgvId) -> FleetResult<()> {
        self.clear_wait_events(sched, id)?;
        let agv = self.agv_mut(id)?;
        debug!(agv = %agv.name, "wait timed out; re-planning");
        agv.plan = None;
        self.navigate(sched, id)
    }

    /// `true` once `id` is idle at rest with nothing scheduled for it.
    /// Task steps are only queued while a task is in progress, so an idle
    /// AGV with no motion and no wait has no pending events.
    pub fn is_settled(&self, id: AgvId) -> FleetResult<bool> {
        let agv = self.agv(id)?;
        Ok(agv.state() == AgvState::Idle
            && agv.task.is_none()
            && agv.on_arrival.is_none()
            && agv.motion.is_none()
            && !agv.is_blocked()
            && agv.node == agv.destination)
    }

    /// Time the in-flight motion of `id` completes, if any.
    pub fn motion_end(&self, id: AgvId) -> FleetResult<Option<SimTime>> {
        Ok(self.agv(id)?.motion.map(|m| m.end))
    }
}

/// Target angle for rotating from `from` to face `target`, possibly shifted
/// by 2π so the turn never exceeds half a revolution.
pub(crate) fn shortest_turn(from: f64, target: f64) -> f64 {
    if (from - target).abs() <= PI {
        target
    } else if target < from {
        target + TAU
    } else {
        target - TAU
    }
}
