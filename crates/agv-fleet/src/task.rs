//! The fetch / deliver / return task as an explicit state machine.
//!
//! Each phase of a task is a [`TaskStep`].  A step either fires when the AGV
//! reaches a destination (the arrival continuation) or as a timed event a
//! fixed dwell after the previous one.  [`Warehouse::run_step`] is the single
//! transition table: it performs the step's side effects, moves the AGV's
//! behaviour state, and schedules whatever comes next.
//!
//! ```text
//! step            trigger                 effect
//! ──────────────  ──────────────────────  ─────────────────────────────────────
//! GrabArrived     arrive at shelf point   schedule GrabDone (+grab)
//! GrabDone        timed                   lift shelf; ToDest; go to dest
//! DestArrived     arrive at dest          Waiting; schedule PutShelf (+drop),
//!                                         PickShelf (+dwell−drop), WaitDone (+dwell)
//! PutShelf        timed                   set shelf on dest
//! PickShelf       timed                   lift shelf
//! WaitDone        timed                   ReturnShelf; go to shelf home
//! ReturnArrived   arrive at shelf home    schedule ReturnDone (+return)
//! ReturnDone      timed                   set shelf on home; ToHome; go home
//! HomeArrived     arrive at AGV home      Idle
//! ```

use agv_core::{AgvId, EventId, NodeId, PreconditionError, ShelfId};
use agv_event::Scheduler;
use tracing::info;

use crate::params::Deliveries;
use crate::warehouse::Completion;
use crate::{AgvState, FleetError, FleetResult, Task, Warehouse};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskStep {
    GrabArrived,
    GrabDone,
    DestArrived,
    PutShelf,
    PickShelf,
    WaitDone,
    ReturnArrived,
    ReturnDone,
    HomeArrived,
}

impl TaskStep {
    pub fn label(self) -> &'static str {
        match self {
            TaskStep::GrabArrived   => "grab-arrived",
            TaskStep::GrabDone      => "grab-done",
            TaskStep::DestArrived   => "dest-arrived",
            TaskStep::PutShelf      => "put-shelf",
            TaskStep::PickShelf     => "pick-shelf",
            TaskStep::WaitDone      => "wait-done",
            TaskStep::ReturnArrived => "return-arrived",
            TaskStep::ReturnDone    => "return-done",
            TaskStep::HomeArrived   => "home-arrived",
        }
    }
}

/// Run `step` for `agv` after `delay` seconds.
fn schedule_step(
    sched: &mut Scheduler<'_, Warehouse>,
    agv:   AgvId,
    delay: f64,
    step:  TaskStep,
) -> FleetResult<EventId> {
    Ok(sched.schedule_in(delay, step.label(), move |w: &mut Warehouse, s: &mut Scheduler<'_, Warehouse>| {
        Ok(w.run_step(s, agv, step)?)
    })?)
}

impl Warehouse {
    /// Start a task: fetch `shelf`, deliver it to `dest`, bring it home.
    ///
    /// Fails with [`PreconditionError::AgentBusy`] unless the AGV is `Idle`
    /// or `ToHome`, and with [`PreconditionError::ShelfUnavailable`] if the
    /// shelf is carried or already part of another AGV's task.
    pub fn assign_task(
        &mut self,
        sched: &mut Scheduler<'_, Warehouse>,
        agv:   AgvId,
        shelf: ShelfId,
        dest:  NodeId,
    ) -> FleetResult<()> {
        self.begin_task(sched, agv, Task { shelf, dest })
    }

    pub(crate) fn begin_task(
        &mut self,
        sched: &mut Scheduler<'_, Warehouse>,
        id:    AgvId,
        task:  Task,
    ) -> FleetResult<()> {
        let agv = self.agv(id)?;
        if !agv.can_do_next_task() {
            return Err(PreconditionError::AgentBusy {
                agent: agv.name.clone(),
                state: agv.state().as_str(),
            }
            .into());
        }
        if !self.graph.contains(task.dest) {
            return Err(FleetError::UnknownPoint(task.dest));
        }
        let shelf = self.shelf(task.shelf)?;
        let taken = self.agvs.iter().any(|a| a.task.is_some_and(|t| t.shelf == task.shelf));
        let pickup = match shelf.resting_point() {
            Some(node) if !taken => node,
            _ => return Err(PreconditionError::ShelfUnavailable { shelf: shelf.name.clone() }.into()),
        };

        info!(
            agv = %self.agvs[id.index()].name,
            shelf = %shelf.name,
            dest = %self.graph.name(task.dest),
            t = sched.now().0,
            "task assigned"
        );
        self.shelf_mut(task.shelf)?.destination = task.dest;
        self.unassigned.retain(|s| *s != task.shelf);
        self.agv_mut(id)?.task = Some(task);
        self.set_state(id, AgvState::GrabShelf, sched.now())?;
        self.set_destination(sched, id, pickup, TaskStep::GrabArrived)
    }

    fn task_of(&self, id: AgvId) -> FleetResult<Task> {
        self.agv(id)?.task.ok_or(FleetError::NoTask(id))
    }

    /// Perform one task step for `id`.
    pub(crate) fn run_step(
        &mut self,
        sched: &mut Scheduler<'_, Warehouse>,
        id:    AgvId,
        step:  TaskStep,
    ) -> FleetResult<()> {
        let now = sched.now();
        match step {
            TaskStep::GrabArrived => {
                schedule_step(sched, id, self.params.grab_secs, TaskStep::GrabDone)?;
            }
            TaskStep::GrabDone => {
                let task = self.task_of(id)?;
                self.load_shelf(id, task.shelf)?;
                self.set_state(id, AgvState::ToDest, now)?;
                self.set_destination(sched, id, task.dest, TaskStep::DestArrived)?;
            }
            TaskStep::DestArrived => {
                self.set_state(id, AgvState::Waiting, now)?;
                let (drop, dwell) = (self.params.drop_secs, self.params.dwell_secs);
                schedule_step(sched, id, drop, TaskStep::PutShelf)?;
                schedule_step(sched, id, dwell - drop, TaskStep::PickShelf)?;
                schedule_step(sched, id, dwell, TaskStep::WaitDone)?;
            }
            TaskStep::PutShelf => {
                let task = self.task_of(id)?;
                self.unload_shelf(task.shelf, task.dest)?;
            }
            TaskStep::PickShelf => {
                let task = self.task_of(id)?;
                self.load_shelf(id, task.shelf)?;
            }
            TaskStep::WaitDone => {
                let task = self.task_of(id)?;
                self.set_state(id, AgvState::ReturnShelf, now)?;
                let shelf = self.shelf_mut(task.shelf)?;
                shelf.destination = shelf.home;
                let home = shelf.home;
                self.set_destination(sched, id, home, TaskStep::ReturnArrived)?;
            }
            TaskStep::ReturnArrived => {
                schedule_step(sched, id, self.params.return_secs, TaskStep::ReturnDone)?;
            }
            TaskStep::ReturnDone => {
                let task = self.task_of(id)?;
                let (home, entity) = {
                    let shelf = self.shelf(task.shelf)?;
                    (shelf.home, shelf.entity)
                };
                self.unload_shelf(task.shelf, home)?;
                let count = self.attrs.get::<Deliveries>(entity)?.copied().unwrap_or(0);
                self.attrs.set::<Deliveries>(entity, count + 1)?;

                self.set_state(id, AgvState::ToHome, now)?;
                let agv = self.agv_mut(id)?;
                agv.task = None;
                let agv_home = agv.home;
                self.completed.push(Completion { time: now, agv: id, shelf: task.shelf, dest: task.dest });
                self.set_destination(sched, id, agv_home, TaskStep::HomeArrived)?;
                self.unassigned.push(task.shelf);
            }
            TaskStep::HomeArrived => {
                self.set_state(id, AgvState::Idle, now)?;
            }
        }
        Ok(())
    }
}
