//! The `Simulator` struct and its run loop.

use agv_core::{EventId, PreconditionError, SimClock, SimConfig, SimTime};
use agv_event::{Event, EventQueue, EventResult, Scheduler};
use tracing::{debug, info};

use crate::{NoopObserver, SimObserver, SimResult};

/// The single scheduling authority of a run.
///
/// Owns the clock, the event queue, and the world `W` that events mutate.
/// Exactly one event executes at a time; there is no parallel dispatch.
pub struct Simulator<W> {
    /// Seed and tie-break policy the queue was built with.
    pub config: SimConfig,

    clock:      SimClock,
    queue:      EventQueue<W>,
    world:      W,
    dispatched: u64,
}

impl<W> Simulator<W> {
    pub fn new(config: SimConfig, world: W) -> Self {
        let queue = EventQueue::from_config(&config);
        Self {
            config,
            clock: SimClock::new(),
            queue,
            world,
            dispatched: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// Current simulation time in seconds.
    #[inline]
    pub fn current_time(&self) -> f64 {
        self.clock.now().secs()
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn into_world(self) -> W {
        self.world
    }

    pub fn queue(&self) -> &EventQueue<W> {
        &self.queue
    }

    /// Events waiting in the queue (timed and conditional).
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Events executed since construction.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    // ── Scheduling from outside the run loop ──────────────────────────────

    pub fn schedule(&mut self, event: Event<W>) -> SimResult<EventId> {
        Ok(self.queue.insert(self.clock.now(), event)?)
    }

    pub fn schedule_at<F>(&mut self, due: SimTime, label: &'static str, action: F) -> SimResult<EventId>
    where
        F: FnOnce(&mut W, &mut Scheduler<'_, W>) -> EventResult<()> + 'static,
    {
        self.schedule(Event::at(due, label, action))
    }

    pub fn cancel(&mut self, id: EventId) -> bool {
        self.queue.try_remove(id)
    }

    /// Run `f` with the world and a scheduler at the current time.  This is
    /// how callers submit work (e.g. tasks) between runs.
    pub fn with_scheduler<R>(&mut self, f: impl FnOnce(&mut W, &mut Scheduler<'_, W>) -> R) -> R {
        let mut sched = Scheduler::new(self.clock.now(), &mut self.queue);
        f(&mut self.world, &mut sched)
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Dispatch the next ready event regardless of its due time.
    ///
    /// Returns `false` when nothing is ready.
    pub fn step(&mut self) -> SimResult<bool> {
        match self.queue.pop_next(&self.world, SimTime::INFINITY) {
            Some((id, event)) => {
                self.dispatch(id, event, &mut NoopObserver)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Dispatch every event ready up to and including `horizon`, then set
    /// the clock to exactly `horizon`.
    pub fn run_until(&mut self, horizon: SimTime) -> SimResult<()> {
        self.run_until_observed(horizon, &mut NoopObserver)
    }

    pub fn run_until_observed<O: SimObserver<W>>(
        &mut self,
        horizon:  SimTime,
        observer: &mut O,
    ) -> SimResult<()> {
        let start = self.clock.now();
        if !horizon.is_finite() || horizon < start {
            return Err(PreconditionError::InvalidHorizon { horizon, now: start }.into());
        }

        let before = self.dispatched;
        while let Some((id, event)) = self.queue.pop_next(&self.world, horizon) {
            self.dispatch(id, event, observer)?;
        }
        self.clock.advance_to(horizon)?;

        let count = self.dispatched - before;
        info!(from = start.0, to = horizon.0, dispatched = count, pending = self.queue.len(), "run complete");
        observer.on_run_end(horizon, count, &self.world);
        Ok(())
    }

    /// `run_until(now + delta)`.
    pub fn advance(&mut self, delta: f64) -> SimResult<()> {
        self.run_until(self.clock.now() + delta)
    }

    pub fn advance_observed<O: SimObserver<W>>(&mut self, delta: f64, observer: &mut O) -> SimResult<()> {
        self.run_until_observed(self.clock.now() + delta, observer)
    }

    fn dispatch<O: SimObserver<W>>(&mut self, id: EventId, event: Event<W>, observer: &mut O) -> SimResult<()> {
        if let Some(due) = event.due_time() {
            self.clock.advance_to(due)?;
        }
        let now = self.clock.now();
        let label = event.label();
        debug!(%id, label, t = now.0, "dispatch");

        let mut sched = Scheduler::new(now, &mut self.queue);
        event.execute(&mut self.world, &mut sched)?;
        self.dispatched += 1;

        observer.on_dispatch(now, label, &self.world);
        Ok(())
    }
}
