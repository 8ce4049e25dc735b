//! The handle an executing action uses to schedule or retract events.

use agv_core::{EventId, SimTime};

use crate::{Event, EventQueue, EventResult};

/// A borrowed view of the queue stamped with the current simulation time.
///
/// Actions never see the clock itself, only `now()`, so they cannot move it.
pub struct Scheduler<'a, W> {
    now:   SimTime,
    queue: &'a mut EventQueue<W>,
}

impl<'a, W> Scheduler<'a, W> {
    pub fn new(now: SimTime, queue: &'a mut EventQueue<W>) -> Self {
        Self { now, queue }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn insert(&mut self, event: Event<W>) -> EventResult<EventId> {
        self.queue.insert(self.now, event)
    }

    /// Schedule `action` at absolute time `due`.
    pub fn schedule_at<F>(&mut self, due: SimTime, label: &'static str, action: F) -> EventResult<EventId>
    where
        F: FnOnce(&mut W, &mut Scheduler<'_, W>) -> EventResult<()> + 'static,
    {
        self.insert(Event::at(due, label, action))
    }

    /// Schedule `action` `delay` seconds from now.
    pub fn schedule_in<F>(&mut self, delay: f64, label: &'static str, action: F) -> EventResult<EventId>
    where
        F: FnOnce(&mut W, &mut Scheduler<'_, W>) -> EventResult<()> + 'static,
    {
        let due = self.now + delay;
        self.insert(Event::at(due, label, action))
    }

    /// Run `action` as soon as `predicate` holds.
    pub fn when<P, F>(&mut self, label: &'static str, predicate: P, action: F) -> EventResult<EventId>
    where
        P: Fn(&W) -> bool + 'static,
        F: FnOnce(&mut W, &mut Scheduler<'_, W>) -> EventResult<()> + 'static,
    {
        self.insert(Event::when(label, predicate, action))
    }

    /// Retract a pending event.  Silently does nothing if it already fired.
    pub fn cancel(&mut self, id: EventId) -> bool {
        self.queue.try_remove(id)
    }

    pub fn is_pending(&self, id: EventId) -> bool {
        self.queue.contains(id)
    }

    pub fn queue(&self) -> &EventQueue<W> {
        self.queue
    }
}
