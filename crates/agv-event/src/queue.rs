//! `EventQueue` — pending timed and conditional events.
//!
//! # Layout
//!
//! - `timed`: a `VecDeque` kept sorted ascending by due time.  Inserts find
//!   their slot with two binary searches (the tied run `[lo, hi)`); the
//!   ordering mode picks a position inside that run.
//! - `pending`: the conditional working set, in insertion order.
//! - `to_check`: the scan cursor.  It is refilled with a copy of the pending
//!   ids after every dispatch and whenever a pop comes back empty, so every
//!   pending condition is polled once before the next timed event is
//!   released, and a condition made true by a dispatched event is seen on the
//!   very next pop.
//!
//! Events are identified by the `EventId` returned from [`EventQueue::insert`];
//! removal is by id and `try_remove` tolerates ids that already fired.

use std::collections::VecDeque;

use agv_core::{EventId, OrderingMode, PreconditionError, SimConfig, SimRng, SimTime};
use tracing::trace;

use crate::{Event, EventError, EventKind, EventResult};

struct TimedEntry<W> {
    id:    EventId,
    due:   SimTime,
    event: Event<W>,
}

pub struct EventQueue<W> {
    mode:     OrderingMode,
    rng:      SimRng,
    next_id:  u64,
    timed:    VecDeque<TimedEntry<W>>,
    pending:  Vec<(EventId, Event<W>)>,
    to_check: VecDeque<EventId>,
}

impl<W> EventQueue<W> {
    /// `seed` only matters for [`OrderingMode::Random`].
    pub fn new(mode: OrderingMode, seed: u64) -> Self {
        Self {
            mode,
            rng: SimRng::stream(seed, 1),
            next_id: 0,
            timed: VecDeque::new(),
            pending: Vec::new(),
            to_check: VecDeque::new(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.ordering, config.seed)
    }

    pub fn mode(&self) -> OrderingMode {
        self.mode
    }

    // ── Insertion / removal ───────────────────────────────────────────────

    /// Insert `event` and return its id.
    ///
    /// A timed event due before `now` (or at NaN) is rejected with
    /// [`PreconditionError::TimeTravel`] and not stored.
    pub fn insert(&mut self, now: SimTime, event: Event<W>) -> EventResult<EventId> {
        let id = EventId(self.next_id);
        match event.due_time() {
            Some(due) => {
                if due.is_nan() || due < now {
                    return Err(PreconditionError::TimeTravel { due, now }.into());
                }
                let lo = self.timed.partition_point(|e| e.due < due);
                let at = match self.mode {
                    OrderingMode::Fifo   => self.timed.partition_point(|e| e.due <= due),
                    OrderingMode::Lifo   => lo,
                    OrderingMode::Random => {
                        let hi = self.timed.partition_point(|e| e.due <= due);
                        self.rng.gen_range(lo..=hi)
                    }
                };
                trace!(%id, label = event.label(), due = due.0, slot = at, "queued timed event");
                self.timed.insert(at, TimedEntry { id, due, event });
            }
            None => {
                trace!(%id, label = event.label(), "queued conditional event");
                self.pending.push((id, event));
            }
        }
        self.next_id += 1;
        Ok(id)
    }

    /// Remove a pending event by id.
    pub fn remove(&mut self, id: EventId) -> EventResult<Event<W>> {
        if let Some(pos) = self.timed.iter().position(|e| e.id == id) {
            if let Some(entry) = self.timed.remove(pos) {
                return Ok(entry.event);
            }
        }
        if let Some(pos) = self.pending.iter().position(|(eid, _)| *eid == id) {
            return Ok(self.pending.remove(pos).1);
        }
        Err(EventError::NotPending(id))
    }

    /// Remove a pending event if it is still there.  Returns whether it was.
    pub fn try_remove(&mut self, id: EventId) -> bool {
        self.remove(id).is_ok()
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.timed.iter().any(|e| e.id == id) || self.pending.iter().any(|(eid, _)| *eid == id)
    }

    /// Kind of a pending event, or `None` once it has fired or been removed.
    pub fn kind_of(&self, id: EventId) -> Option<EventKind> {
        if self.timed.iter().any(|e| e.id == id) {
            Some(EventKind::Timed)
        } else if self.pending.iter().any(|(eid, _)| *eid == id) {
            Some(EventKind::Conditional)
        } else {
            None
        }
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.timed.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timed.is_empty() && self.pending.is_empty()
    }

    pub fn timed_len(&self) -> usize {
        self.timed.len()
    }

    pub fn conditional_len(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the earliest timed event.
    pub fn next_due(&self) -> Option<SimTime> {
        self.timed.front().map(|e| e.due)
    }

    /// Ids of pending timed events in dispatch order.
    pub fn timed_ids(&self) -> Vec<EventId> {
        self.timed.iter().map(|e| e.id).collect()
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Pop the next event that is ready, considering timed events due no
    /// later than `max_time`.  See the crate docs for the exact rule.
    pub fn pop_next(&mut self, world: &W, max_time: SimTime) -> Option<(EventId, Event<W>)> {
        while let Some(id) = self.to_check.pop_front() {
            let Some(pos) = self.pending.iter().position(|(eid, _)| *eid == id) else {
                continue;
            };
            if self.pending[pos].1.check(world) {
                let popped = self.pending.remove(pos);
                self.reset_cursor();
                trace!(id = %popped.0, label = popped.1.label(), "condition met");
                return Some(popped);
            }
        }

        match self.timed.front() {
            Some(front) if front.due <= max_time => {
                let entry = self.timed.pop_front()?;
                self.reset_cursor();
                Some((entry.id, entry.event))
            }
            _ => {
                self.reset_cursor();
                None
            }
        }
    }

    fn reset_cursor(&mut self) {
        self.to_check.clear();
        self.to_check.extend(self.pending.iter().map(|(id, _)| *id));
    }
}

impl<W> std::fmt::Debug for EventQueue<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("mode", &self.mode)
            .field("timed", &self.timed.len())
            .field("conditional", &self.pending.len())
            .field("next_due", &self.next_due())
            .finish()
    }
}
