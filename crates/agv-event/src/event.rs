//! The two event kinds and their uniform execution contract.
//!
//! An event is a trigger plus a one-shot action.  Once dispatched it is
//! consumed; a recurring behavior re-inserts a fresh event from inside its
//! own action.

use agv_core::SimTime;

use crate::{EventResult, Scheduler};

/// One-shot action run when the event fires.
pub type Action<W> = Box<dyn FnOnce(&mut W, &mut Scheduler<'_, W>) -> EventResult<()>>;

/// Predicate polled by the queue for conditional events.  Never cached.
pub type Predicate<W> = Box<dyn Fn(&W) -> bool>;

pub enum Trigger<W> {
    /// Fire at a fixed simulation time.
    At(SimTime),
    /// Fire as soon as the predicate holds.
    When(Predicate<W>),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EventKind {
    Timed,
    Conditional,
}

pub struct Event<W> {
    trigger: Trigger<W>,
    action:  Action<W>,
    label:   &'static str,
}

impl<W> Event<W> {
    /// A timed event due at `due`.
    pub fn at<F>(due: SimTime, label: &'static str, action: F) -> Self
    where
        F: FnOnce(&mut W, &mut Scheduler<'_, W>) -> EventResult<()> + 'static,
    {
        Self { trigger: Trigger::At(due), action: Box::new(action), label }
    }

    /// A conditional event that fires once `predicate` holds.
    pub fn when<P, F>(label: &'static str, predicate: P, action: F) -> Self
    where
        P: Fn(&W) -> bool + 'static,
        F: FnOnce(&mut W, &mut Scheduler<'_, W>) -> EventResult<()> + 'static,
    {
        Self {
            trigger: Trigger::When(Box::new(predicate)),
            action:  Box::new(action),
            label,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.trigger {
            Trigger::At(_)   => EventKind::Timed,
            Trigger::When(_) => EventKind::Conditional,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// `None` for conditional events.
    pub fn due_time(&self) -> Option<SimTime> {
        match self.trigger {
            Trigger::At(t)   => Some(t),
            Trigger::When(_) => None,
        }
    }

    /// Move a timed event before it is inserted.  Returns `false` (and does
    /// nothing) for conditional events.
    pub fn set_due_time(&mut self, due: SimTime) -> bool {
        match &mut self.trigger {
            Trigger::At(t) => {
                *t = due;
                true
            }
            Trigger::When(_) => false,
        }
    }

    /// Evaluate the trigger against `world`.  Timed events are always ready
    /// as far as their predicate is concerned; their readiness is decided by
    /// the due time.
    pub fn check(&self, world: &W) -> bool {
        match &self.trigger {
            Trigger::At(_)      => true,
            Trigger::When(pred) => pred(world),
        }
    }

    /// Consume the event and run its action.
    pub fn execute(self, world: &mut W, sched: &mut Scheduler<'_, W>) -> EventResult<()> {
        (self.action)(world, sched)
    }
}

impl<W> std::fmt::Debug for Event<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("label", &self.label)
            .field("kind", &self.kind())
            .field("due", &self.due_time())
            .finish()
    }
}
