//! Per-AGV state.

use std::fmt;

use agv_core::{EntityId, EventId, NodeId, ShelfId, SimTime};
use agv_scene::Tracked;
use serde::{Deserialize, Serialize};

use crate::TaskStep;

// ── AgvState ──────────────────────────────────────────────────────────────────

/// Behaviour state of an AGV.
///
/// ```text
/// Idle → GrabShelf → ToDest → Waiting → ReturnShelf → ToHome → Idle
/// ```
///
/// A new task may start from `Idle` or `ToHome`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgvState {
    #[default]
    Idle,
    GrabShelf,
    ToDest,
    Waiting,
    ReturnShelf,
    ToHome,
}

impl AgvState {
    pub fn as_str(self) -> &'static str {
        match self {
            AgvState::Idle        => "idle",
            AgvState::GrabShelf   => "grab_shelf",
            AgvState::ToDest      => "to_dest",
            AgvState::Waiting     => "waiting",
            AgvState::ReturnShelf => "return_shelf",
            AgvState::ToHome      => "to_home",
        }
    }

    #[inline]
    pub fn accepts_task(self) -> bool {
        matches!(self, AgvState::Idle | AgvState::ToHome)
    }
}

impl fmt::Display for AgvState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// A fetch / deliver / return job.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub shelf: ShelfId,
    pub dest:  NodeId,
}

// ── Motion ────────────────────────────────────────────────────────────────────

/// An in-flight move or in-place rotation.
///
/// The AGV logically stays at `from` until the motion event fires at `end`;
/// the pose in between is interpolated for export only.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Motion {
    pub event:        EventId,
    pub from:         NodeId,
    pub to:           NodeId,
    pub from_heading: f64,
    /// Not normalised: a rotation may target `h ± 2π` to take the short way.
    pub to_heading:   f64,
    pub start:        SimTime,
    pub end:          SimTime,
}

impl Motion {
    #[inline]
    pub fn is_rotation(&self) -> bool {
        self.from == self.to
    }

    /// Fraction completed at `now`, in `[0, 1]`.
    pub fn progress(&self, now: SimTime) -> f64 {
        let total = self.end.since(self.start);
        if total <= 0.0 {
            return 0.0;
        }
        (now.since(self.start) / total).clamp(0.0, 1.0)
    }
}

// ── Agv ───────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Agv {
    pub name:   String,
    pub entity: EntityId,
    pub home:   NodeId,

    pub(crate) node:          NodeId,
    pub(crate) heading:       f64,
    pub(crate) state:         Tracked<AgvState>,
    pub(crate) destination:   NodeId,
    pub(crate) plan:          Option<Vec<NodeId>>,
    pub(crate) motion:        Option<Motion>,
    pub(crate) wait_event:    Option<EventId>,
    pub(crate) timeout_event: Option<EventId>,
    pub(crate) on_arrival:    Option<TaskStep>,
    pub(crate) held:          Vec<NodeId>,
    pub(crate) task:          Option<Task>,
    pub(crate) cargo:         Option<ShelfId>,
}

impl Agv {
    pub(crate) fn new(name: String, entity: EntityId, home: NodeId) -> Self {
        Self {
            name,
            entity,
            home,
            node: home,
            heading: 0.0,
            state: Tracked::new(AgvState::Idle),
            destination: home,
            plan: None,
            motion: None,
            wait_event: None,
            timeout_event: None,
            on_arrival: None,
            held: vec![home],
            task: None,
            cargo: None,
        }
    }

    /// Node the AGV is at, or departed from if a motion is in flight.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Committed heading in `[0, 2π)`.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn state(&self) -> AgvState {
        *self.state
    }

    pub fn state_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Remaining plan.  Its first node is the current node, or the motion
    /// target while a move is in flight.
    pub fn plan(&self) -> Option<&[NodeId]> {
        self.plan.as_deref()
    }

    pub fn motion(&self) -> Option<&Motion> {
        self.motion.as_ref()
    }

    /// Nodes this AGV holds, current node first.
    pub fn held(&self) -> &[NodeId] {
        &self.held
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn cargo(&self) -> Option<ShelfId> {
        self.cargo
    }

    /// `true` while a wait-for-node condition or its timeout is pending.
    pub fn is_blocked(&self) -> bool {
        self.wait_event.is_some() || self.timeout_event.is_some()
    }

    pub fn can_do_next_task(&self) -> bool {
        self.state.accepts_task()
    }
}
