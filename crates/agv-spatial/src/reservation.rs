//! Node reservations: at most one AGV holds any node at a time.

use agv_core::{AgvId, NodeId};
use tracing::trace;

/// Per-node lock table, indexed directly by `NodeId`.
#[derive(Clone, Debug, Default)]
pub struct ReservationTable {
    holder: Vec<Option<AgvId>>,
}

impl ReservationTable {
    pub fn new(node_count: usize) -> Self {
        Self { holder: vec![None; node_count] }
    }

    #[inline]
    pub fn holder(&self, node: NodeId) -> Option<AgvId> {
        self.holder.get(node.index()).copied().flatten()
    }

    #[inline]
    pub fn is_free(&self, node: NodeId) -> bool {
        self.holder(node).is_none()
    }

    /// Reserve `node` for `agv`.
    ///
    /// Succeeds when the node is free or already held by `agv`; fails
    /// without side effects when another AGV holds it or the node is out of
    /// range.
    pub fn try_reserve(&mut self, node: NodeId, agv: AgvId) -> bool {
        let Some(slot) = self.holder.get_mut(node.index()) else {
            return false;
        };
        match *slot {
            None => {
                *slot = Some(agv);
                trace!(%node, %agv, "reserved");
                true
            }
            Some(h) => h == agv,
        }
    }

    /// Unconditionally assign `node` to `agv`.  Returns the previous holder
    /// if it was someone else.
    pub fn claim(&mut self, node: NodeId, agv: AgvId) -> Option<AgvId> {
        let slot = self.holder.get_mut(node.index())?;
        let prev = slot.replace(agv);
        prev.filter(|p| *p != agv)
    }

    /// Release `node` if `agv` holds it.
    pub fn release(&mut self, node: NodeId, agv: AgvId) -> bool {
        match self.holder.get_mut(node.index()) {
            Some(slot) if *slot == Some(agv) => {
                *slot = None;
                trace!(%node, %agv, "released");
                true
            }
            _ => false,
        }
    }

    /// Every held node with its holder, ascending by node.
    pub fn locked_nodes(&self) -> impl Iterator<Item = (NodeId, AgvId)> + '_ {
        self.holder
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.map(|a| (NodeId(i as u32), a)))
    }

    /// Nodes held by `agv`, ascending.
    pub fn held_by(&self, agv: AgvId) -> Vec<NodeId> {
        self.locked_nodes()
            .filter(|(_, a)| *a == agv)
            .map(|(n, _)| n)
            .collect()
    }

    pub fn locked_count(&self) -> usize {
        self.holder.iter().filter(|h| h.is_some()).count()
    }
}
