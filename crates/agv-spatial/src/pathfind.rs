//! Pathfinding over the point graph.
//!
//! # Pluggability
//!
//! Navigation calls search through the [`Pathfinder`] trait so a different
//! search can be swapped in without touching the fleet logic.  The default
//! [`AStar`] is a best-first search with a straight-line heuristic.
//!
//! # Cost accounting
//!
//! The cost of reaching a candidate is recomputed on every relaxation by
//! walking the provisional parent chain back to the start, never cached
//! incrementally.  Ties on `g + h` go to the node that entered the open set
//! first.  A closed node is never reopened.
//!
//! # Scratch state
//!
//! Parent links, costs, and open/closed marks live in per-node scratch
//! arrays owned by the `AStar` value, so repeated searches do not allocate.
//! Every touched entry is reset before `find_path` returns, on success or
//! failure, which makes back-to-back calls independent.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use agv_core::NodeId;
use tracing::trace;

use crate::{NodeSet, SpatialGraph};

// ── Pathfinder trait ──────────────────────────────────────────────────────────

pub trait Pathfinder {
    /// Find a path `start → goal` that avoids every node in `blocked`.
    ///
    /// The returned path includes both endpoints; `start == goal` yields
    /// `[start]`.  `None` means the search was exhausted.
    fn find_path(
        &mut self,
        graph:   &SpatialGraph,
        start:   NodeId,
        goal:    NodeId,
        blocked: &NodeSet,
    ) -> Option<Vec<NodeId>>;
}

// ── Open-set entry ────────────────────────────────────────────────────────────

struct OpenEntry {
    f:    f64,
    seq:  u64,
    node: NodeId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    /// Reversed so `BinaryHeap` pops the smallest `f`, then the earliest `seq`.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

// ── AStar ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
enum Mark {
    #[default]
    Unseen,
    Open,
    Closed,
}

#[derive(Default)]
pub struct AStar {
    parent:  Vec<NodeId>,
    g:       Vec<f64>,
    mark:    Vec<Mark>,
    touched: Vec<NodeId>,
    seq:     u64,
}

impl AStar {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no transient search state survives from a previous call.
    pub fn is_clean(&self) -> bool {
        self.touched.is_empty()
            && self.parent.iter().all(|p| *p == NodeId::INVALID)
            && self.mark.iter().all(|m| *m == Mark::Unseen)
    }

    fn prepare(&mut self, n: usize) {
        if self.parent.len() < n {
            self.parent.resize(n, NodeId::INVALID);
            self.g.resize(n, f64::INFINITY);
            self.mark.resize(n, Mark::Unseen);
        }
    }

    fn touch(&mut self, node: NodeId) {
        if self.mark[node.index()] == Mark::Unseen {
            self.touched.push(node);
        }
    }

    fn reset(&mut self) {
        for node in self.touched.drain(..) {
            let i = node.index();
            self.parent[i] = NodeId::INVALID;
            self.g[i] = f64::INFINITY;
            self.mark[i] = Mark::Unseen;
        }
    }

    /// Sum of edge lengths along the current parent chain from `node` back
    /// to the start.
    fn chain_cost(&self, graph: &SpatialGraph, node: NodeId) -> f64 {
        let mut cost = 0.0;
        let mut cur = node;
        loop {
            let p = self.parent[cur.index()];
            if p == NodeId::INVALID {
                return cost;
            }
            cost += graph.distance(p, cur);
            cur = p;
        }
    }

    fn reconstruct(&self, goal: NodeId) -> Vec<NodeId> {
        let mut path = vec![goal];
        let mut cur = goal;
        loop {
            let p = self.parent[cur.index()];
            if p == NodeId::INVALID {
                break;
            }
            path.push(p);
            cur = p;
        }
        path.reverse();
        path
    }

    fn search(
        &mut self,
        graph:   &SpatialGraph,
        start:   NodeId,
        goal:    NodeId,
        blocked: &NodeSet,
    ) -> Option<Vec<NodeId>> {
        let goal_pos = graph.position(goal);
        let mut open = BinaryHeap::new();

        self.touch(start);
        self.mark[start.index()] = Mark::Open;
        self.g[start.index()] = 0.0;
        open.push(OpenEntry { f: graph.position(start).distance(goal_pos), seq: self.seq, node: start });
        self.seq += 1;

        while let Some(OpenEntry { node, .. }) = open.pop() {
            if self.mark[node.index()] == Mark::Closed {
                // Stale entry left behind by a later improvement.
                continue;
            }
            if node == goal {
                return Some(self.reconstruct(goal));
            }
            self.mark[node.index()] = Mark::Closed;

            let base = self.chain_cost(graph, node);
            for neighbor in graph.neighbors(node) {
                let i = neighbor.index();
                if blocked.contains(&neighbor) || self.mark[i] == Mark::Closed {
                    continue;
                }
                let g = base + graph.distance(node, neighbor);
                if self.mark[i] == Mark::Unseen || g < self.g[i] {
                    self.touch(neighbor);
                    self.mark[i] = Mark::Open;
                    self.g[i] = g;
                    self.parent[i] = node;
                    let f = g + graph.position(neighbor).distance(goal_pos);
                    open.push(OpenEntry { f, seq: self.seq, node: neighbor });
                    self.seq += 1;
                }
            }
        }
        None
    }
}

impl Pathfinder for AStar {
    fn find_path(
        &mut self,
        graph:   &SpatialGraph,
        start:   NodeId,
        goal:    NodeId,
        blocked: &NodeSet,
    ) -> Option<Vec<NodeId>> {
        if !graph.contains(start) || !graph.contains(goal) {
            return None;
        }
        if start == goal {
            return Some(vec![start]);
        }
        self.prepare(graph.node_count());
        let path = self.search(graph, start, goal, blocked);
        self.reset();
        self.seq = 0;
        trace!(%start, %goal, blocked = blocked.len(), found = path.is_some(), "path search");
        path
    }
}
