//! Point graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All edge arrays are sorted by source node and indexed by edge position.
//! The sort is stable, so a node's neighbors keep the order in which their
//! paths were added; search results depend on that order for tie-breaking.
//!
//! Edge length is the Euclidean distance between the endpoints.  The same
//! metric is the search heuristic, so it never overestimates.

use std::collections::{HashMap, HashSet};

use agv_core::{NodeId, Vec3};

use crate::{SpatialError, SpatialResult};

/// A set of nodes to treat as impassable for one search.
pub type NodeSet = HashSet<NodeId>;

// ── SpatialGraph ──────────────────────────────────────────────────────────────

/// Directed point graph in CSR format.
///
/// Do not construct directly; use [`SpatialGraphBuilder`].
#[derive(Debug)]
pub struct SpatialGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    pub point_name: Vec<String>,
    pub point_pos:  Vec<Vec3>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by sorted position) ────────────────────────────
    pub edge_from:   Vec<NodeId>,
    pub edge_to:     Vec<NodeId>,
    pub edge_length: Vec<f64>,
    pub edge_name:   Vec<String>,

    by_name: HashMap<String, NodeId>,
}

impl SpatialGraph {
    pub fn empty() -> Self {
        SpatialGraphBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.point_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.point_pos.len()
    }

    // ── Node data ─────────────────────────────────────────────────────────

    /// Position of `node`.  Callers pass ids obtained from this graph.
    #[inline]
    pub fn position(&self, node: NodeId) -> Vec3 {
        self.point_pos[node.index()]
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.point_name[node.index()]
    }

    pub fn point_by_name(&self, name: &str) -> SpatialResult<NodeId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SpatialError::UnknownPoint(name.to_owned()))
    }

    /// Straight-line distance between two nodes.
    #[inline]
    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        self.position(a).distance(self.position(b))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Edge indices of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = usize> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        start..end
    }

    /// Outgoing neighbors of `node` in insertion order.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(node).map(|e| self.edge_to[e])
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// `true` if there is a directed edge `from → to`.
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.neighbors(from).any(|n| n == to)
    }
}

// ── SpatialGraphBuilder ───────────────────────────────────────────────────────

/// Construct a [`SpatialGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use agv_core::Vec3;
/// use agv_spatial::SpatialGraphBuilder;
///
/// let mut b = SpatialGraphBuilder::new();
/// let a = b.add_point("a", Vec3::new(0.0, 0.0, 0.0)).unwrap();
/// let c = b.add_point("c", Vec3::new(3.0, 0.0, 4.0)).unwrap();
/// b.add_link("a-c", a, c).unwrap();
/// let graph = b.build();
/// assert_eq!(graph.edge_count(), 2);
/// assert_eq!(graph.distance(a, c), 5.0);
/// ```
#[derive(Default)]
pub struct SpatialGraphBuilder {
    names:     Vec<String>,
    positions: Vec<Vec3>,
    raw_edges: Vec<RawEdge>,
    by_name:   HashMap<String, NodeId>,
}

struct RawEdge {
    from: NodeId,
    to:   NodeId,
    name: String,
}

impl SpatialGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(points: usize, paths: usize) -> Self {
        Self {
            names:     Vec::with_capacity(points),
            positions: Vec::with_capacity(points),
            raw_edges: Vec::with_capacity(paths),
            by_name:   HashMap::with_capacity(points),
        }
    }

    /// Add a named point and return its `NodeId` (sequential from 0).
    pub fn add_point(&mut self, name: impl Into<String>, pos: Vec3) -> SpatialResult<NodeId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SpatialError::DuplicatePoint(name));
        }
        let id = NodeId(self.positions.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.names.push(name);
        self.positions.push(pos);
        Ok(id)
    }

    /// Add a **directed** path from `from` to `to`.
    pub fn add_path(&mut self, name: impl Into<String>, from: NodeId, to: NodeId) -> SpatialResult<()> {
        for n in [from, to] {
            if n.index() >= self.positions.len() {
                return Err(SpatialError::NodeNotFound(n));
            }
        }
        self.raw_edges.push(RawEdge { from, to, name: name.into() });
        Ok(())
    }

    /// Convenience: add paths in **both directions**.
    pub fn add_link(&mut self, name: impl Into<String>, a: NodeId, b: NodeId) -> SpatialResult<()> {
        let name = name.into();
        self.add_path(name.clone(), a, b)?;
        self.add_path(name, b, a)
    }

    pub fn point_count(&self) -> usize { self.positions.len() }
    pub fn path_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`SpatialGraph`].
    pub fn build(self) -> SpatialGraph {
        let node_count = self.positions.len();

        // Stable: keeps each node's neighbors in insertion order.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:   Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:     Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length: Vec<f64>    = raw
            .iter()
            .map(|e| self.positions[e.from.index()].distance(self.positions[e.to.index()]))
            .collect();
        let edge_name:   Vec<String> = raw.into_iter().map(|e| e.name).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for from in &edge_from {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_to.len());

        SpatialGraph {
            point_name: self.names,
            point_pos: self.positions,
            node_out_start,
            edge_from,
            edge_to,
            edge_length,
            edge_name,
            by_name: self.by_name,
        }
    }
}
