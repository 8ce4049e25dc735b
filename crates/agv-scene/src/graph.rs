//! The owned scene graph.
//!
//! Every simulation object that has a place in the world (the network, its
//! points, AGVs, shelves) is a [`SceneNode`] in one [`SceneGraph`].  A node
//! carries one of three closed frame kinds:
//!
//! | Kind         | Local transform          | Writable through            |
//! |--------------|--------------------------|-----------------------------|
//! | `Plain`      | identity                 | nothing                     |
//! | `Spatial`    | explicit rigid transform | `set_local_transform`, `set_position` |
//! | `Positional` | translation only         | `set_position`              |
//!
//! The global transform of a node is the fold of local transforms from the
//! node up to its root, with the root's transform outermost.

use agv_core::{EntityId, PreconditionError, Transform3, Vec3};
use tracing::trace;

use crate::{AttributeStore, Registry, SceneError, SceneResult, Tracked};

// ── LocalFrame ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocalFrame {
    Plain,
    Spatial(Transform3),
    Positional(Vec3),
}

impl LocalFrame {
    pub fn kind(&self) -> &'static str {
        match self {
            LocalFrame::Plain         => "plain",
            LocalFrame::Spatial(_)    => "spatial",
            LocalFrame::Positional(_) => "positional",
        }
    }

    pub fn transform(&self) -> Transform3 {
        match *self {
            LocalFrame::Plain           => Transform3::IDENTITY,
            LocalFrame::Spatial(t)      => t,
            LocalFrame::Positional(pos) => Transform3::translation(pos),
        }
    }
}

// ── SceneNode ─────────────────────────────────────────────────────────────────

pub struct SceneNode {
    name:     Tracked<String>,
    frame:    Tracked<LocalFrame>,
    parent:   Option<EntityId>,
    children: Vec<EntityId>,
}

impl SceneNode {
    fn new(name: impl Into<String>, frame: LocalFrame) -> Self {
        Self {
            name:     Tracked::new(name.into()),
            frame:    Tracked::new(frame),
            parent:   None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.get()
    }

    pub fn frame(&self) -> LocalFrame {
        *self.frame.get()
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub fn is_dirty(&self) -> bool {
        self.name.is_dirty() || self.frame.is_dirty()
    }
}

// ── SceneGraph ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct SceneGraph {
    nodes: Registry<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.nodes.contains(id)
    }

    pub fn node(&self, id: EntityId) -> SceneResult<&SceneNode> {
        self.nodes.get(id).ok_or(SceneError::UnknownEntity(id))
    }

    fn node_mut(&mut self, id: EntityId) -> SceneResult<&mut SceneNode> {
        self.nodes.get_mut(id).ok_or(SceneError::UnknownEntity(id))
    }

    // ── Creation / destruction ────────────────────────────────────────────

    /// Create a root node.
    pub fn spawn(&mut self, name: impl Into<String>, frame: LocalFrame) -> EntityId {
        self.nodes.insert(SceneNode::new(name, frame))
    }

    /// Create a node directly under `parent`.
    pub fn spawn_child(
        &mut self,
        parent: EntityId,
        name:   impl Into<String>,
        frame:  LocalFrame,
    ) -> SceneResult<EntityId> {
        self.node(parent)?;
        let id = self.spawn(name, frame);
        self.link(parent, id)?;
        Ok(id)
    }

    /// Destroy `id` and its whole subtree.  Returns every removed id; each of
    /// them stops resolving immediately.
    pub fn despawn(&mut self, id: EntityId) -> SceneResult<Vec<EntityId>> {
        self.detach(id)?;
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(e) = stack.pop() {
            if let Some(node) = self.nodes.remove(e) {
                stack.extend(node.children);
                removed.push(e);
            }
        }
        trace!(root = %id, count = removed.len(), "despawned subtree");
        Ok(removed)
    }

    /// [`despawn`](Self::despawn), then drop the instance attributes every
    /// removed entity held in `attrs`.
    pub fn despawn_with(&mut self, id: EntityId, attrs: &mut AttributeStore) -> SceneResult<Vec<EntityId>> {
        let removed = self.despawn(id)?;
        for e in &removed {
            attrs.forget(*e);
        }
        Ok(removed)
    }

    // ── Hierarchy ─────────────────────────────────────────────────────────

    pub fn parent(&self, id: EntityId) -> SceneResult<Option<EntityId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: EntityId) -> SceneResult<&[EntityId]> {
        Ok(&self.node(id)?.children)
    }

    /// First direct child of `parent` called `name`.
    pub fn find_child(&self, parent: EntityId, name: &str) -> SceneResult<Option<EntityId>> {
        let node = self.node(parent)?;
        Ok(node
            .children
            .iter()
            .copied()
            .find(|c| self.nodes.get(*c).is_some_and(|n| n.name() == name)))
    }

    /// `true` if `ancestor` is `id` or lies on the chain from `id` to its root.
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut cur = Some(id);
        while let Some(e) = cur {
            if e == ancestor {
                return true;
            }
            cur = self.nodes.get(e).and_then(|n| n.parent);
        }
        false
    }

    /// Append `child` to `parent`'s children.  `child` must currently be a root.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> SceneResult<()> {
        self.node(parent)?;
        if let Some(old) = self.node(child)?.parent {
            return Err(PreconditionError::AlreadyParented { child, parent: old }.into());
        }
        self.link(parent, child)
    }

    /// Detach `child` from `parent`.  `child` becomes a root.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> SceneResult<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(PreconditionError::NotAChild { parent, child }.into());
        }
        self.unlink(parent, child)
    }

    /// Move `child` under `parent` (or make it a root with `None`), detaching
    /// it from its old parent first.  A move that would create a cycle is
    /// rejected before anything changes.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> SceneResult<()> {
        let old = self.node(child)?.parent;
        if old == parent {
            return Ok(());
        }
        if let Some(p) = parent {
            self.node(p)?;
            if self.is_ancestor(child, p) {
                return Err(PreconditionError::WouldCycle { parent: p, child }.into());
            }
        }
        if let Some(old) = old {
            self.unlink(old, child)?;
        }
        match parent {
            Some(p) => self.link(p, child),
            None    => Ok(()),
        }
    }

    /// Make `child` a root.  No-op if it already is.
    pub fn detach(&mut self, child: EntityId) -> SceneResult<()> {
        self.set_parent(child, None)
    }

    /// Detach every child of `parent`, returning them in their former order.
    pub fn clear_children(&mut self, parent: EntityId) -> SceneResult<Vec<EntityId>> {
        let children = std::mem::take(&mut self.node_mut(parent)?.children);
        for &c in &children {
            if let Some(node) = self.nodes.get_mut(c) {
                node.parent = None;
                node.frame.touch();
            }
        }
        Ok(children)
    }

    fn link(&mut self, parent: EntityId, child: EntityId) -> SceneResult<()> {
        if self.is_ancestor(child, parent) {
            return Err(PreconditionError::WouldCycle { parent, child }.into());
        }
        self.node_mut(parent)?.children.push(child);
        let node = self.node_mut(child)?;
        node.parent = Some(parent);
        // The global transform changed even though the local one did not.
        node.frame.touch();
        Ok(())
    }

    fn unlink(&mut self, parent: EntityId, child: EntityId) -> SceneResult<()> {
        self.node_mut(parent)?.children.retain(|c| *c != child);
        let node = self.node_mut(child)?;
        node.parent = None;
        node.frame.touch();
        Ok(())
    }

    // ── Names ─────────────────────────────────────────────────────────────

    pub fn name(&self, id: EntityId) -> SceneResult<&str> {
        Ok(self.node(id)?.name())
    }

    pub fn rename(&mut self, id: EntityId, name: impl Into<String>) -> SceneResult<()> {
        self.node_mut(id)?.name.set(name.into());
        Ok(())
    }

    // ── Transforms ────────────────────────────────────────────────────────

    pub fn local_transform(&self, id: EntityId) -> SceneResult<Transform3> {
        Ok(self.node(id)?.frame.transform())
    }

    /// Replace the transform of a `Spatial` node.
    pub fn set_local_transform(&mut self, id: EntityId, transform: Transform3) -> SceneResult<()> {
        let node = self.node_mut(id)?;
        match *node.frame.get() {
            LocalFrame::Spatial(_) => {
                node.frame.set(LocalFrame::Spatial(transform));
                Ok(())
            }
            other => Err(PreconditionError::FixedTransform { entity: id, kind: other.kind() }.into()),
        }
    }

    /// Local translation (zero for `Plain` nodes).
    pub fn position(&self, id: EntityId) -> SceneResult<Vec3> {
        Ok(self.node(id)?.frame.transform().origin)
    }

    /// Move a `Spatial` or `Positional` node, keeping any rotation.
    pub fn set_position(&mut self, id: EntityId, pos: Vec3) -> SceneResult<()> {
        let node = self.node_mut(id)?;
        let next = match *node.frame.get() {
            LocalFrame::Spatial(t)     => LocalFrame::Spatial(Transform3 { origin: pos, ..t }),
            LocalFrame::Positional(_)  => LocalFrame::Positional(pos),
            LocalFrame::Plain          => {
                return Err(PreconditionError::FixedTransform { entity: id, kind: "plain" }.into());
            }
        };
        node.frame.set(next);
        Ok(())
    }

    /// Compose local transforms from `id` up to its root.
    pub fn global_transform(&self, id: EntityId) -> SceneResult<Transform3> {
        let mut node = self.node(id)?;
        let mut t = node.frame.transform();
        while let Some(p) = node.parent {
            node = self.node(p)?;
            t = t.then(&node.frame.transform());
        }
        Ok(t)
    }

    // ── Change tracking ───────────────────────────────────────────────────

    /// Nodes whose name or frame changed since the last [`clear_dirty`](Self::clear_dirty),
    /// in creation order.
    pub fn dirty_nodes(&self) -> Vec<EntityId> {
        let mut out: Vec<EntityId> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.is_dirty())
            .map(|(id, _)| id)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn clear_dirty(&mut self) {
        for (_, node) in self.nodes.iter_mut() {
            node.name.clear_dirty();
            node.frame.clear_dirty();
        }
    }
}
