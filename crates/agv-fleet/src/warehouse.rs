//! The simulated world: network, fleet, shelves, and their scene graph.
//!
//! # Scene layout
//!
//! ```text
//! Root
//! ├── Network
//! │   ├── <point>        positional
//! │   │   └── <shelf>    plain, while resting on the point
//! │   └── <path>         plain
//! └── AGVs
//!     └── <agv>          spatial
//!         └── <shelf>    plain, while carried
//! ```
//!
//! A shelf has an identity local frame, so its global transform is that of
//! whatever it sits on.

use agv_core::{AgvId, EntityId, NodeId, ShelfId, SimRng, SimTime, Transform3, Vec3, normalize_heading};
use agv_scene::{AttributeStore, LocalFrame, SceneGraph};
use agv_spatial::{AStar, ReservationTable, SpatialGraph, SpatialGraphBuilder};
use serde::Serialize;
use tracing::{info, warn};

use crate::params::{TravelSpeed, TurnRate, check_rate};
use crate::{Agv, AgvState, FleetError, FleetParams, FleetResult, Shelf, ShelfLocation};

/// One behaviour-state change.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Transition {
    pub time: SimTime,
    pub agv:  AgvId,
    pub from: AgvState,
    pub to:   AgvState,
}

/// A finished fetch / deliver / return job.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Completion {
    pub time:  SimTime,
    pub agv:   AgvId,
    pub shelf: ShelfId,
    pub dest:  NodeId,
}

// ── Warehouse ─────────────────────────────────────────────────────────────────

pub struct Warehouse {
    pub(crate) params: FleetParams,

    pub(crate) scene:        SceneGraph,
    pub(crate) agv_group:    EntityId,
    pub(crate) point_entity: Vec<EntityId>,

    pub(crate) graph:        SpatialGraph,
    pub(crate) reservations: ReservationTable,
    pub(crate) pathfinder:   AStar,

    pub(crate) agvs:        Vec<Agv>,
    pub(crate) shelves:     Vec<Shelf>,
    pub(crate) dest_points: Vec<NodeId>,

    pub(crate) attrs:       AttributeStore,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) completed:   Vec<Completion>,
    pub(crate) unassigned:  Vec<ShelfId>,
    pub(crate) rng:         SimRng,
}

impl Warehouse {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn params(&self) -> &FleetParams {
        &self.params
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn graph(&self) -> &SpatialGraph {
        &self.graph
    }

    pub fn reservations(&self) -> &ReservationTable {
        &self.reservations
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attrs
    }

    pub fn agvs(&self) -> &[Agv] {
        &self.agvs
    }

    pub fn agv_ids(&self) -> impl Iterator<Item = AgvId> + use<> {
        (0..self.agvs.len() as u32).map(AgvId)
    }

    pub fn agv(&self, id: AgvId) -> FleetResult<&Agv> {
        self.agvs.get(id.index()).ok_or(FleetError::UnknownAgv(id))
    }

    pub(crate) fn agv_mut(&mut self, id: AgvId) -> FleetResult<&mut Agv> {
        self.agvs.get_mut(id.index()).ok_or(FleetError::UnknownAgv(id))
    }

    pub fn agv_by_name(&self, name: &str) -> Option<AgvId> {
        self.agvs.iter().position(|a| a.name == name).map(|i| AgvId(i as u32))
    }

    pub fn shelves(&self) -> &[Shelf] {
        &self.shelves
    }

    pub fn shelf(&self, id: ShelfId) -> FleetResult<&Shelf> {
        self.shelves.get(id.index()).ok_or(FleetError::UnknownShelf(id))
    }

    pub(crate) fn shelf_mut(&mut self, id: ShelfId) -> FleetResult<&mut Shelf> {
        self.shelves.get_mut(id.index()).ok_or(FleetError::UnknownShelf(id))
    }

    pub fn shelf_by_name(&self, name: &str) -> Option<ShelfId> {
        self.shelves.iter().position(|s| s.name == name).map(|i| ShelfId(i as u32))
    }

    pub fn dest_points(&self) -> &[NodeId] {
        &self.dest_points
    }

    /// Every state change so far, in dispatch order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn completed(&self) -> &[Completion] {
        &self.completed
    }

    /// Shelves the dispatcher may still hand out.
    pub fn unassigned(&self) -> &[ShelfId] {
        &self.unassigned
    }

    pub fn point_entity(&self, node: NodeId) -> FleetResult<EntityId> {
        self.point_entity.get(node.index()).copied().ok_or(FleetError::UnknownPoint(node))
    }

    // ── Class attributes ──────────────────────────────────────────────────

    pub fn travel_speed(&self) -> FleetResult<f64> {
        Ok(self.attrs.class::<TravelSpeed>()?.copied().unwrap_or(self.params.travel_speed))
    }

    pub fn set_travel_speed(&mut self, speed: f64) -> FleetResult<()> {
        check_rate("travel_speed", speed)?;
        Ok(self.attrs.set_class::<TravelSpeed>(speed)?)
    }

    pub fn turn_rate(&self) -> FleetResult<f64> {
        Ok(self.attrs.class::<TurnRate>()?.copied().unwrap_or(self.params.turn_rate))
    }

    pub fn set_turn_rate(&mut self, rate: f64) -> FleetResult<()> {
        check_rate("turn_rate", rate)?;
        Ok(self.attrs.set_class::<TurnRate>(rate)?)
    }

    // ── Poses ─────────────────────────────────────────────────────────────

    /// Position of `agv` at `now`, interpolated along an in-flight move.
    pub fn agv_position(&self, id: AgvId, now: SimTime) -> FleetResult<Vec3> {
        let agv = self.agv(id)?;
        Ok(match agv.motion {
            Some(m) => {
                let from = self.graph.position(m.from);
                from.lerp(self.graph.position(m.to), m.progress(now))
            }
            None => self.graph.position(agv.node),
        })
    }

    /// Global transform of `agv` at `now`, heading interpolated along an
    /// in-flight rotation.
    pub fn agv_transform(&self, id: AgvId, now: SimTime) -> FleetResult<Transform3> {
        let agv = self.agv(id)?;
        let heading = match agv.motion {
            Some(m) => {
                let h = m.from_heading + (m.to_heading - m.from_heading) * m.progress(now);
                normalize_heading(h)
            }
            None => agv.heading,
        };
        let local = Transform3::from_heading(heading, self.agv_position(id, now)?);
        Ok(local.then(&self.scene.global_transform(self.agv_group)?))
    }

    /// Global transform of a shelf at `now`; follows its carrier.
    pub fn shelf_transform(&self, id: ShelfId, now: SimTime) -> FleetResult<Transform3> {
        let shelf = self.shelf(id)?;
        match shelf.location {
            ShelfLocation::Carried(agv) => {
                let local = self.scene.local_transform(shelf.entity)?;
                Ok(local.then(&self.agv_transform(agv, now)?))
            }
            ShelfLocation::Point(_) => Ok(self.scene.global_transform(shelf.entity)?),
        }
    }

    // ── Internal mutation ─────────────────────────────────────────────────

    pub(crate) fn set_state(&mut self, id: AgvId, to: AgvState, now: SimTime) -> FleetResult<()> {
        let agv = self.agv_mut(id)?;
        let from = *agv.state;
        agv.state.set(to);
        info!(agv = %agv.name, %from, %to, t = now.0, "state change");
        self.transitions.push(Transition { time: now, agv: id, from, to });
        Ok(())
    }

    /// Put `shelf` onto `agv`.
    pub(crate) fn load_shelf(&mut self, id: AgvId, shelf: ShelfId) -> FleetResult<()> {
        let carrier = self.agv(id)?.entity;
        let entity = self.shelf(shelf)?.entity;
        self.scene.set_parent(entity, Some(carrier))?;
        self.shelf_mut(shelf)?.location = ShelfLocation::Carried(id);
        self.agv_mut(id)?.cargo = Some(shelf);
        Ok(())
    }

    /// Set `shelf` down on `node`, releasing it from whoever carried it.
    pub(crate) fn unload_shelf(&mut self, shelf: ShelfId, node: NodeId) -> FleetResult<()> {
        let point = self.point_entity(node)?;
        let s = self.shelf_mut(shelf)?;
        let entity = s.entity;
        let previous = std::mem::replace(&mut s.location, ShelfLocation::Point(node));
        if let ShelfLocation::Carried(agv) = previous {
            self.agv_mut(agv)?.cargo = None;
        }
        self.scene.set_parent(entity, Some(point))?;
        Ok(())
    }

    /// Commit the AGV's scene transform to its current node and heading.
    pub(crate) fn sync_agv_frame(&mut self, id: AgvId) -> FleetResult<()> {
        let agv = self.agv(id)?;
        let t = Transform3::from_heading(agv.heading, self.graph.position(agv.node));
        let entity = agv.entity;
        self.scene.set_local_transform(entity, t)?;
        Ok(())
    }

    /// Clear every change-tracking flag (scene, attributes, AGV states).
    pub fn clear_dirty(&mut self) {
        self.scene.clear_dirty();
        self.attrs.clear_dirty();
        for agv in &mut self.agvs {
            agv.state.clear_dirty();
        }
    }
}

impl std::fmt::Debug for Warehouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warehouse")
            .field("points", &self.graph.node_count())
            .field("agvs", &self.agvs.len())
            .field("shelves", &self.shelves.len())
            .field("locked", &self.reservations.locked_count())
            .finish()
    }
}

// ── WarehouseBuilder ──────────────────────────────────────────────────────────

/// Assemble a [`Warehouse`] point by point.
///
/// [`Scenario::build`](crate::Scenario::build) drives this from JSON; tests
/// use it directly.
pub struct WarehouseBuilder {
    params:  FleetParams,
    seed:    u64,
    network: SpatialGraphBuilder,
    dests:   Vec<NodeId>,
    agvs:    Vec<(String, NodeId)>,
    shelves: Vec<(String, NodeId)>,
}

impl WarehouseBuilder {
    /// `seed` drives the dispatcher's shelf and destination picks.
    pub fn new(params: FleetParams, seed: u64) -> Self {
        Self {
            params,
            seed,
            network: SpatialGraphBuilder::new(),
            dests:   Vec::new(),
            agvs:    Vec::new(),
            shelves: Vec::new(),
        }
    }

    pub fn add_point(&mut self, name: impl Into<String>, pos: Vec3) -> FleetResult<NodeId> {
        Ok(self.network.add_point(name, pos)?)
    }

    pub fn add_path(&mut self, name: impl Into<String>, from: NodeId, to: NodeId) -> FleetResult<()> {
        Ok(self.network.add_path(name, from, to)?)
    }

    pub fn add_link(&mut self, name: impl Into<String>, a: NodeId, b: NodeId) -> FleetResult<()> {
        Ok(self.network.add_link(name, a, b)?)
    }

    pub fn add_destination(&mut self, node: NodeId) -> &mut Self {
        if !self.dests.contains(&node) {
            self.dests.push(node);
        }
        self
    }

    pub fn add_agv(&mut self, name: impl Into<String>, home: NodeId) -> AgvId {
        self.agvs.push((name.into(), home));
        AgvId(self.agvs.len() as u32 - 1)
    }

    pub fn add_shelf(&mut self, name: impl Into<String>, home: NodeId) -> ShelfId {
        self.shelves.push((name.into(), home));
        ShelfId(self.shelves.len() as u32 - 1)
    }

    pub fn build(self) -> FleetResult<Warehouse> {
        self.params.validate()?;
        let graph = self.network.build();
        let check = |what: &str, node: NodeId| {
            if graph.contains(node) {
                Ok(())
            } else {
                Err(FleetError::Scenario(format!("{what} refers to missing point {}", node.0)))
            }
        };
        for d in &self.dests {
            check("destination", *d)?;
        }

        let mut scene = SceneGraph::new();
        let root = scene.spawn("Root", LocalFrame::Plain);
        let network = scene.spawn_child(root, "Network", LocalFrame::Plain)?;
        let agv_group = scene.spawn_child(root, "AGVs", LocalFrame::Plain)?;

        let mut point_entity = Vec::with_capacity(graph.node_count());
        for i in 0..graph.node_count() {
            let n = NodeId(i as u32);
            let e = scene.spawn_child(network, graph.name(n), LocalFrame::Positional(graph.position(n)))?;
            point_entity.push(e);
        }
        for name in &graph.edge_name {
            scene.spawn_child(network, name.as_str(), LocalFrame::Plain)?;
        }

        let mut reservations = ReservationTable::new(graph.node_count());
        let mut agvs = Vec::with_capacity(self.agvs.len());
        for (i, (name, home)) in self.agvs.into_iter().enumerate() {
            check(&format!("agv `{name}`"), home)?;
            let id = AgvId(i as u32);
            if let Some(other) = reservations.claim(home, id) {
                return Err(FleetError::Scenario(format!(
                    "agv `{name}` starts on point {} already occupied by {other}",
                    home.0
                )));
            }
            let frame = LocalFrame::Spatial(Transform3::from_heading(0.0, graph.position(home)));
            let entity = scene.spawn_child(agv_group, name.as_str(), frame)?;
            agvs.push(Agv::new(name, entity, home));
        }

        let mut shelves = Vec::with_capacity(self.shelves.len());
        for (name, home) in self.shelves {
            check(&format!("shelf `{name}`"), home)?;
            let entity = scene.spawn_child(point_entity[home.index()], name.as_str(), LocalFrame::Plain)?;
            shelves.push(Shelf::new(name, entity, home));
        }

        let mut attrs = AttributeStore::new();
        attrs.set_class::<TravelSpeed>(self.params.travel_speed)?;
        attrs.set_class::<TurnRate>(self.params.turn_rate)?;

        if self.dests.is_empty() {
            warn!("warehouse has no destination points");
        }
        info!(
            points = graph.node_count(),
            paths = graph.edge_count(),
            agvs = agvs.len(),
            shelves = shelves.len(),
            "warehouse built"
        );

        Ok(Warehouse {
            params: self.params,
            scene,
            agv_group,
            point_entity,
            pathfinder: AStar::new(),
            reservations,
            graph,
            unassigned: (0..shelves.len() as u32).map(ShelfId).collect(),
            agvs,
            shelves,
            dest_points: self.dests,
            attrs,
            transitions: Vec::new(),
            completed: Vec::new(),
            rng: SimRng::stream(self.seed, 2),
        })
    }
}
