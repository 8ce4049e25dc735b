//! Unit and scenario tests for agv-fleet.
//!
//! Most tests drive a full `Simulator<Warehouse>` over a tiny hand-built
//! network and check the resulting timeline.

use std::f64::consts::PI;

use agv_core::{AgvId, NodeId, OrderingMode, SimConfig, SimTime, Vec3};
use agv_sim::{SimObserver, Simulator};

use crate::{AgvState, FleetParams, Warehouse, WarehouseBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

const EPS: f64 = 1e-9;

fn sim_of(world: Warehouse) -> Simulator<Warehouse> {
    Simulator::new(SimConfig::new(42, OrderingMode::Fifo), world)
}

/// Two points two units apart; one AGV and one shelf on `A`, `B` a
/// destination.
///
/// ```text
///   A(0,0,0) ──── B(2,0,0)
/// ```
fn line() -> (Warehouse, [NodeId; 2]) {
    let mut b = WarehouseBuilder::new(FleetParams::default(), 1);
    let a = b.add_point("A", Vec3::new(0.0, 0.0, 0.0)).unwrap();
    let bb = b.add_point("B", Vec3::new(2.0, 0.0, 0.0)).unwrap();
    b.add_link("A-B", a, bb).unwrap();
    b.add_destination(bb);
    b.add_agv("agv0", a);
    b.add_shelf("shelf0", a);
    (b.build().unwrap(), [a, bb])
}

/// A plus-shaped crossing with two-unit arms.
///
/// ```text
///                 N1(0,0,-2)
///                 │
///                 N
///                 │
///   W1 ── W ───── C ───── E ── E1
///                 │
///                 S
///                 │
///                 S1(0,0,2)
/// ```
///
/// AGV `a` starts on `W` with its shelf and delivers to `E1`; AGV `b`
/// starts on `N` and delivers to `S1`.  Both routes cross `C`.
fn cross() -> (Warehouse, [NodeId; 9]) {
    let mut b = WarehouseBuilder::new(FleetParams::default(), 1);
    let pts = [
        ("W1", -2.0, 0.0),
        ("W", -1.0, 0.0),
        ("C", 0.0, 0.0),
        ("E", 1.0, 0.0),
        ("E1", 2.0, 0.0),
        ("N1", 0.0, -2.0),
        ("N", 0.0, -1.0),
        ("S", 0.0, 1.0),
        ("S1", 0.0, 2.0),
    ];
    let mut n = [NodeId(0); 9];
    for (i, (name, x, z)) in pts.into_iter().enumerate() {
        n[i] = b.add_point(name, Vec3::new(x, 0.0, z)).unwrap();
    }
    let [w1, w, c, e, e1, n1, nn, s, s1] = n;
    for (a, bb) in [(w1, w), (w, c), (c, e), (e, e1), (n1, nn), (nn, c), (c, s), (s, s1)] {
        b.add_link(format!("{a}-{bb}"), a, bb).unwrap();
    }
    b.add_destination(e1).add_destination(s1);
    b.add_agv("a", w);
    b.add_agv("b", nn);
    b.add_shelf("sa", w);
    b.add_shelf("sb", nn);
    (b.build().unwrap(), n)
}

/// `n × n` grid, unit spacing, node `x + n*z`.  Shelves on the two top
/// corners, destinations on the two bottom corners, AGVs on the middle of
/// the top and bottom rows.
fn grid_world(seed: u64) -> Warehouse {
    let n = 3u32;
    let mut b = WarehouseBuilder::new(FleetParams::default(), seed);
    for z in 0..n {
        for x in 0..n {
            b.add_point(format!("{x}_{z}"), Vec3::new(x as f64, 0.0, z as f64)).unwrap();
        }
    }
    let id = |x: u32, z: u32| NodeId(x + n * z);
    for z in 0..n {
        for x in 0..n {
            if x + 1 < n {
                b.add_link(format!("h{x}_{z}"), id(x, z), id(x + 1, z)).unwrap();
            }
            if z + 1 < n {
                b.add_link(format!("v{x}_{z}"), id(x, z), id(x, z + 1)).unwrap();
            }
        }
    }
    b.add_shelf("s0", id(0, 0));
    b.add_shelf("s1", id(2, 0));
    b.add_destination(id(0, 2)).add_destination(id(2, 2));
    b.add_agv("agv0", id(1, 0));
    b.add_agv("agv1", id(1, 2));
    b.build().unwrap()
}

/// State-change times of one AGV as `(t, to)`.
fn timeline(w: &Warehouse, agv: AgvId) -> Vec<(f64, AgvState)> {
    w.transitions().iter().filter(|t| t.agv == agv).map(|t| (t.time.0, t.to)).collect()
}

// ── Single-AGV task timeline ──────────────────────────────────────────────────

#[cfg(test)]
mod task_timeline {
    use super::*;
    use crate::ShelfLocation;
    use crate::params::Deliveries;
    use agv_core::ShelfId;

    fn started() -> (Simulator<Warehouse>, [NodeId; 2]) {
        let (world, pts) = line();
        let mut sim = sim_of(world);
        sim.with_scheduler(|w, s| w.assign_task(s, AgvId(0), ShelfId(0), pts[1])).unwrap();
        (sim, pts)
    }

    #[test]
    fn full_cycle_state_times() {
        let (mut sim, _) = started();
        sim.run_until(SimTime(40.0)).unwrap();
        assert_eq!(
            timeline(sim.world(), AgvId(0)),
            [
                (0.0, AgvState::GrabShelf),
                (3.0, AgvState::ToDest),
                (5.0, AgvState::Waiting),
                (21.0, AgvState::ReturnShelf),
                (28.0, AgvState::ToHome),
                (28.0, AgvState::Idle),
            ]
        );
        let agv = sim.world().agv(AgvId(0)).unwrap();
        assert!((agv.heading() - PI).abs() < EPS, "final heading {}", agv.heading());
        assert!(agv.task().is_none());
        assert!(agv.cargo().is_none());
    }

    #[test]
    fn shelf_sits_on_destination_during_dwell() {
        let (mut sim, [a, b]) = started();
        sim.run_until(SimTime(7.9)).unwrap();
        assert_eq!(sim.world().shelf(ShelfId(0)).unwrap().location(), ShelfLocation::Carried(AgvId(0)));
        sim.run_until(SimTime(8.0)).unwrap();
        assert_eq!(sim.world().shelf(ShelfId(0)).unwrap().location(), ShelfLocation::Point(b));
        sim.run_until(SimTime(17.9)).unwrap();
        assert_eq!(sim.world().shelf(ShelfId(0)).unwrap().location(), ShelfLocation::Point(b));
        sim.run_until(SimTime(18.0)).unwrap();
        assert_eq!(sim.world().shelf(ShelfId(0)).unwrap().location(), ShelfLocation::Carried(AgvId(0)));
        sim.run_until(SimTime(28.0)).unwrap();
        assert_eq!(sim.world().shelf(ShelfId(0)).unwrap().location(), ShelfLocation::Point(a));
    }

    #[test]
    fn shelf_scene_parent_follows_carrier() {
        let (mut sim, [a, b]) = started();
        let w = sim.world();
        let shelf = w.shelf(ShelfId(0)).unwrap().entity;
        assert_eq!(w.scene().parent(shelf).unwrap(), Some(w.point_entity(a).unwrap()));

        sim.run_until(SimTime(4.0)).unwrap();
        let w = sim.world();
        assert_eq!(w.scene().parent(shelf).unwrap(), Some(w.agv(AgvId(0)).unwrap().entity));

        sim.run_until(SimTime(10.0)).unwrap();
        let w = sim.world();
        assert_eq!(w.scene().parent(shelf).unwrap(), Some(w.point_entity(b).unwrap()));
    }

    #[test]
    fn destination_binding_and_pool() {
        let (mut sim, [a, b]) = started();
        assert_eq!(sim.world().shelf(ShelfId(0)).unwrap().destination(), b);
        assert!(sim.world().unassigned().is_empty());
        assert!(sim.world().available_destinations().is_empty());

        sim.run_until(SimTime(21.0)).unwrap();
        assert_eq!(sim.world().shelf(ShelfId(0)).unwrap().destination(), a);
        assert_eq!(sim.world().available_destinations(), [b]);

        sim.run_until(SimTime(30.0)).unwrap();
        assert_eq!(sim.world().unassigned(), [ShelfId(0)]);
    }

    #[test]
    fn completion_recorded_once() {
        let (mut sim, [_, b]) = started();
        sim.run_until(SimTime(60.0)).unwrap();
        let w = sim.world();
        assert_eq!(w.completed().len(), 1);
        let c = w.completed()[0];
        assert_eq!((c.time.0, c.agv, c.shelf, c.dest), (28.0, AgvId(0), ShelfId(0), b));
        let entity = w.shelf(ShelfId(0)).unwrap().entity;
        assert_eq!(w.attributes().get::<Deliveries>(entity).unwrap(), Some(&1));
    }

    #[test]
    fn not_settled_while_grabbing_on_own_node() {
        let (sim, pts) = started();
        let agv = sim.world().agv(AgvId(0)).unwrap();
        // Shelf is under the AGV: no motion, only the grab step queued.
        assert_eq!(agv.state(), AgvState::GrabShelf);
        assert!(agv.motion().is_none() && !agv.is_blocked());
        assert_eq!(agv.node(), pts[0]);
        assert_eq!(sim.pending(), 1);
        assert!(!sim.world().is_settled(AgvId(0)).unwrap());
    }

    #[test]
    fn not_settled_while_waiting_at_destination() {
        let (mut sim, pts) = started();
        sim.run_until(SimTime(10.0)).unwrap();
        let agv = sim.world().agv(AgvId(0)).unwrap();
        assert_eq!((agv.state(), agv.node()), (AgvState::Waiting, pts[1]));
        assert!(!sim.world().is_settled(AgvId(0)).unwrap());
    }

    #[test]
    fn settled_after_cycle() {
        let (mut sim, _) = started();
        assert!(!sim.world().is_settled(AgvId(0)).unwrap());
        sim.run_until(SimTime(28.0)).unwrap();
        assert!(sim.world().is_settled(AgvId(0)).unwrap());
        assert_eq!(sim.world().reservations().held_by(AgvId(0)).len(), 1);
    }

    #[test]
    fn slower_class_speed_stretches_travel() {
        let (mut world, [_, b]) = line();
        world.set_travel_speed(0.5).unwrap();
        let mut sim = sim_of(world);
        sim.with_scheduler(|w, s| w.assign_task(s, AgvId(0), ShelfId(0), b)).unwrap();
        sim.run_until(SimTime(10.0)).unwrap();
        // 2 units at 0.5/s: arrive at 3 + 4.
        assert_eq!(timeline(sim.world(), AgvId(0))[2], (7.0, AgvState::Waiting));
    }
}

// ── Pose export ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod export {
    use super::*;
    use agv_core::ShelfId;

    fn at(t: f64) -> crate::Snapshot {
        let (world, [_, b]) = line();
        let mut sim = sim_of(world);
        sim.with_scheduler(|w, s| w.assign_task(s, AgvId(0), ShelfId(0), b)).unwrap();
        sim.run_until(SimTime(t)).unwrap();
        sim.world().snapshot(sim.now()).unwrap()
    }

    #[test]
    fn mid_move_pose_is_interpolated() {
        let snap = at(4.0);
        let agv = &snap.agvs[0];
        assert!((agv.position.x - 1.0).abs() < EPS);
        assert_eq!(agv.state, Some(AgvState::ToDest));
        // Carried shelf shares the AGV pose.
        let shelf = &snap.shelves[0];
        assert!((shelf.position.x - 1.0).abs() < EPS);
        assert_eq!(shelf.state, None);
    }

    #[test]
    fn mid_rotation_heading_is_interpolated() {
        let snap = at(22.0);
        let agv = &snap.agvs[0];
        assert!((agv.position.x - 2.0).abs() < EPS);
        assert!((agv.heading - PI / 2.0).abs() < 1e-6, "heading {}", agv.heading);
    }

    #[test]
    fn snapshot_does_not_mutate() {
        let (world, _) = line();
        let before = format!("{world:?}");
        let snap = world.snapshot(SimTime::ZERO).unwrap();
        assert_eq!(format!("{world:?}"), before);
        assert_eq!(snap.agvs[0].name, "agv0");
        assert!(snap.to_json().unwrap().contains("\"idle\""));
    }
}

// ── Assignment preconditions ──────────────────────────────────────────────────

#[cfg(test)]
mod assign {
    use super::*;
    use crate::FleetError;
    use agv_core::{PreconditionError, ShelfId};

    #[test]
    fn busy_agv_is_rejected() {
        let (world, [_, b]) = line();
        let mut sim = sim_of(world);
        sim.with_scheduler(|w, s| w.assign_task(s, AgvId(0), ShelfId(0), b)).unwrap();
        sim.run_until(SimTime(3.5)).unwrap();
        let err = sim.with_scheduler(|w, s| w.assign_task(s, AgvId(0), ShelfId(0), b)).unwrap_err();
        assert!(
            matches!(err, FleetError::Precondition(PreconditionError::AgentBusy { ref state, .. }) if *state == "to_dest"),
            "{err}"
        );
    }

    #[test]
    fn shelf_in_another_task_is_rejected() {
        let (world, n) = cross();
        let mut sim = sim_of(world);
        sim.with_scheduler(|w, s| w.assign_task(s, AgvId(0), ShelfId(0), n[4])).unwrap();
        let err = sim.with_scheduler(|w, s| w.assign_task(s, AgvId(1), ShelfId(0), n[8])).unwrap_err();
        assert!(matches!(err, FleetError::Precondition(PreconditionError::ShelfUnavailable { .. })), "{err}");
        // The rejected AGV is untouched.
        assert_eq!(sim.world().agv(AgvId(1)).unwrap().state(), AgvState::Idle);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let (world, [_, b]) = line();
        let mut sim = sim_of(world);
        let err = sim.with_scheduler(|w, s| w.assign_task(s, AgvId(7), ShelfId(0), b)).unwrap_err();
        assert!(matches!(err, FleetError::UnknownAgv(AgvId(7))));
        let err = sim.with_scheduler(|w, s| w.assign_task(s, AgvId(0), ShelfId(7), b)).unwrap_err();
        assert!(matches!(err, FleetError::UnknownShelf(ShelfId(7))));
        let err = sim.with_scheduler(|w, s| w.assign_task(s, AgvId(0), ShelfId(0), NodeId(99))).unwrap_err();
        assert!(matches!(err, FleetError::UnknownPoint(NodeId(99))));
        assert_eq!(sim.pending(), 0);
    }
}

// ── Two AGVs contending for one crossing ──────────────────────────────────────

#[cfg(test)]
mod conflict {
    use super::*;
    use agv_core::ShelfId;

    /// Checks the exclusivity and lock-shape invariants after every event.
    #[derive(Default)]
    struct Invariants {
        violations:   Vec<String>,
        blocked_seen: bool,
    }

    impl SimObserver<Warehouse> for Invariants {
        fn on_dispatch(&mut self, now: SimTime, label: &'static str, w: &Warehouse) {
            let mut fail = |msg: String| self.violations.push(format!("t={} after {label}: {msg}", now.0));

            let nodes: Vec<NodeId> = w.agvs().iter().map(|a| a.node()).collect();
            for (i, node) in nodes.iter().enumerate() {
                if nodes[..i].contains(node) {
                    fail(format!("two AGVs on {node}"));
                }
                if w.reservations().holder(*node) != Some(AgvId(i as u32)) {
                    fail(format!("agv {i} does not hold its own node {node}"));
                }
            }

            for (i, agv) in w.agvs().iter().enumerate() {
                let held = agv.held();
                if held.first() != Some(&agv.node()) {
                    fail(format!("agv {i} held {held:?} does not start at {}", agv.node()));
                }
                match agv.plan() {
                    Some(plan) => {
                        let rest = if plan.first() == Some(&agv.node()) { &plan[1..] } else { plan };
                        if !rest.starts_with(&held[1..]) {
                            fail(format!("agv {i} held {held:?} is not a prefix of plan {plan:?}"));
                        }
                    }
                    None if held.len() != 1 => fail(format!("agv {i} holds {held:?} without a plan")),
                    None => {}
                }
                if let Some(m) = agv.motion() {
                    if w.reservations().holder(m.to) != Some(AgvId(i as u32)) {
                        fail(format!("agv {i} moving onto unheld {}", m.to));
                    }
                }
            }

            self.blocked_seen |= w.agvs().iter().any(|a| a.is_blocked());
        }
    }

    fn run(horizon: f64) -> (Simulator<Warehouse>, Invariants, [NodeId; 9]) {
        let (world, n) = cross();
        let mut sim = sim_of(world);
        sim.with_scheduler(|w, s| -> crate::FleetResult<()> {
            w.assign_task(s, AgvId(0), ShelfId(0), n[4])?;
            w.assign_task(s, AgvId(1), ShelfId(1), n[8])
        })
        .unwrap();
        let mut obs = Invariants::default();
        sim.run_until_observed(SimTime(horizon), &mut obs).unwrap();
        (sim, obs, n)
    }

    #[test]
    fn exclusivity_holds_throughout() {
        let (_, obs, _) = run(60.0);
        assert!(obs.violations.is_empty(), "{:#?}", obs.violations);
        assert!(obs.blocked_seen);
    }

    #[test]
    fn second_agv_waits_for_the_crossing() {
        let (sim, _, n) = run(3.0);
        let b = sim.world().agv(AgvId(1)).unwrap();
        assert!(b.is_blocked());
        assert_eq!(b.node(), n[6]);
        // Fallback route straight through the crossing.
        assert_eq!(b.plan(), Some(&[n[6], n[2], n[7], n[8]][..]));
        assert_eq!(sim.world().reservations().holder(n[2]), Some(AgvId(0)));
    }

    #[test]
    fn wait_releases_when_crossing_frees() {
        let (sim, _, _) = run(5.0);
        let b = sim.world().agv(AgvId(1)).unwrap();
        assert!(!b.is_blocked());
        // First step after waking is turning south.
        let m = b.motion().expect("rotation in flight");
        assert!(m.is_rotation());
        assert_eq!(m.end, SimTime(6.0));
    }

    #[test]
    fn both_finish() {
        let (sim, _, _) = run(60.0);
        let w = sim.world();
        for id in w.agv_ids() {
            assert_eq!(w.agv(id).unwrap().state(), AgvState::Idle, "{id}");
            assert!(w.is_settled(id).unwrap());
        }
        assert_eq!(w.completed().len(), 2);
        let a_idle = timeline(w, AgvId(0)).last().unwrap().0;
        let b_idle = timeline(w, AgvId(1)).last().unwrap().0;
        assert!(a_idle < b_idle, "a {a_idle} b {b_idle}");
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dispatch {
    use super::*;
    use crate::Dispatcher;

    fn run(seed: u64, horizon: f64) -> Simulator<Warehouse> {
        let mut sim = Simulator::new(SimConfig::new(seed, OrderingMode::Fifo), grid_world(seed));
        let params = sim.world().params().clone();
        sim.with_scheduler(|_, s| Dispatcher::from_params(&params).start(s)).unwrap();
        sim.run_until(SimTime(horizon)).unwrap();
        sim
    }

    #[test]
    fn tick_hands_out_one_job() {
        let mut sim = sim_of(grid_world(3));
        let made = sim.with_scheduler(|w, s| w.dispatch_once(s)).unwrap();
        let (agv, shelf, dest) = made.expect("an assignment");
        let w = sim.world();
        assert_eq!(w.agv(agv).unwrap().task().map(|t| (t.shelf, t.dest)), Some((shelf, dest)));
        assert!(w.dest_points().contains(&dest));
        assert!(!w.unassigned().contains(&shelf));
    }

    #[test]
    fn nearest_free_agv_takes_the_job() {
        let mut sim = sim_of(grid_world(3));
        let (agv, shelf, _) = sim.with_scheduler(|w, s| w.dispatch_once(s)).unwrap().unwrap();
        // Both shelves sit on the top row next to agv0.
        assert_eq!(agv, AgvId(0), "{shelf}");
    }

    #[test]
    fn no_job_without_free_destination() {
        let mut sim = sim_of(grid_world(3));
        sim.with_scheduler(|w, s| -> crate::FleetResult<()> {
            assert!(w.dispatch_once(s)?.is_some());
            assert!(w.dispatch_once(s)?.is_some());
            Ok(())
        })
        .unwrap();
        // Two destinations, both bound now.
        let third = sim.with_scheduler(|w, s| w.dispatch_once(s)).unwrap();
        assert!(third.is_none());
    }

    #[test]
    fn steady_state_delivers() {
        let sim = run(11, 600.0);
        let w = sim.world();
        assert!(w.completed().len() >= 4, "only {} deliveries", w.completed().len());

        // Every shelf is either pooled or in exactly one task.
        for (i, _) in w.shelves().iter().enumerate() {
            let id = agv_core::ShelfId(i as u32);
            let pooled = w.unassigned().iter().filter(|s| **s == id).count();
            let tasked = w.agvs().iter().filter(|a| a.task().is_some_and(|t| t.shelf == id)).count();
            assert_eq!(pooled + tasked, 1, "shelf {i}: pooled {pooled} tasked {tasked}");
        }
    }

    #[test]
    fn same_seed_same_run() {
        let a = run(5, 200.0);
        let b = run(5, 200.0);
        assert_eq!(a.world().transitions(), b.world().transitions());
        assert_eq!(a.world().completed(), b.world().completed());
        assert_eq!(a.dispatched(), b.dispatched());
    }
}

// ── Scenario files and parameters ─────────────────────────────────────────────

#[cfg(test)]
mod scenario {
    use super::*;
    use crate::{FleetError, NetworkSpec, Scenario};

    fn small() -> Scenario {
        Scenario {
            network: NetworkSpec {
                points: vec![
                    ("p0".into(), [0.0, 0.0, 0.0]),
                    ("p1".into(), [1.5, 0.0, 0.0]),
                    ("p2".into(), [3.0, 0.0, 0.0]),
                ],
                paths: vec![
                    ("p0-p1".into(), 0, 1),
                    ("p1-p0".into(), 1, 0),
                    ("p1-p2".into(), 1, 2),
                    ("p2-p1".into(), 2, 1),
                ],
            },
            dest_points: vec![2],
            agvs:        vec![("agv0".into(), 0)],
            shelves:     vec![("shelf0".into(), 1)],
        }
    }

    #[test]
    fn parse_documented_layout() {
        let text = r#"{
            "network": {
                "points": [["p0", [0.0, 0.0, 0.0]], ["p1", [1.5, 0.0, 0.0]]],
                "paths":  [["p0-p1", 0, 1], ["p1-p0", 1, 0]]
            },
            "dest_points": [1],
            "agvs":    [["agv0", 0]],
            "shelves": [["shelf0", 0]]
        }"#;
        let s = Scenario::from_json(text).unwrap();
        let w = s.build(FleetParams::default(), 0).unwrap();
        assert_eq!(w.graph().node_count(), 2);
        assert_eq!(w.graph().edge_count(), 2);
        assert_eq!(w.agv_by_name("agv0"), Some(AgvId(0)));
        assert!(w.shelf_by_name("shelf0").is_some());
        assert_eq!(w.dest_points(), [NodeId(1)]);
    }

    #[test]
    fn json_round_trip() {
        let s = small();
        assert_eq!(Scenario::from_json(&s.to_json().unwrap()).unwrap(), s);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        small().write_to(&path).unwrap();
        assert_eq!(Scenario::from_path(&path).unwrap(), small());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::from_path(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, FleetError::Io(_)));
    }

    #[test]
    fn bad_point_index_rejected() {
        let mut s = small();
        s.network.paths.push(("bad".into(), 0, 9));
        let err = Scenario::from_json(&s.to_json().unwrap()).unwrap_err();
        assert!(matches!(err, FleetError::Scenario(ref m) if m.contains("bad")), "{err}");

        let mut s = small();
        s.shelves.push(("lost".into(), 3));
        assert!(matches!(s.validate(), Err(FleetError::Scenario(_))));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(Scenario::from_json("{ \"network\": 3 }"), Err(FleetError::Json(_))));
    }

    #[test]
    fn shared_start_point_rejected() {
        let mut s = small();
        s.agvs.push(("agv1".into(), 0));
        let err = s.build(FleetParams::default(), 0).unwrap_err();
        assert!(matches!(err, FleetError::Scenario(ref m) if m.contains("agv1")), "{err}");
    }

    #[test]
    fn built_world_starts_idle_and_locked() {
        let w = small().build(FleetParams::default(), 0).unwrap();
        let agv = w.agv(AgvId(0)).unwrap();
        assert_eq!(agv.state(), AgvState::Idle);
        assert_eq!(agv.held(), [NodeId(0)]);
        assert_eq!(w.reservations().holder(NodeId(0)), Some(AgvId(0)));
        assert_eq!(w.travel_speed().unwrap(), 1.0);
    }

    #[test]
    fn partial_params_take_defaults() {
        let p: FleetParams = serde_json::from_str(r#"{ "grab_secs": 1.0, "lookahead": 4 }"#).unwrap();
        assert_eq!(p.grab_secs, 1.0);
        assert_eq!(p.lookahead, 4);
        assert_eq!(p.dwell_secs, FleetParams::default().dwell_secs);
        assert_eq!(p.blocked_timeout_secs, 5.0);
        p.validate().unwrap();
    }

    #[test]
    fn drop_longer_than_dwell_rejected_at_build() {
        let params = FleetParams { drop_secs: 5.0, dwell_secs: 4.0, ..FleetParams::default() };
        let err = small().build(params, 0).unwrap_err();
        assert!(matches!(err, FleetError::Config(ref m) if m.contains("drop_secs")), "{err}");
    }

    #[test]
    fn unusable_params_rejected() {
        let base = FleetParams::default;
        for p in [
            FleetParams { travel_speed: 0.0, ..base() },
            FleetParams { turn_rate: -1.0, ..base() },
            FleetParams { dispatch_interval_secs: 0.0, ..base() },
            FleetParams { blocked_timeout_secs: -1.0, ..base() },
            FleetParams { no_plan_timeout_secs: f64::NAN, ..base() },
            FleetParams { grab_secs: f64::INFINITY, ..base() },
            FleetParams { lookahead: 0, ..base() },
        ] {
            assert!(matches!(p.validate(), Err(FleetError::Config(_))), "{p:?}");
        }
        // Equal drop and dwell leave a zero-length pause, which is fine.
        FleetParams { drop_secs: 4.0, dwell_secs: 4.0, ..base() }.validate().unwrap();
    }

    #[test]
    fn class_rate_must_be_positive() {
        let mut w = small().build(FleetParams::default(), 0).unwrap();
        assert!(matches!(w.set_travel_speed(0.0), Err(FleetError::Config(_))));
        assert!(matches!(w.set_turn_rate(f64::NAN), Err(FleetError::Config(_))));
        assert_eq!(w.travel_speed().unwrap(), 1.0);
    }
}

// ── Small helpers ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod helpers {
    use super::*;
    use crate::navigate::shortest_turn;

    #[test]
    fn turn_takes_the_short_way() {
        assert_eq!(shortest_turn(0.0, PI), PI);
        assert!((shortest_turn(0.0, 1.5 * PI) + 0.5 * PI).abs() < EPS);
        assert!((shortest_turn(1.5 * PI, 0.0) - 2.0 * PI).abs() < EPS);
    }

    #[test]
    fn state_names() {
        assert_eq!(AgvState::ReturnShelf.to_string(), "return_shelf");
        assert!(AgvState::ToHome.accepts_task());
        assert!(!AgvState::Waiting.accepts_task());
        assert_eq!(serde_json::to_string(&AgvState::GrabShelf).unwrap(), "\"grab_shelf\"");
    }
}
