//! Tests for the registry, attributes, and scene graph.

use agv_core::{PreconditionError, Transform3, Vec3};

use crate::{LocalFrame, SceneError, SceneGraph};

fn positional(x: f64, z: f64) -> LocalFrame {
    LocalFrame::Positional(Vec3::new(x, 0.0, z))
}

fn close(a: Vec3, b: Vec3) -> bool {
    a.distance(b) < 1e-9
}

#[cfg(test)]
mod registry {
    use crate::Registry;

    #[test]
    fn lookups_tolerate_removed_ids() {
        let mut reg = Registry::new();
        let a = reg.insert("a");
        let b = reg.insert("b");
        assert_eq!(reg.get(a), Some(&"a"));
        assert_eq!(reg.remove(a), Some("a"));
        assert_eq!(reg.get(a), None);
        assert!(!reg.contains(a));
        assert_eq!(reg.remove(a), None);
        assert_eq!(reg.get(b), Some(&"b"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn recycled_slot_gets_a_fresh_id() {
        let mut reg = Registry::new();
        let a = reg.insert(1);
        reg.remove(a);
        let b = reg.insert(2);
        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(reg.get(a), None);
        assert_eq!(reg.get(b), Some(&2));
    }

    #[test]
    fn ids_are_in_creation_order() {
        let mut reg = Registry::new();
        let ids: Vec<_> = (0..5).map(|i| reg.insert(i)).collect();
        reg.remove(ids[2]);
        let expected: Vec<_> = ids.iter().copied().filter(|id| *id != ids[2]).collect();
        assert_eq!(reg.ids(), expected);
    }
}

#[cfg(test)]
mod attributes {
    use agv_core::{EntityId, PreconditionError};

    use crate::{Attribute, AttributeStore, Scope, Tracked};

    struct Speed;
    impl Attribute for Speed {
        type Value = f64;
        const OWNER: &'static str = "Agv";
        const NAME:  &'static str = "speed";
        const SCOPE: Scope        = Scope::Class;
    }

    struct Label;
    impl Attribute for Label {
        type Value = String;
        const OWNER: &'static str = "Agv";
        const NAME:  &'static str = "label";
        const SCOPE: Scope        = Scope::Instance;
    }

    #[test]
    fn tracked_marks_every_write() {
        let mut t = Tracked::new(3);
        assert!(t.is_dirty());
        t.clear_dirty();
        assert!(!t.is_dirty());
        t.set(3);
        assert!(t.is_dirty());
        t.clear_dirty();
        *t.modify() += 1;
        assert_eq!(*t, 4);
        assert!(t.is_dirty());
    }

    #[test]
    fn class_value_is_shared_and_tracked() {
        let mut attrs = AttributeStore::new();
        assert_eq!(attrs.class::<Speed>().unwrap(), None);
        attrs.set_class::<Speed>(1.0).unwrap();
        attrs.clear_dirty();
        assert!(!attrs.class_dirty::<Speed>());
        attrs.set_class::<Speed>(2.0).unwrap();
        assert!(attrs.class_dirty::<Speed>());
        assert_eq!(attrs.class::<Speed>().unwrap(), Some(&2.0));
    }

    #[test]
    fn instance_values_are_per_entity() {
        let mut attrs = AttributeStore::new();
        let (a, b) = (EntityId::allocate(), EntityId::allocate());
        attrs.set::<Label>(a, "left".into()).unwrap();
        attrs.set::<Label>(b, "right".into()).unwrap();
        attrs.clear_dirty();
        attrs.set::<Label>(b, "centre".into()).unwrap();

        assert_eq!(attrs.get::<Label>(a).unwrap().map(String::as_str), Some("left"));
        assert_eq!(attrs.get::<Label>(b).unwrap().map(String::as_str), Some("centre"));
        assert!(!attrs.is_dirty::<Label>(a));
        assert_eq!(attrs.dirty_instances::<Label>(), vec![b]);
    }

    #[test]
    fn wrong_scope_is_rejected() {
        let mut attrs = AttributeStore::new();
        let e = EntityId::allocate();
        let err = attrs.set::<Speed>(e, 1.0).unwrap_err();
        assert_eq!(
            err,
            PreconditionError::WrongScope { owner: "Agv", name: "speed", expected: "class" }
        );
        assert!(attrs.set_class::<Label>("x".into()).is_err());
        assert!(attrs.class::<Label>().is_err());
        assert!(attrs.get::<Speed>(e).is_err());
    }

    #[test]
    fn delete_is_always_invalid() {
        let mut attrs = AttributeStore::new();
        attrs.set_class::<Speed>(1.0).unwrap();
        let err = attrs.delete::<Speed>().unwrap_err();
        assert!(matches!(err, PreconditionError::InvalidOperation { op: "delete", .. }));
        assert!(attrs.delete::<Label>().is_err());
        assert_eq!(attrs.class::<Speed>().unwrap(), Some(&1.0));
    }
}

#[cfg(test)]
mod hierarchy {
    use super::*;

    #[test]
    fn reparent_detaches_from_old_parent() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("a", LocalFrame::Plain);
        let b = scene.spawn("b", LocalFrame::Plain);
        let c = scene.spawn_child(a, "c", LocalFrame::Plain).unwrap();

        scene.set_parent(c, Some(b)).unwrap();
        assert!(scene.children(a).unwrap().is_empty());
        assert_eq!(scene.children(b).unwrap(), &[c]);
        assert_eq!(scene.parent(c).unwrap(), Some(b));
    }

    #[test]
    fn add_child_requires_a_root() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("a", LocalFrame::Plain);
        let b = scene.spawn("b", LocalFrame::Plain);
        let c = scene.spawn_child(a, "c", LocalFrame::Plain).unwrap();
        let err = scene.add_child(b, c).unwrap_err();
        assert_eq!(
            err,
            SceneError::Precondition(PreconditionError::AlreadyParented { child: c, parent: a })
        );
    }

    #[test]
    fn cycles_are_rejected_without_side_effects() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("a", LocalFrame::Plain);
        let b = scene.spawn_child(a, "b", LocalFrame::Plain).unwrap();
        let c = scene.spawn_child(b, "c", LocalFrame::Plain).unwrap();

        assert!(scene.set_parent(a, Some(c)).is_err());
        assert!(scene.set_parent(a, Some(a)).is_err());
        assert_eq!(scene.parent(a).unwrap(), None);
        assert_eq!(scene.children(b).unwrap(), &[c]);
    }

    #[test]
    fn remove_child_checks_membership() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("a", LocalFrame::Plain);
        let b = scene.spawn("b", LocalFrame::Plain);
        assert!(scene.remove_child(a, b).is_err());
        scene.add_child(a, b).unwrap();
        scene.remove_child(a, b).unwrap();
        assert_eq!(scene.parent(b).unwrap(), None);
    }

    #[test]
    fn find_and_clear_children() {
        let mut scene = SceneGraph::new();
        let root = scene.spawn("root", LocalFrame::Plain);
        let x = scene.spawn_child(root, "x", LocalFrame::Plain).unwrap();
        let y = scene.spawn_child(root, "y", LocalFrame::Plain).unwrap();

        assert_eq!(scene.find_child(root, "y").unwrap(), Some(y));
        assert_eq!(scene.find_child(root, "z").unwrap(), None);
        assert_eq!(scene.clear_children(root).unwrap(), vec![x, y]);
        assert_eq!(scene.parent(x).unwrap(), None);
    }

    #[test]
    fn despawn_removes_the_subtree() {
        let mut scene = SceneGraph::new();
        let root = scene.spawn("root", LocalFrame::Plain);
        let a = scene.spawn_child(root, "a", LocalFrame::Plain).unwrap();
        let b = scene.spawn_child(a, "b", LocalFrame::Plain).unwrap();

        let removed = scene.despawn(a).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!scene.contains(a) && !scene.contains(b));
        assert!(scene.children(root).unwrap().is_empty());
        assert_eq!(scene.name(b).unwrap_err(), SceneError::UnknownEntity(b));
    }

    #[test]
    fn despawn_with_drops_instance_attributes() {
        use crate::{Attribute, AttributeStore, Scope};

        struct Tag;
        impl Attribute for Tag {
            type Value = u32;
            const OWNER: &'static str = "Node";
            const NAME:  &'static str = "tag";
            const SCOPE: Scope        = Scope::Instance;
        }

        let mut scene = SceneGraph::new();
        let mut attrs = AttributeStore::new();
        let root = scene.spawn("root", LocalFrame::Plain);
        let a = scene.spawn_child(root, "a", LocalFrame::Plain).unwrap();
        let b = scene.spawn_child(a, "b", LocalFrame::Plain).unwrap();
        for (e, v) in [(root, 0), (a, 1), (b, 2)] {
            attrs.set::<Tag>(e, v).unwrap();
        }

        let removed = scene.despawn_with(a, &mut attrs).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(attrs.get::<Tag>(a).unwrap(), None);
        assert_eq!(attrs.get::<Tag>(b).unwrap(), None);
        assert!(attrs.dirty_instances::<Tag>().is_empty());
        assert_eq!(attrs.get::<Tag>(root).unwrap(), Some(&0));
    }
}

#[cfg(test)]
mod transforms {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    #[test]
    fn plain_and_positional_reject_transform_writes() {
        let mut scene = SceneGraph::new();
        let plain = scene.spawn("plain", LocalFrame::Plain);
        let pos = scene.spawn("pos", positional(1.0, 2.0));

        assert!(scene.set_local_transform(plain, Transform3::IDENTITY).is_err());
        assert!(scene.set_position(plain, Vec3::ZERO).is_err());
        assert!(scene.set_local_transform(pos, Transform3::IDENTITY).is_err());
        scene.set_position(pos, Vec3::new(3.0, 0.0, 4.0)).unwrap();
        assert_eq!(scene.position(pos).unwrap(), Vec3::new(3.0, 0.0, 4.0));
        assert_eq!(scene.local_transform(plain).unwrap(), Transform3::IDENTITY);
    }

    #[test]
    fn global_transform_composes_to_the_root() {
        let mut scene = SceneGraph::new();
        let root = scene.spawn("root", LocalFrame::Spatial(Transform3::from_heading(PI, Vec3::ZERO)));
        let mid = scene.spawn_child(root, "mid", positional(2.0, 0.0)).unwrap();
        let leaf = scene
            .spawn_child(mid, "leaf", LocalFrame::Spatial(Transform3::from_heading(FRAC_PI_2, Vec3::new(1.0, 0.0, 0.0))))
            .unwrap();

        let g = scene.global_transform(leaf).unwrap();
        // leaf origin (1,0,0) + mid (2,0,0) = (3,0,0), then the root half-turn.
        assert!(close(g.origin, Vec3::new(-3.0, 0.0, 0.0)));
        assert!((g.heading() - (PI + FRAC_PI_2)).abs() < 1e-9);
    }

    #[test]
    fn carried_child_follows_its_parent() {
        let mut scene = SceneGraph::new();
        let point = scene.spawn("p", positional(5.0, 5.0));
        let agv = scene.spawn("agv", LocalFrame::Spatial(Transform3::translation(Vec3::ZERO)));
        let shelf = scene.spawn_child(point, "shelf", positional(0.0, 0.0)).unwrap();

        assert!(close(scene.global_transform(shelf).unwrap().origin, Vec3::new(5.0, 0.0, 5.0)));
        scene.set_parent(shelf, Some(agv)).unwrap();
        scene.set_position(agv, Vec3::new(1.0, 0.0, 2.0)).unwrap();
        assert!(close(scene.global_transform(shelf).unwrap().origin, Vec3::new(1.0, 0.0, 2.0)));
    }

    #[test]
    fn writes_and_reparenting_mark_nodes_dirty() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("a", positional(0.0, 0.0));
        let b = scene.spawn("b", LocalFrame::Plain);
        assert_eq!(scene.dirty_nodes(), vec![a, b]);

        scene.clear_dirty();
        assert!(scene.dirty_nodes().is_empty());

        scene.set_position(a, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(scene.dirty_nodes(), vec![a]);

        scene.clear_dirty();
        scene.add_child(a, b).unwrap();
        assert_eq!(scene.dirty_nodes(), vec![b]);

        scene.clear_dirty();
        scene.rename(a, "renamed").unwrap();
        assert_eq!(scene.dirty_nodes(), vec![a]);
    }
}
