//! Change-tracked values and scoped attributes.
//!
//! [`Tracked<T>`] is the building block: a value plus a dirty bit that flips
//! to `true` on every write.  Downstream exporters read the dirty bits to
//! find what changed since the last snapshot, then clear them.
//!
//! [`AttributeStore`] adds the owner/name/scope bookkeeping on top.  Each
//! attribute is a marker type implementing [`Attribute`]; a `Class`-scoped
//! attribute has one shared value, an `Instance`-scoped attribute has one
//! value per entity.  Going through the wrong scope, or trying to delete an
//! attribute, is a [`PreconditionError`].
//!
//! ```rust
//! use agv_scene::{Attribute, AttributeStore, Scope};
//!
//! struct TopSpeed;
//! impl Attribute for TopSpeed {
//!     type Value = f64;
//!     const OWNER: &'static str = "Agv";
//!     const NAME:  &'static str = "top_speed";
//!     const SCOPE: Scope        = Scope::Class;
//! }
//!
//! let mut attrs = AttributeStore::new();
//! attrs.set_class::<TopSpeed>(1.5).unwrap();
//! assert_eq!(attrs.class::<TopSpeed>().unwrap(), Some(&1.5));
//! assert!(attrs.class_dirty::<TopSpeed>());
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::ops::Deref;

use agv_core::{EntityId, PreconditionError, PreconditionResult};

// ── Tracked<T> ────────────────────────────────────────────────────────────────

/// A value with a dirty flag.  A freshly constructed value counts as changed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tracked<T> {
    value: T,
    dirty: bool,
}

impl<T> Tracked<T> {
    pub fn new(value: T) -> Self {
        Self { value, dirty: true }
    }

    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and mark it dirty, even if the new value is equal.
    #[inline]
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.dirty = true;
    }

    /// Mutable access.  Marks the value dirty up front.
    #[inline]
    pub fn modify(&mut self) -> &mut T {
        self.dirty = true;
        &mut self.value
    }

    /// Mark dirty without changing the value.
    #[inline]
    pub fn touch(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Default> Default for Tracked<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

// ── Attribute ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Scope {
    Class,
    Instance,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Class    => "class",
            Scope::Instance => "instance",
        }
    }
}

/// A named, scoped attribute.  Implemented by zero-sized marker types.
pub trait Attribute: 'static {
    type Value: 'static;
    const OWNER: &'static str;
    const NAME:  &'static str;
    const SCOPE: Scope;
}

// ── Type-erased columns ───────────────────────────────────────────────────────

trait Column: 'static {
    fn clear_dirty(&mut self);
    fn forget(&mut self, entity: EntityId);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct ClassColumn<V: 'static>(Tracked<V>);

struct InstanceColumn<V: 'static>(HashMap<EntityId, Tracked<V>>);

impl<V: 'static> Column for ClassColumn<V> {
    fn clear_dirty(&mut self) {
        self.0.clear_dirty();
    }

    fn forget(&mut self, _entity: EntityId) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<V: 'static> Column for InstanceColumn<V> {
    fn clear_dirty(&mut self) {
        for t in self.0.values_mut() {
            t.clear_dirty();
        }
    }

    fn forget(&mut self, entity: EntityId) {
        self.0.remove(&entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ── AttributeStore ────────────────────────────────────────────────────────────

/// Storage for every registered attribute, keyed by marker type.
#[derive(Default)]
pub struct AttributeStore {
    columns: HashMap<TypeId, Box<dyn Column>>,
}

fn require_scope<A: Attribute>(scope: Scope) -> PreconditionResult<()> {
    if A::SCOPE == scope {
        Ok(())
    } else {
        Err(PreconditionError::WrongScope {
            owner:    A::OWNER,
            name:     A::NAME,
            expected: A::SCOPE.as_str(),
        })
    }
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Class scope ───────────────────────────────────────────────────────

    /// Write the shared value of a class-scoped attribute and mark it dirty.
    pub fn set_class<A: Attribute>(&mut self, value: A::Value) -> PreconditionResult<()> {
        require_scope::<A>(Scope::Class)?;
        let key = TypeId::of::<A>();
        match self
            .columns
            .get_mut(&key)
            .and_then(|c| c.as_any_mut().downcast_mut::<ClassColumn<A::Value>>())
        {
            Some(col) => col.0.set(value),
            None => {
                self.columns.insert(key, Box::new(ClassColumn(Tracked::new(value))));
            }
        }
        Ok(())
    }

    /// The shared value, or `None` if never written.
    pub fn class<A: Attribute>(&self) -> PreconditionResult<Option<&A::Value>> {
        require_scope::<A>(Scope::Class)?;
        Ok(self
            .columns
            .get(&TypeId::of::<A>())
            .and_then(|c| c.as_any().downcast_ref::<ClassColumn<A::Value>>())
            .map(|c| c.0.get()))
    }

    /// `false` for unset or instance-scoped attributes.
    pub fn class_dirty<A: Attribute>(&self) -> bool {
        self.columns
            .get(&TypeId::of::<A>())
            .and_then(|c| c.as_any().downcast_ref::<ClassColumn<A::Value>>())
            .is_some_and(|c| c.0.is_dirty())
    }

    // ── Instance scope ────────────────────────────────────────────────────

    /// Write `entity`'s value of an instance-scoped attribute and mark it dirty.
    pub fn set<A: Attribute>(&mut self, entity: EntityId, value: A::Value) -> PreconditionResult<()> {
        require_scope::<A>(Scope::Instance)?;
        let col = self
            .columns
            .entry(TypeId::of::<A>())
            .or_insert_with(|| Box::new(InstanceColumn::<A::Value>(HashMap::new())));
        if let Some(col) = col.as_any_mut().downcast_mut::<InstanceColumn<A::Value>>() {
            match col.0.get_mut(&entity) {
                Some(t) => t.set(value),
                None => {
                    col.0.insert(entity, Tracked::new(value));
                }
            }
        }
        Ok(())
    }

    pub fn get<A: Attribute>(&self, entity: EntityId) -> PreconditionResult<Option<&A::Value>> {
        require_scope::<A>(Scope::Instance)?;
        Ok(self
            .instance_column::<A>()
            .and_then(|c| c.0.get(&entity))
            .map(|t| t.get()))
    }

    pub fn is_dirty<A: Attribute>(&self, entity: EntityId) -> bool {
        self.instance_column::<A>()
            .and_then(|c| c.0.get(&entity))
            .is_some_and(|t| t.is_dirty())
    }

    /// Entities whose value of `A` changed since the last [`clear_dirty`](Self::clear_dirty),
    /// in creation order.
    pub fn dirty_instances<A: Attribute>(&self) -> Vec<EntityId> {
        let mut out: Vec<EntityId> = self
            .instance_column::<A>()
            .map(|c| c.0.iter().filter(|(_, t)| t.is_dirty()).map(|(e, _)| *e).collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    fn instance_column<A: Attribute>(&self) -> Option<&InstanceColumn<A::Value>> {
        self.columns
            .get(&TypeId::of::<A>())
            .and_then(|c| c.as_any().downcast_ref::<InstanceColumn<A::Value>>())
    }

    // ── Whole-store operations ────────────────────────────────────────────

    /// Attributes cannot be deleted.  Always fails.
    pub fn delete<A: Attribute>(&mut self) -> PreconditionResult<()> {
        Err(PreconditionError::InvalidOperation {
            owner: A::OWNER,
            name:  A::NAME,
            op:    "delete",
        })
    }

    pub fn clear_dirty(&mut self) {
        for col in self.columns.values_mut() {
            col.clear_dirty();
        }
    }

    /// Drop every instance value held for `entity`.  Reached through
    /// [`SceneGraph::despawn_with`](crate::SceneGraph::despawn_with).
    pub(crate) fn forget(&mut self, entity: EntityId) {
        for col in self.columns.values_mut() {
            col.forget(entity);
        }
    }
}
