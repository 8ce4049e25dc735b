//! Arena storage with a weak id → slot index.
//!
//! # Design
//!
//! Values live in `slots: Vec<Option<(EntityId, T)>>`.  The index maps an
//! `EntityId` to its slot position and is the only way in; it holds no
//! reference to the value, so it never extends a value's lifetime.  Removing
//! a value clears its slot and drops its index entry in the same call.
//!
//! Slots are recycled through a free list, but ids are not: ids come from
//! [`EntityId::allocate`], which never hands out the same number twice, so a
//! stale id can only ever resolve to `None`.

use agv_core::EntityId;

#[cfg(feature = "fx-hash")]
type IdIndex = rustc_hash::FxHashMap<EntityId, usize>;

#[cfg(not(feature = "fx-hash"))]
type IdIndex = std::collections::HashMap<EntityId, usize>;

pub struct Registry<T> {
    slots: Vec<Option<(EntityId, T)>>,
    index: IdIndex,
    free:  Vec<usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: IdIndex::default(),
            free:  Vec::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under a freshly allocated id.
    pub fn insert(&mut self, value: T) -> EntityId {
        let id = EntityId::allocate();
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some((id, value));
                slot
            }
            None => {
                self.slots.push(Some((id, value)));
                self.slots.len() - 1
            }
        };
        self.index.insert(id, slot);
        id
    }

    /// Look up a live value.  Returns `None` for ids that were removed or
    /// never belonged to this registry.
    pub fn get(&self, id: EntityId) -> Option<&T> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_ref().map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_mut().map(|(_, v)| v)
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Remove and return the value, invalidating `id`.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let slot = self.index.remove(&id)?;
        let (_, value) = self.slots[slot].take()?;
        self.free.push(slot);
        Some(value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Live ids in creation order.
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate live `(id, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.slots
            .iter()
            .filter_map(|s| s.as_ref().map(|(id, v)| (*id, v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .filter_map(|s| s.as_mut().map(|(id, v)| (*id, v)))
    }
}
