//! Component Storage
//!
//! One sparse set per component type, keyed by [`EntityId`], plus a
//! type-erased registry over all of them.
//!
//! Iteration visits components in dense order. That order only depends on
//! the sequence of inserts and removes, so the same storage state always
//! iterates the same way. Removal swap-removes and therefore moves the last
//! component into the freed position. Structural changes while iterating are
//! impossible through the borrow checker; code that must mutate while walking
//! a type snapshots ids first with [`Storage::entities_with`].

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::component::{Component, ReleaseContext};
use super::entity::{Entity, EntityId, SceneId};

/// A component value together with its owner and enabled flag
#[derive(Debug)]
pub struct ComponentSlot<T> {
    owner: Entity,
    enabled: bool,
    value: T,
}

impl<T> ComponentSlot<T> {
    /// Entity this component is attached to
    pub fn owner(&self) -> Entity {
        self.owner
    }

    /// Whether the component participates in scene updates
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the component
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Component data
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Mutable component data
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

/// Sparse set storage for a single component type
pub struct ComponentStore<T: Component> {
    sparse: Vec<Option<usize>>,
    entities: Vec<EntityId>,
    slots: Vec<ComponentSlot<T>>,
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            slots: Vec::new(),
        }
    }

    fn dense_index(&self, id: EntityId) -> Option<usize> {
        let dense = (*self.sparse.get(id.index() as usize)?)?;
        (self.entities[dense] == id).then_some(dense)
    }

    /// Insert a component. Gives the value back if the entity already has one.
    pub fn insert(&mut self, owner: Entity, value: T) -> Result<(), T> {
        let id = owner.id();
        if self.dense_index(id).is_some() {
            return Err(value);
        }

        let sparse_index = id.index() as usize;
        if sparse_index >= self.sparse.len() {
            self.sparse.resize(sparse_index + 1, None);
        }

        self.sparse[sparse_index] = Some(self.slots.len());
        self.entities.push(id);
        self.slots.push(ComponentSlot {
            owner,
            enabled: true,
            value,
        });
        Ok(())
    }

    /// Remove a component, swap-removing it from the dense arrays
    pub fn remove(&mut self, id: EntityId) -> Option<ComponentSlot<T>> {
        let dense = self.dense_index(id)?;
        self.sparse[id.index() as usize] = None;

        let last = self.slots.len() - 1;
        self.entities.swap_remove(dense);
        let slot = self.slots.swap_remove(dense);

        if dense != last {
            let moved = self.entities[dense];
            self.sparse[moved.index() as usize] = Some(dense);
        }

        Some(slot)
    }

    /// Check for a component on an entity
    pub fn contains(&self, id: EntityId) -> bool {
        self.dense_index(id).is_some()
    }

    /// Borrow the slot of an entity
    pub fn slot(&self, id: EntityId) -> Option<&ComponentSlot<T>> {
        self.dense_index(id).map(|dense| &self.slots[dense])
    }

    /// Mutably borrow the slot of an entity
    pub fn slot_mut(&mut self, id: EntityId) -> Option<&mut ComponentSlot<T>> {
        self.dense_index(id).map(move |dense| &mut self.slots[dense])
    }

    /// Borrow the component of an entity
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.slot(id).map(ComponentSlot::value)
    }

    /// Mutably borrow the component of an entity
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slot_mut(id).map(ComponentSlot::value_mut)
    }

    /// Entities holding this component, in iteration order
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Iterate slots in dense order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &ComponentSlot<T>)> {
        self.entities.iter().copied().zip(self.slots.iter())
    }

    /// Iterate slots mutably in dense order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut ComponentSlot<T>)> {
        self.entities.iter().copied().zip(self.slots.iter_mut())
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the store holds nothing
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Type-erased view over a [`ComponentStore`]
pub(crate) trait ErasedStore {
    fn type_name(&self) -> &'static str;
    fn contains(&self, id: EntityId) -> bool;
    fn len(&self) -> usize;

    /// Release and drop the component of one entity
    fn release_entity(&mut self, id: EntityId, ctx: &mut ReleaseContext<'_>) -> bool;

    /// Release every component without removing it
    fn release_all(&mut self, ctx: &mut ReleaseContext<'_>);

    /// Copy every component into a new store owned by another scene
    fn duplicate_store(&self, scene: SceneId) -> Box<dyn ErasedStore>;

    /// Copy one entity's component onto another entity of the same scene
    fn duplicate_within(&mut self, from: EntityId, to: Entity) -> bool;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn type_name(&self) -> &'static str {
        T::NAME
    }

    fn contains(&self, id: EntityId) -> bool {
        ComponentStore::contains(self, id)
    }

    fn len(&self) -> usize {
        ComponentStore::len(self)
    }

    fn release_entity(&mut self, id: EntityId, ctx: &mut ReleaseContext<'_>) -> bool {
        match self.remove(id) {
            Some(mut slot) => {
                slot.value.release(ctx);
                true
            }
            None => false,
        }
    }

    fn release_all(&mut self, ctx: &mut ReleaseContext<'_>) {
        for slot in &mut self.slots {
            slot.value.release(ctx);
        }
    }

    fn duplicate_store(&self, scene: SceneId) -> Box<dyn ErasedStore> {
        let slots = self
            .slots
            .iter()
            .map(|slot| ComponentSlot {
                owner: Entity::new(slot.owner.id(), scene),
                enabled: slot.enabled,
                value: slot.value.duplicate(),
            })
            .collect();

        Box::new(ComponentStore::<T> {
            sparse: self.sparse.clone(),
            entities: self.entities.clone(),
            slots,
        })
    }

    fn duplicate_within(&mut self, from: EntityId, to: Entity) -> bool {
        let Some(source) = self.slot(from) else {
            return false;
        };
        let enabled = source.enabled;
        let value = source.value.duplicate();

        if self.insert(to, value).is_err() {
            return false;
        }
        if let Some(slot) = self.slot_mut(to.id()) {
            slot.enabled = enabled;
        }
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// All component stores of a scene, indexed by component type
#[derive(Default)]
pub struct Storage {
    stores: HashMap<TypeId, Box<dyn ErasedStore>>,
    attach_order: HashMap<EntityId, Vec<TypeId>>,
}

impl Storage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed store for `T`, if any component of that type was ever added
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|store| store.as_any().downcast_ref::<ComponentStore<T>>())
    }

    /// Typed store for `T`, if any component of that type was ever added
    pub fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<ComponentStore<T>>())
    }

    fn store_or_insert<T: Component>(&mut self) -> &mut ComponentStore<T> {
        let store = self
            .stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStore::<T>::new()));

        match store.as_any_mut().downcast_mut::<ComponentStore<T>>() {
            Some(store) => store,
            None => unreachable!("component store registered under a foreign TypeId"),
        }
    }

    /// Insert a component. Gives the value back if one already exists.
    pub fn insert<T: Component>(&mut self, owner: Entity, value: T) -> Result<(), T> {
        self.store_or_insert::<T>().insert(owner, value)?;
        self.attach_order.entry(owner.id()).or_default().push(TypeId::of::<T>());
        Ok(())
    }

    /// Check for a component
    pub fn contains<T: Component>(&self, id: EntityId) -> bool {
        self.store::<T>().is_some_and(|store| store.contains(id))
    }

    /// Borrow a component
    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.store::<T>()?.get(id)
    }

    /// Mutably borrow a component
    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.store_mut::<T>()?.get_mut(id)
    }

    /// Borrow a component slot
    pub fn slot<T: Component>(&self, id: EntityId) -> Option<&ComponentSlot<T>> {
        self.store::<T>()?.slot(id)
    }

    /// Mutably borrow a component slot
    pub fn slot_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut ComponentSlot<T>> {
        self.store_mut::<T>()?.slot_mut(id)
    }

    /// Remove one component, releasing its external resources first
    pub fn remove<T: Component>(&mut self, id: EntityId, ctx: &mut ReleaseContext<'_>) -> bool {
        let Some(store) = self.store_mut::<T>() else {
            return false;
        };
        let Some(mut slot) = store.remove(id) else {
            return false;
        };
        slot.value.release(ctx);

        let type_id = TypeId::of::<T>();
        if let Some(order) = self.attach_order.get_mut(&id) {
            order.retain(|t| *t != type_id);
        }
        true
    }

    /// Remove and release every component of an entity, newest first
    pub fn release_entity(&mut self, id: EntityId, ctx: &mut ReleaseContext<'_>) -> usize {
        let order = self.attach_order.remove(&id).unwrap_or_default();
        let mut released = 0;
        for type_id in order.iter().rev() {
            if let Some(store) = self.stores.get_mut(type_id) {
                if store.release_entity(id, ctx) {
                    released += 1;
                }
            }
        }
        released
    }

    /// Release the external resources of every stored component
    pub fn release_all(&mut self, ctx: &mut ReleaseContext<'_>) {
        for store in self.stores.values_mut() {
            store.release_all(ctx);
        }
    }

    /// Snapshot of entities holding `T`, in iteration order
    pub fn entities_with<T: Component>(&self) -> Vec<EntityId> {
        self.store::<T>().map(|store| store.entities().to_vec()).unwrap_or_default()
    }

    /// Component type names of an entity in attach order
    pub fn component_names(&self, id: EntityId) -> Vec<&'static str> {
        self.attach_order
            .get(&id)
            .map(|order| {
                order
                    .iter()
                    .filter_map(|type_id| self.stores.get(type_id))
                    .filter(|store| store.contains(id))
                    .map(|store| store.type_name())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of components attached to an entity
    pub fn component_count(&self, id: EntityId) -> usize {
        self.stores.values().filter(|store| store.contains(id)).count()
    }

    /// Number of components of type `T`
    pub fn count<T: Component>(&self) -> usize {
        self.store::<T>().map_or(0, ComponentStore::len)
    }

    /// Total number of stored components across all types
    pub fn total_components(&self) -> usize {
        self.stores.values().map(|store| store.len()).sum()
    }

    /// Copy every store for another scene, using each type's copy policy
    pub fn duplicate(&self, scene: SceneId) -> Storage {
        Storage {
            stores: self
                .stores
                .iter()
                .map(|(type_id, store)| (*type_id, store.duplicate_store(scene)))
                .collect(),
            attach_order: self.attach_order.clone(),
        }
    }

    /// Copy every component of `from` onto the fresh entity `to`, keeping
    /// attach order. Returns the number of copied components.
    pub fn duplicate_entity(&mut self, from: EntityId, to: Entity) -> usize {
        let order = self.attach_order.get(&from).cloned().unwrap_or_default();
        let mut copied = Vec::with_capacity(order.len());
        for type_id in order {
            if let Some(store) = self.stores.get_mut(&type_id) {
                if store.duplicate_within(from, to) {
                    copied.push(type_id);
                }
            }
        }
        let count = copied.len();
        self.attach_order.entry(to.id()).or_default().extend(copied);
        count
    }
}
