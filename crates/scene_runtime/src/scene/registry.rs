//! Scene ownership, entities and components

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};

use log::{debug, error, trace, warn};

use super::{Hierarchy, SceneError};
use crate::config::SceneSettings;
use crate::ecs::components::{
    Colliders2DComponent, IdComponent, NameComponent, NativeScriptsComponent, RigidBody2DComponent, TransformComponent,
};
use crate::ecs::{AttachContext, Component, ComponentSlot, Entity, EntityAllocator, EntityId, ReleaseContext, SceneId, Storage};
use crate::foundation::math::Vec2;
use crate::physics::{PhysicsError, PhysicsWorld2D, SimplePhysicsWorld2D};
use crate::scripting::{NativeScript, ScriptDescriptor, ScriptTypeId};

/// # Scene
///
/// Single owner of the entities, component storage, hierarchy and physics
/// world of one loaded world.
///
/// Every method taking an [`Entity`] validates it first: handles from another
/// scene or handles that outlived their entity are reported as
/// [`SceneError::ForeignEntity`] / [`SceneError::StaleEntity`] and logged.
/// The `try_*` accessors are the silent variants for expected absence.
///
/// Destroying an entity destroys its whole subtree.
pub struct Scene {
    pub(super) id: SceneId,
    pub(super) settings: SceneSettings,
    pub(super) allocator: EntityAllocator,
    pub(super) storage: Storage,
    pub(super) hierarchy: Hierarchy,
    pub(super) uuids: HashMap<u64, EntityId>,
    pub(super) physics: Box<dyn PhysicsWorld2D>,
    pub(super) viewport: (u32, u32),
    pub(super) running: bool,
    pub(super) active_contacts: BTreeSet<(EntityId, EntityId)>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneSettings::default())
    }
}

impl Scene {
    /// Create an empty scene backed by [`SimplePhysicsWorld2D`]
    pub fn new(settings: SceneSettings) -> Self {
        let physics = Box::new(SimplePhysicsWorld2D::new(&settings.physics_2d));
        Self::with_physics(settings, physics)
    }

    /// Create an empty scene over a specific physics backend
    pub fn with_physics(settings: SceneSettings, mut physics: Box<dyn PhysicsWorld2D>) -> Self {
        physics.set_gravity(settings.physics_2d.gravity);
        let id = SceneId::next();
        debug!("Created scene {} (gravity {:?})", id.get(), settings.physics_2d.gravity);

        Self {
            id,
            settings,
            allocator: EntityAllocator::new(),
            storage: Storage::new(),
            hierarchy: Hierarchy::new(),
            uuids: HashMap::new(),
            physics,
            viewport: (0, 0),
            running: false,
            active_contacts: BTreeSet::new(),
        }
    }

    /// Identity of this scene instance
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Settings the scene was created with
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Read-only access to the physics world
    pub fn physics(&self) -> &dyn PhysicsWorld2D {
        self.physics.as_ref()
    }

    /// Read-only access to the hierarchy
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub(super) fn handle(&self, id: EntityId) -> Entity {
        Entity::new(id, self.id)
    }

    /// Log an invariant violation and hand the error back
    pub(super) fn violation(&self, err: SceneError) -> SceneError {
        error!("Scene {}: {}", self.id.get(), err);
        err
    }

    /// Validate a handle against this scene
    pub(super) fn resolve(&self, entity: Entity) -> Result<EntityId, SceneError> {
        if entity.scene() != self.id {
            return Err(self.violation(SceneError::ForeignEntity(entity)));
        }
        if !self.allocator.is_alive(entity.id()) {
            return Err(self.violation(SceneError::StaleEntity(entity)));
        }
        Ok(entity.id())
    }

    /// True if the handle names a living entity of this scene
    pub fn is_valid(&self, entity: Entity) -> bool {
        entity.scene() == self.id && self.allocator.is_alive(entity.id())
    }

    pub(super) fn attach_context(&self) -> AttachContext {
        AttachContext {
            viewport: self.viewport,
            running: self.running,
        }
    }

    // ---------------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------------

    /// Create a root entity with a random stable id
    pub fn create_entity(&mut self, name: &str) -> Entity {
        let uuid = self.fresh_uuid();
        self.spawn(None, name, uuid)
    }

    /// Create a root entity with an explicit stable id
    pub fn create_entity_with_uuid(&mut self, name: &str, uuid: u64) -> Result<Entity, SceneError> {
        self.check_uuid(uuid)?;
        Ok(self.spawn(None, name, uuid))
    }

    /// Create an entity under `parent` with a random stable id
    pub fn create_child_entity(&mut self, parent: Entity, name: &str) -> Result<Entity, SceneError> {
        let parent = self.resolve(parent)?;
        let uuid = self.fresh_uuid();
        Ok(self.spawn(Some(parent), name, uuid))
    }

    /// Create an entity under `parent` with an explicit stable id
    pub fn create_child_entity_with_uuid(&mut self, parent: Entity, name: &str, uuid: u64) -> Result<Entity, SceneError> {
        let parent = self.resolve(parent)?;
        self.check_uuid(uuid)?;
        Ok(self.spawn(Some(parent), name, uuid))
    }

    pub(super) fn fresh_uuid(&self) -> u64 {
        loop {
            let uuid = IdComponent::random().id;
            if !self.uuids.contains_key(&uuid) {
                return uuid;
            }
        }
    }

    fn check_uuid(&self, uuid: u64) -> Result<(), SceneError> {
        if self.uuids.contains_key(&uuid) {
            return Err(self.violation(SceneError::DuplicateUuid(uuid)));
        }
        Ok(())
    }

    fn spawn(&mut self, parent: Option<EntityId>, name: &str, uuid: u64) -> Entity {
        let id = self.allocator.allocate();
        let entity = self.handle(id);

        match parent {
            Some(parent) => self.hierarchy.insert_child(parent, id),
            None => self.hierarchy.insert_root(id),
        };

        let inserted = self.storage.insert(entity, IdComponent::new(uuid)).is_ok()
            && self.storage.insert(entity, NameComponent::new(name)).is_ok()
            && self.storage.insert(entity, TransformComponent::new()).is_ok();
        debug_assert!(inserted, "recycled entity {id} still held components");
        self.uuids.insert(uuid, id);

        trace!("Created {} '{}' ({:016x})", entity, name, uuid);
        entity
    }

    /// Resolve a stable id to a handle
    pub fn entity_by_uuid(&self, uuid: u64) -> Option<Entity> {
        self.uuids.get(&uuid).map(|id| self.handle(*id))
    }

    /// Number of living entities
    pub fn entity_count(&self) -> usize {
        self.allocator.len()
    }

    /// Living entities in id order
    pub fn entities(&self) -> Vec<Entity> {
        self.allocator.iter_alive().map(|id| self.handle(id)).collect()
    }

    /// Stable id of an entity
    pub fn uuid(&self, entity: Entity) -> Result<u64, SceneError> {
        self.get_component::<IdComponent>(entity).map(|c| c.id)
    }

    /// Display name of an entity
    pub fn name(&self, entity: Entity) -> Result<&str, SceneError> {
        self.get_component::<NameComponent>(entity).map(|c| c.name.as_str())
    }

    /// Destroy an entity and its whole subtree.
    ///
    /// Scripts get `on_destroy` while the subtree is still intact; then each
    /// entity, children first, releases its components and frees its id.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), SceneError> {
        let id = self.resolve(entity)?;

        let subtree = self.hierarchy.subtree(id);
        for node in &subtree {
            self.teardown_scripts(*node);
        }
        self.end_contacts(&subtree.into_iter().collect(), false);

        let removed = self.hierarchy.remove_subtree(id);
        let count = removed.len();
        for node in removed {
            if self.allocator.is_alive(node) {
                self.release_entity(node);
            }
        }

        debug!("Destroyed {} and {} descendants", entity, count.saturating_sub(1));
        Ok(())
    }

    /// Release components, index entries and contacts of one entity, then free its id
    fn release_entity(&mut self, id: EntityId) {
        if let Some(uuid) = self.storage.get::<IdComponent>(id).map(|c| c.id) {
            if self.uuids.get(&uuid) == Some(&id) {
                self.uuids.remove(&uuid);
            }
        }

        let mut ctx = ReleaseContext::new(self.physics.as_mut());
        self.storage.release_entity(id, &mut ctx);
        self.active_contacts.retain(|(a, b)| *a != id && *b != id);
        self.allocator.free(id);
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Attach a component
    pub fn add_component<T: Component>(&mut self, entity: Entity, mut component: T) -> Result<&mut T, SceneError> {
        let id = self.resolve(entity)?;
        if self.storage.contains::<T>(id) {
            return Err(self.violation(SceneError::DuplicateComponent {
                entity,
                component: T::NAME,
            }));
        }

        let uuid = (&component as &dyn Any).downcast_ref::<IdComponent>().map(|c| c.id);
        if let Some(uuid) = uuid {
            self.check_uuid(uuid)?;
        }

        component.on_attach(&self.attach_context());
        if self.storage.insert(entity, component).is_err() {
            return Err(self.violation(SceneError::DuplicateComponent {
                entity,
                component: T::NAME,
            }));
        }
        if let Some(uuid) = uuid {
            self.uuids.insert(uuid, id);
        }
        if TypeId::of::<T>() == TypeId::of::<Colliders2DComponent>() {
            self.redeploy_body(id)?;
        }

        trace!("Added {} to {}", T::NAME, entity);
        self.storage
            .get_mut::<T>(id)
            .ok_or(SceneError::MissingComponent { entity, component: T::NAME })
    }

    /// Check for a component. Fails on invalid handles.
    pub fn has_component<T: Component>(&self, entity: Entity) -> Result<bool, SceneError> {
        let id = self.resolve(entity)?;
        Ok(self.storage.contains::<T>(id))
    }

    /// Borrow a component, failing loudly if it is absent
    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T, SceneError> {
        let id = self.resolve(entity)?;
        match self.storage.get::<T>(id) {
            Some(component) => Ok(component),
            None => Err(self.violation(SceneError::MissingComponent {
                entity,
                component: T::NAME,
            })),
        }
    }

    /// Mutably borrow a component, failing loudly if it is absent
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, SceneError> {
        let id = self.resolve(entity)?;
        if !self.storage.contains::<T>(id) {
            return Err(self.violation(SceneError::MissingComponent {
                entity,
                component: T::NAME,
            }));
        }
        self.storage
            .get_mut::<T>(id)
            .ok_or(SceneError::MissingComponent { entity, component: T::NAME })
    }

    /// Borrow a component if the entity is valid and has one
    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.is_valid(entity) {
            return None;
        }
        self.storage.get::<T>(entity.id())
    }

    /// Mutably borrow a component if the entity is valid and has one
    pub fn try_get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.is_valid(entity) {
            return None;
        }
        self.storage.get_mut::<T>(entity.id())
    }

    /// Detach a component and release what it owns
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<(), SceneError> {
        let id = self.resolve(entity)?;
        if !self.storage.contains::<T>(id) {
            return Err(self.violation(SceneError::MissingComponent {
                entity,
                component: T::NAME,
            }));
        }

        let type_id = TypeId::of::<T>();
        if type_id == TypeId::of::<NativeScriptsComponent>() {
            self.teardown_scripts(id);
        }
        if type_id == TypeId::of::<IdComponent>() {
            if let Some(uuid) = self.storage.get::<IdComponent>(id).map(|c| c.id) {
                self.uuids.remove(&uuid);
            }
        }

        let mut ctx = ReleaseContext::new(self.physics.as_mut());
        self.storage.remove::<T>(id, &mut ctx);

        if type_id == TypeId::of::<RigidBody2DComponent>() {
            if let Some(colliders) = self.storage.get_mut::<Colliders2DComponent>(id) {
                colliders.detach_all();
            }
            self.end_contacts(&BTreeSet::from([id]), true);
        }
        if type_id == TypeId::of::<Colliders2DComponent>() {
            self.redeploy_body(id)?;
        }

        trace!("Removed {} from {}", T::NAME, entity);
        Ok(())
    }

    /// Enable or disable a component
    pub fn set_component_enabled<T: Component>(&mut self, entity: Entity, enabled: bool) -> Result<(), SceneError> {
        let id = self.resolve(entity)?;
        match self.storage.slot_mut::<T>(id) {
            Some(slot) => {
                slot.set_enabled(enabled);
                Ok(())
            }
            None => Err(self.violation(SceneError::MissingComponent {
                entity,
                component: T::NAME,
            })),
        }
    }

    /// Whether a component is enabled
    pub fn is_component_enabled<T: Component>(&self, entity: Entity) -> Result<bool, SceneError> {
        let id = self.resolve(entity)?;
        match self.storage.slot::<T>(id) {
            Some(slot) => Ok(slot.is_enabled()),
            None => Err(self.violation(SceneError::MissingComponent {
                entity,
                component: T::NAME,
            })),
        }
    }

    /// Component type names of an entity in attach order
    pub fn component_names(&self, entity: Entity) -> Result<Vec<&'static str>, SceneError> {
        let id = self.resolve(entity)?;
        Ok(self.storage.component_names(id))
    }

    /// Every component of type `T` with its owner and enabled flag, in
    /// storage order
    pub fn view<T: Component>(&self) -> impl Iterator<Item = &ComponentSlot<T>> {
        self.storage
            .store::<T>()
            .into_iter()
            .flat_map(|store| store.iter().map(|(_, slot)| slot))
    }

    // ---------------------------------------------------------------------
    // Hierarchy
    // ---------------------------------------------------------------------

    /// Parent of an entity
    pub fn parent(&self, entity: Entity) -> Result<Option<Entity>, SceneError> {
        let id = self.resolve(entity)?;
        Ok(self.hierarchy.parent(id).map(|parent| self.handle(parent)))
    }

    /// Children of an entity in order
    pub fn children(&self, entity: Entity) -> Result<Vec<Entity>, SceneError> {
        let id = self.resolve(entity)?;
        Ok(self.hierarchy.children(id).iter().map(|child| self.handle(*child)).collect())
    }

    /// Root entities in order
    pub fn root_entities(&self) -> Vec<Entity> {
        self.hierarchy.roots().iter().map(|root| self.handle(*root)).collect()
    }

    /// Move `child` under `parent`, keeping its local transform
    pub fn set_parent(&mut self, child: Entity, parent: Entity) -> Result<(), SceneError> {
        let child_id = self.resolve(child)?;
        let parent_id = self.resolve(parent)?;

        if self.hierarchy.is_ancestor(child_id, parent_id) {
            return Err(self.violation(SceneError::HierarchyCycle { parent, child }));
        }

        self.hierarchy.attach(parent_id, child_id);
        if let Some(transform) = self.storage.get_mut::<TransformComponent>(child_id) {
            transform.mark_parent_changed();
        }
        trace!("Attached {} under {}", child, parent);
        Ok(())
    }

    /// Move an entity to the root list, keeping its local transform
    pub fn detach(&mut self, entity: Entity) -> Result<(), SceneError> {
        let id = self.resolve(entity)?;
        if self.hierarchy.detach(id) {
            if let Some(transform) = self.storage.get_mut::<TransformComponent>(id) {
                transform.mark_parent_changed();
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Scripts
    // ---------------------------------------------------------------------

    /// Attach a default-constructed script
    pub fn add_script<T: NativeScript + Default>(&mut self, entity: Entity) -> Result<(), SceneError> {
        self.add_script_descriptor(entity, ScriptDescriptor::of_default::<T>())
    }

    /// Attach a script built by `factory`
    pub fn add_script_with<T: NativeScript>(
        &mut self,
        entity: Entity,
        factory: impl Fn() -> T + 'static,
    ) -> Result<(), SceneError> {
        self.add_script_descriptor(entity, ScriptDescriptor::of(factory))
    }

    /// Attach a type-erased script, creating the scripts component if needed.
    ///
    /// The instance is built on the next script update of a running scene.
    pub fn add_script_descriptor(&mut self, entity: Entity, descriptor: ScriptDescriptor) -> Result<(), SceneError> {
        let id = self.resolve(entity)?;
        if !self.storage.contains::<NativeScriptsComponent>(id) {
            self.add_component(entity, NativeScriptsComponent::new())?;
        }

        let name = descriptor.name;
        let added = self
            .storage
            .get_mut::<NativeScriptsComponent>(id)
            .is_some_and(|scripts| scripts.add_descriptor(descriptor));
        if !added {
            return Err(self.violation(SceneError::DuplicateScript { entity, script: name }));
        }

        debug!("Attached script {} to {}", name, entity);
        Ok(())
    }

    /// Check for a script kind
    pub fn has_script(&self, entity: Entity, script: ScriptTypeId) -> Result<bool, SceneError> {
        let id = self.resolve(entity)?;
        Ok(self
            .storage
            .get::<NativeScriptsComponent>(id)
            .is_some_and(|scripts| scripts.has(script)))
    }

    /// Detach a script, running `on_destroy` on its live instance first
    pub fn remove_script(&mut self, entity: Entity, script: ScriptTypeId) -> Result<(), SceneError> {
        let id = self.resolve(entity)?;
        let removed = self
            .storage
            .get_mut::<NativeScriptsComponent>(id)
            .and_then(|scripts| scripts.remove(script));

        let Some((descriptor, instance)) = removed else {
            return Err(self.violation(SceneError::MissingScript { entity, script }));
        };

        if let Some(instance) = instance {
            self.destroy_script_instance(entity, &descriptor, instance);
        }
        debug!("Removed script {} from {}", descriptor.name, entity);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Physics
    // ---------------------------------------------------------------------

    /// Linear velocity of an entity's rigid body
    pub fn body_velocity(&self, entity: Entity) -> Result<Vec2, SceneError> {
        let body = self.get_component::<RigidBody2DComponent>(entity)?;
        match body.handle() {
            Some(handle) => self
                .physics
                .linear_velocity(handle)
                .ok_or(SceneError::Physics(PhysicsError::UnknownBody(handle))),
            None => Ok(body.props.linear_velocity),
        }
    }

    /// Rebuild a deployed body from its current colliders, after they were
    /// edited in place through [`Scene::get_component_mut`].
    ///
    /// Returns whether a body was rebuilt; constructed bodies pick up their
    /// colliders when they deploy.
    pub fn refresh_colliders(&mut self, entity: Entity) -> Result<bool, SceneError> {
        let id = self.resolve(entity)?;
        if !self.storage.contains::<RigidBody2DComponent>(id) {
            return Err(self.violation(SceneError::MissingComponent {
                entity,
                component: RigidBody2DComponent::NAME,
            }));
        }
        self.redeploy_body(id)
    }

    /// Set the linear velocity of an entity's rigid body. Constructed bodies
    /// store it as their initial velocity.
    pub fn set_body_velocity(&mut self, entity: Entity, velocity: Vec2) -> Result<(), SceneError> {
        let id = self.resolve(entity)?;
        let Some(body) = self.storage.get_mut::<RigidBody2DComponent>(id) else {
            return Err(self.violation(SceneError::MissingComponent {
                entity,
                component: RigidBody2DComponent::NAME,
            }));
        };

        match body.handle() {
            Some(handle) => self.physics.set_linear_velocity(handle, velocity)?,
            None => body.props.linear_velocity = velocity,
        }
        Ok(())
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        if let Err(e) = self.on_scene_stop() {
            warn!("Scene {} teardown: {}", self.id.get(), e);
        }

        let mut ctx = ReleaseContext::new(self.physics.as_mut());
        self.storage.release_all(&mut ctx);
        debug!("Dropped scene {} with {} entities", self.id.get(), self.allocator.len());
    }
}
